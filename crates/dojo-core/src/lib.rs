//! # Dojo Core Library
//!
//! Business logic for the dojo check-in kiosk: which classes are open for
//! check-in right now, who may join them and in which role, and the
//! ledger of who did.
//!
//! ## Architecture
//!
//! - **Rank model**: belt labels mapped onto a 1..=14 scale, stripes ignored
//! - **Eligibility**: student band and helper rules per class group
//! - **Time window**: 12-hour labels, status buckets, the admission window
//! - **Schedule**: weekly schedule document projected onto one day
//! - **Ledger**: check-in records with a 7-day retention sweep, stored
//!   behind [`CheckinRepository`]
//!
//! Everything except the ledger and session store is a pure function of
//! its inputs; callers pass the current time in.
//!
//! ## Key Components
//!
//! - [`classes_for_day`]: per-day class projection
//! - [`can_help`] / [`qualifies_for_class`]: eligibility predicates
//! - [`class_status`]: status label for a class tile
//! - [`CheckinLedger`]: record, cancel and count check-ins
//! - [`CheckinDesk`]: the full check-in flow
//! - [`Database`]: local key-value storage
//! - [`Config`]: kiosk configuration

pub mod desk;
pub mod documents;
pub mod eligibility;
pub mod error;
pub mod ledger;
pub mod rank;
pub mod roster;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod window;

pub use desk::{CheckinDesk, CheckinRequest, StudentDaySummary};
pub use documents::Documents;
pub use eligibility::{can_help, qualifies_for_class, resolve_role, Category, Role, RoleDecision};
pub use error::{CheckinError, ConfigError, CoreError, DocumentError, Result, StorageError};
pub use ledger::{CheckinLedger, CheckinRecord, CheckinRepository, ClassCounts, MemoryRepository};
pub use rank::{class_rank_requirement, rank_value, BeltRank};
pub use roster::{Roster, Student};
pub use schedule::{classes_for_day, day_name, upcoming_classes, Attendance, ClassGroup, ClassInstance, ScheduleDocument, Section, TimeSlot};
pub use session::{SessionPointer, SessionStore};
pub use storage::{Config, Database};
pub use window::{class_status, is_admissible, parse_time_to_instant, ClassPhase, TimeStatus};
