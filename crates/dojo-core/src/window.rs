//! Class times, status labels and the check-in admission window.
//!
//! Schedule documents carry wall-clock labels like "6:30 PM". Everything
//! here works on naive local date-times: a label always resolves onto the
//! calendar day of the reference instant, never the next or previous day.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes before start that check-in opens.
pub const DEFAULT_ADMISSION_LEAD_MINUTES: i64 = 120;

/// Parse an `"H:MM AM|PM"` label into a wall-clock time.
///
/// Returns `None` for anything that isn't that shape.
pub fn parse_time_label(label: &str) -> Option<NaiveTime> {
    let (clock, period) = label.trim().split_once(' ')?;
    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if !(1..=12).contains(&hours) {
        return None;
    }

    let hours = match (period.trim(), hours) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Resolve a label onto the reference day, seconds zeroed.
pub fn parse_time_to_instant(label: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    parse_time_label(label).map(|time| reference.date().and_time(time))
}

/// Zero-padded 24-hour `"HH:MM"`; sorts lexicographically in time order.
pub fn to_24_hour(label: &str) -> Option<String> {
    parse_time_label(label).map(|t| format!("{:02}:{:02}", t.hour(), t.minute()))
}

/// Display bucket for a class relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassPhase {
    InProgress,
    StartingSoon,
    Upcoming,
}

impl ClassPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassPhase::InProgress => "in-progress",
            ClassPhase::StartingSoon => "starting-soon",
            ClassPhase::Upcoming => "upcoming",
        }
    }
}

/// Status and label shown on a class tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStatus {
    pub status: ClassPhase,
    pub label: String,
}

/// Signed whole minutes until the class starts, floored.
pub fn minutes_until(class_instant: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let millis = (class_instant - now).num_milliseconds();
    millis.div_euclid(60_000)
}

/// Classify a class start against now.
///
/// | minutes until start | status        | label           |
/// |---------------------|---------------|-----------------|
/// | -59 ..= -1          | in-progress   | "In Progress"   |
/// | 0 ..= 30            | starting-soon | "Starting Soon" |
/// | 31 ..= 120          | upcoming      | "In {n} min"    |
/// | anything else       | upcoming      | "Upcoming"      |
pub fn class_status(class_instant: NaiveDateTime, now: NaiveDateTime) -> TimeStatus {
    let delta = minutes_until(class_instant, now);
    let (status, label) = match delta {
        -59..=-1 => (ClassPhase::InProgress, "In Progress".to_string()),
        0..=30 => (ClassPhase::StartingSoon, "Starting Soon".to_string()),
        31..=120 => (ClassPhase::Upcoming, format!("In {delta} min")),
        _ => (ClassPhase::Upcoming, "Upcoming".to_string()),
    };
    TimeStatus { status, label }
}

/// Whether a class is still open for check-in.
///
/// Open while the class is in the future or now lies within
/// `[start - lead, start]`. This is independent of [`class_status`]: a
/// class a few minutes past start reports "In Progress" but is no longer
/// admissible.
pub fn is_admissible(class_instant: NaiveDateTime, now: NaiveDateTime) -> bool {
    is_admissible_with_lead(
        class_instant,
        now,
        Duration::minutes(DEFAULT_ADMISSION_LEAD_MINUTES),
    )
}

pub fn is_admissible_with_lead(
    class_instant: NaiveDateTime,
    now: NaiveDateTime,
    lead: Duration,
) -> bool {
    let opens_at = class_instant - lead;
    class_instant > now || (now >= opens_at && now <= class_instant)
}
