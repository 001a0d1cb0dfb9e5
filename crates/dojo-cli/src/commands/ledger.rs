use clap::Subcommand;

use super::{print_json, Clock, Kiosk};

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Today's check-ins, newest first
    Recent {
        /// Maximum entries (defaults to checkin.recent_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// A student's registrations from today on
    Registrations {
        #[arg(long)]
        student: String,
    },
    /// Student and helper head-count for a class today
    Counts {
        class_id: String,
    },
    /// Cancel a registration
    Cancel {
        /// Check-in id
        id: String,
    },
}

pub fn run(action: LedgerAction, clock: Clock) -> Result<(), Box<dyn std::error::Error>> {
    let kiosk = Kiosk::open()?;
    let now = clock.now();
    let today = now.date_naive();
    let mut desk = kiosk.desk(now)?;

    match action {
        LedgerAction::Recent { limit } => {
            let limit = limit.unwrap_or(kiosk.config.checkin.recent_limit);
            print_json(&desk.recent(today, limit))?;
        }
        LedgerAction::Registrations { student } => {
            print_json(&desk.registrations(&student, today))?;
        }
        LedgerAction::Counts { class_id } => {
            print_json(&desk.counts(&class_id, today))?;
        }
        LedgerAction::Cancel { id } => {
            let cancelled = desk.cancel(&id)?;
            eprintln!("Cancelled: {} ({})", cancelled.class_name, cancelled.class_time);
            print_json(&cancelled)?;
        }
    }
    Ok(())
}
