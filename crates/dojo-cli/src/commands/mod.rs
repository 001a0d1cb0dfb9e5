pub mod checkin;
pub mod classes;
pub mod config;
pub mod ledger;
pub mod session;
pub mod students;

use chrono::{DateTime, Datelike, FixedOffset, Local, Weekday};
use dojo_core::{
    classes_for_day, day_name, upcoming_classes, Attendance, CheckinDesk, CheckinError,
    CheckinLedger, ClassInstance, Config, Database, DocumentError, Documents, Student,
};

/// Source of "now" for a command.
///
/// With `--at` the clock is pinned: one-shot commands see exactly that
/// instant, and `classes --watch` steps it by whole refresh periods.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    anchor: Option<DateTime<FixedOffset>>,
}

impl Clock {
    pub fn new(anchor: Option<DateTime<FixedOffset>>) -> Self {
        Self { anchor }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.anchor.unwrap_or_else(|| Local::now().fixed_offset())
    }

    /// "Now" for the `tick`-th refresh of a watch loop, counting from 0.
    pub fn at_tick(&self, tick: i32, period: chrono::Duration) -> DateTime<FixedOffset> {
        match self.anchor {
            Some(anchor) => anchor + period * tick,
            None => Local::now().fixed_offset(),
        }
    }
}

/// Everything a kiosk command needs: config, local storage and the
/// static documents.
pub struct Kiosk {
    pub config: Config,
    pub db: Database,
    pub docs: Documents,
}

impl Kiosk {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let db = Database::open()?;
        let docs = load_documents(&config)?;
        Ok(Self { config, db, docs })
    }

    /// Desk over the ledger, swept with the configured retention.
    pub fn desk(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<CheckinDesk<&Database>, Box<dyn std::error::Error>> {
        let ledger =
            CheckinLedger::open_with_retention(&self.db, now, self.config.checkin.retention())?;
        Ok(CheckinDesk::new(ledger))
    }

    pub fn student(&self, id: &str) -> Result<&Student, Box<dyn std::error::Error>> {
        self.docs
            .roster
            .find(id)
            .ok_or_else(|| CheckinError::UnknownStudent(id.to_string()).into())
    }

    /// Today's classes still open for check-in.
    pub fn upcoming(&self, now: DateTime<FixedOffset>) -> Vec<ClassInstance> {
        let local = now.naive_local();
        let classes = classes_for_day(
            &self.docs.schedule,
            day_name(local.weekday()),
            &Attendance::none(now),
        );
        upcoming_classes(classes, local, self.config.checkin.admission_lead())
    }
}

/// Load the schedule and roster, reducing any failure to the one message
/// the kiosk shows.
pub fn load_documents(config: &Config) -> Result<Documents, Box<dyn std::error::Error>> {
    Documents::load(&config.documents).map_err(|e| {
        tracing::error!(error = %e, "document load failed");
        DocumentError::USER_MESSAGE.into()
    })
}

/// Parse a weekday argument ("mon", "Tuesday") into a schedule day name.
pub fn parse_day(value: &str) -> Result<&'static str, String> {
    value
        .parse::<Weekday>()
        .map(day_name)
        .map_err(|_| format!("not a weekday: {value}"))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
