//! Check-in ledger.
//!
//! An append-only list of check-in records kept in local storage. Records
//! older than the retention window are swept every time the ledger is
//! opened. "Today" questions compare calendar dates on the kiosk's clock,
//! never elapsed time: a record stamped `2026-03-17T01:00:00Z` belongs to
//! March 16 on a kiosk at UTC-5.

use std::cell::RefCell;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::eligibility::Role;
use crate::error::{Result, StorageError};

/// Local storage key holding the ledger.
pub const CHECKINS_KEY: &str = "taskkarate_checkins";

/// Days a check-in is kept before the sweep removes it.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// One person attending one class occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_rank: String,
    /// Class instance id, `section-group-day-time`.
    pub class_id: String,
    /// Class group display name.
    pub class_name: String,
    pub class_program: String,
    pub class_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_day: Option<String>,
    pub role: Role,
    pub timestamp: DateTime<FixedOffset>,
}

impl CheckinRecord {
    /// Calendar date of the check-in as seen from a clock at `offset`.
    pub fn date_at(&self, offset: &FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(offset).date_naive()
    }

    pub fn is_on(&self, day: NaiveDate, offset: &FixedOffset) -> bool {
        self.date_at(offset) == day
    }
}

/// Student and helper head-count for one class on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassCounts {
    pub student_count: usize,
    pub helper_count: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.student_count + self.helper_count
    }
}

/// Whether `student_id` has a check-in for `class_id` dated `day` on a
/// clock at `offset`.
pub fn is_checked_in(
    records: &[CheckinRecord],
    class_id: &str,
    student_id: &str,
    day: NaiveDate,
    offset: &FixedOffset,
) -> bool {
    records
        .iter()
        .any(|r| r.class_id == class_id && r.student_id == student_id && r.is_on(day, offset))
}

/// Where the ledger's records live between runs.
pub trait CheckinRepository {
    /// Read every stored record. Missing or unreadable data is an empty list.
    fn load(&self) -> Result<Vec<CheckinRecord>>;

    /// Replace the stored list.
    fn save(&self, records: &[CheckinRecord]) -> Result<()>;
}

impl<R: CheckinRepository + ?Sized> CheckinRepository for &R {
    fn load(&self) -> Result<Vec<CheckinRecord>> {
        (**self).load()
    }

    fn save(&self, records: &[CheckinRecord]) -> Result<()> {
        (**self).save(records)
    }
}

/// Decode a stored ledger, skipping entries that no longer parse.
pub fn decode_records(raw: &str) -> Vec<CheckinRecord> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, "stored check-ins are not a JSON list, starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unreadable check-in record");
                None
            }
        })
        .collect()
}

pub fn encode_records(records: &[CheckinRecord]) -> Result<String> {
    serde_json::to_string(records).map_err(|source| {
        StorageError::Encode {
            key: CHECKINS_KEY.to_string(),
            source,
        }
        .into()
    })
}

/// Repository that keeps the encoded ledger in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    raw: RefCell<Option<String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-encoded ledger.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl CheckinRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<CheckinRecord>> {
        Ok(self
            .raw
            .borrow()
            .as_deref()
            .map(decode_records)
            .unwrap_or_default())
    }

    fn save(&self, records: &[CheckinRecord]) -> Result<()> {
        *self.raw.borrow_mut() = Some(encode_records(records)?);
        Ok(())
    }
}

/// In-memory view of the ledger, written through to its repository.
///
/// Day arguments are calendar dates at the offset of the `now` the ledger
/// was opened with.
pub struct CheckinLedger<R: CheckinRepository> {
    repo: R,
    records: Vec<CheckinRecord>,
    offset: FixedOffset,
}

impl<R: CheckinRepository> CheckinLedger<R> {
    /// Load, sweep records older than the default retention and persist.
    pub fn open(repo: R, now: DateTime<FixedOffset>) -> Result<Self> {
        Self::open_with_retention(repo, now, Duration::days(DEFAULT_RETENTION_DAYS))
    }

    pub fn open_with_retention(
        repo: R,
        now: DateTime<FixedOffset>,
        retention: Duration,
    ) -> Result<Self> {
        let cutoff = now - retention;
        let loaded = repo.load()?;
        let before = loaded.len();
        let records: Vec<CheckinRecord> = loaded
            .into_iter()
            .filter(|r| r.timestamp > cutoff)
            .collect();

        tracing::debug!(
            kept = records.len(),
            swept = before - records.len(),
            "check-in ledger loaded"
        );

        let ledger = Self {
            repo,
            records,
            offset: *now.offset(),
        };
        ledger.persist()?;
        Ok(ledger)
    }

    fn persist(&self) -> Result<()> {
        self.repo.save(&self.records)
    }

    pub fn records(&self) -> &[CheckinRecord] {
        &self.records
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// UTC offset of the kiosk clock this ledger dates records by.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Append a record and persist.
    ///
    /// Repeats are not rejected here; see [`Self::is_checked_in`].
    pub fn record(&mut self, checkin: CheckinRecord) -> Result<()> {
        tracing::debug!(id = %checkin.id, class = %checkin.class_id, role = %checkin.role, "recording check-in");
        self.records.push(checkin);
        self.persist()
    }

    /// Remove the record with `id`. Returns whether one was removed.
    pub fn cancel(&mut self, id: &str) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn find(&self, id: &str) -> Option<&CheckinRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Head-count for a class on a day.
    pub fn count_for(&self, class_id: &str, day: NaiveDate) -> ClassCounts {
        self.records
            .iter()
            .filter(|r| r.class_id == class_id && r.is_on(day, &self.offset))
            .fold(ClassCounts::default(), |mut counts, r| {
                match r.role {
                    Role::Student => counts.student_count += 1,
                    Role::Helper => counts.helper_count += 1,
                }
                counts
            })
    }

    pub fn is_checked_in(&self, class_id: &str, student_id: &str, day: NaiveDate) -> bool {
        is_checked_in(&self.records, class_id, student_id, day, &self.offset)
    }

    /// Every check-in on a day, newest first.
    pub fn checkins_on(&self, day: NaiveDate) -> Vec<&CheckinRecord> {
        let mut found: Vec<&CheckinRecord> = self
            .records
            .iter()
            .filter(|r| r.is_on(day, &self.offset))
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        found
    }

    pub fn student_checkins_on(&self, student_id: &str, day: NaiveDate) -> Vec<&CheckinRecord> {
        self.records
            .iter()
            .filter(|r| r.student_id == student_id && r.is_on(day, &self.offset))
            .collect()
    }

    /// A student's check-ins dated today or later, oldest first.
    pub fn registrations(&self, student_id: &str, today: NaiveDate) -> Vec<&CheckinRecord> {
        let mut found: Vec<&CheckinRecord> = self
            .records
            .iter()
            .filter(|r| r.student_id == student_id && r.date_at(&self.offset) >= today)
            .collect();
        found.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        found
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn stamp(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, day, h, m, 0)
            .unwrap()
    }

    pub(crate) fn record(id: &str, student: &str, class: &str, role: Role, at: DateTime<FixedOffset>) -> CheckinRecord {
        CheckinRecord {
            id: id.to_string(),
            student_id: student.to_string(),
            student_name: format!("Student {student}"),
            student_rank: "Green Belt".to_string(),
            class_id: class.to_string(),
            class_name: "Green • Purple".to_string(),
            class_program: "Kids Karate".to_string(),
            class_time: "4:30 PM".to_string(),
            class_day: Some("Monday".to_string()),
            role,
            timestamp: at,
        }
    }

    fn now(day: u32, h: u32) -> DateTime<FixedOffset> {
        stamp(day, h, 0)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn record_persists_and_reloads() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        let rec = record("c1", "s1", "kids-Orange-Monday-4:30 PM", Role::Student, stamp(16, 16, 0));
        ledger.record(rec.clone()).unwrap();

        let reloaded = CheckinLedger::open(&repo, now(16, 17)).unwrap();
        assert_eq!(reloaded.records(), &[rec]);
    }

    #[test]
    fn cancel_removes_only_matching_id() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        ledger.record(record("c1", "s1", "x", Role::Student, stamp(16, 10, 0))).unwrap();
        ledger.record(record("c2", "s2", "x", Role::Helper, stamp(16, 10, 5))).unwrap();

        assert!(ledger.cancel("c1").unwrap());
        assert!(!ledger.cancel("c1").unwrap());

        let reloaded = CheckinLedger::open(&repo, now(16, 11)).unwrap();
        let ids: Vec<&str> = reloaded.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c2"]);
    }

    #[test]
    fn sweep_drops_records_past_retention() {
        let repo = MemoryRepository::new();
        repo.save(&[
            record("old", "s1", "x", Role::Student, stamp(8, 12, 0)),
            record("recent", "s1", "x", Role::Student, stamp(10, 12, 0)),
        ])
        .unwrap();

        // 16th noon: 8 days after the 8th, 6 days after the 10th
        let ledger = CheckinLedger::open(&repo, now(16, 12)).unwrap();
        let ids: Vec<&str> = ledger.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["recent"]);

        // the sweep was written back
        assert_eq!(repo.load().unwrap().len(), 1);
    }

    #[test]
    fn record_exactly_at_cutoff_is_swept() {
        let repo = MemoryRepository::new();
        repo.save(&[record("edge", "s1", "x", Role::Student, stamp(9, 12, 0))]).unwrap();
        let ledger = CheckinLedger::open(&repo, now(16, 12)).unwrap();
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn malformed_storage_is_empty() {
        let repo = MemoryRepository::with_raw("{not json");
        let ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn unreadable_entries_are_dropped() {
        let good = serde_json::to_value(record("c1", "s1", "x", Role::Helper, stamp(16, 9, 0))).unwrap();
        let raw = serde_json::json!([good, {"id": "broken"}]).to_string();
        let records = decode_records(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "c1");
    }

    #[test]
    fn stored_format_uses_camel_case() {
        let raw = encode_records(&[record("c1", "s1", "x", Role::Helper, stamp(16, 9, 0))]).unwrap();
        assert!(raw.contains("\"studentId\":\"s1\""));
        assert!(raw.contains("\"role\":\"helper\""));
        assert!(raw.contains("\"timestamp\":\"2026-03-16T09:00:00-05:00\""));
    }

    #[test]
    fn reads_utc_iso_timestamps() {
        let raw = r#"[{"id":"1700000000000","studentId":"s1","studentName":"A","studentRank":"White Belt",
            "classId":"x","className":"White • Gold","classProgram":"Kids","classTime":"4:00 PM",
            "role":"student","timestamp":"2026-03-16T21:00:00.000Z"}]"#;
        let records = decode_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_day, None);
    }

    #[test]
    fn counts_split_by_role_and_day() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        let class = "kids-Orange-Monday-4:30 PM";
        ledger.record(record("1", "s1", class, Role::Student, stamp(16, 16, 0))).unwrap();
        ledger.record(record("2", "s2", class, Role::Student, stamp(16, 16, 1))).unwrap();
        ledger.record(record("3", "s3", class, Role::Helper, stamp(16, 16, 2))).unwrap();
        ledger.record(record("4", "s4", class, Role::Student, stamp(15, 16, 0))).unwrap();
        ledger.record(record("5", "s5", "other", Role::Helper, stamp(16, 16, 0))).unwrap();

        let counts = ledger.count_for(class, date(16));
        assert_eq!(counts, ClassCounts { student_count: 2, helper_count: 1 });
        assert_eq!(counts.total(), 3);
        assert_eq!(ledger.count_for(class, date(14)), ClassCounts::default());
    }

    #[test]
    fn checked_in_uses_calendar_day() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        ledger.record(record("1", "s1", "x", Role::Student, stamp(15, 23, 59))).unwrap();

        assert!(ledger.is_checked_in("x", "s1", date(15)));
        assert!(!ledger.is_checked_in("x", "s1", date(16)));
        assert!(!ledger.is_checked_in("x", "s2", date(15)));
    }

    #[test]
    fn day_listing_is_newest_first() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        ledger.record(record("early", "s1", "x", Role::Student, stamp(16, 9, 0))).unwrap();
        ledger.record(record("late", "s2", "x", Role::Student, stamp(16, 18, 0))).unwrap();
        ledger.record(record("yesterday", "s3", "x", Role::Student, stamp(15, 18, 0))).unwrap();

        let ids: Vec<&str> = ledger.checkins_on(date(16)).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["late", "early"]);
        assert_eq!(ledger.student_checkins_on("s1", date(16)).len(), 1);
    }

    #[test]
    fn registrations_are_today_or_later() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        ledger.record(record("b", "s1", "x", Role::Student, stamp(16, 18, 0))).unwrap();
        ledger.record(record("a", "s1", "y", Role::Helper, stamp(16, 9, 0))).unwrap();
        ledger.record(record("old", "s1", "x", Role::Student, stamp(15, 18, 0))).unwrap();
        ledger.record(record("other", "s2", "x", Role::Student, stamp(16, 18, 0))).unwrap();

        let ids: Vec<&str> = ledger.registrations("s1", date(16)).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    fn utc(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, day, h, m, 0)
            .unwrap()
    }

    #[test]
    fn utc_evening_record_counts_on_the_kiosk_day() {
        // 01:00Z on the 17th is 20:00 on the 16th at UTC-5
        let repo = MemoryRepository::new();
        repo.save(&[record("z", "s1", "x", Role::Student, utc(17, 1, 0))]).unwrap();
        let ledger = CheckinLedger::open(&repo, stamp(16, 22, 0)).unwrap();

        assert_eq!(ledger.count_for("x", date(16)).student_count, 1);
        assert_eq!(ledger.count_for("x", date(17)), ClassCounts::default());
        assert!(ledger.is_checked_in("x", "s1", date(16)));
        assert_eq!(ledger.checkins_on(date(16)).len(), 1);
        assert_eq!(ledger.registrations("s1", date(16)).len(), 1);
    }

    #[test]
    fn retention_compares_instants_across_offsets() {
        let repo = MemoryRepository::new();
        let now = stamp(16, 12, 0);
        repo.save(&[
            // one minute inside the window, written at UTC
            record("inside", "s1", "x", Role::Student, utc(9, 17, 1)),
            // exactly seven days back, written at UTC
            record("edge", "s1", "x", Role::Student, utc(9, 17, 0)),
            // wall clock looks recent but the instant is older
            record("east", "s1", "x", Role::Student, (now - Duration::days(7) - Duration::minutes(1))
                .with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap())),
        ])
        .unwrap();

        let ledger = CheckinLedger::open(&repo, now).unwrap();
        let ids: Vec<&str> = ledger.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let repo = MemoryRepository::new();
        let mut ledger = CheckinLedger::open(&repo, now(16, 9)).unwrap();
        let rec = record("1", "s1", "x", Role::Student, stamp(16, 10, 0));
        ledger.record(rec.clone()).unwrap();
        ledger.record(CheckinRecord { id: "2".into(), ..rec }).unwrap();
        assert_eq!(ledger.count_for("x", date(16)).student_count, 2);
    }
}
