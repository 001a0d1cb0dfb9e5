//! Weekly schedule document and the per-day class projection.
//!
//! The schedule document groups classes by program section; each group
//! carries a weekly grid of time slots. Projection flattens one weekday of
//! that grid into concrete [`ClassInstance`]s sorted by start time.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::eligibility::Category;
use crate::ledger::{is_checked_in, CheckinRecord};
use crate::window::{self, TimeStatus};

/// Length of an hour slot, in minutes.
const HOUR_SLOT_MINUTES: u32 = 60;
/// Length of every other slot, in minutes.
const SHORT_SLOT_MINUTES: u32 = 45;

/// One slot in a group's weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// `"H:MM AM|PM"`
    pub time: String,
    #[serde(default, rename = "isHour")]
    pub is_hour: bool,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> u32 {
        if self.is_hour {
            HOUR_SLOT_MINUTES
        } else {
            SHORT_SLOT_MINUTES
        }
    }
}

/// A recurring class offering within a program section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    /// Display name, also the key into the rank requirement table.
    pub name: String,
    #[serde(default)]
    pub belts: Vec<String>,
    /// Day name ("Monday") to ordered slots.
    #[serde(default)]
    pub schedule: HashMap<String, Vec<TimeSlot>>,
}

impl ClassGroup {
    pub fn slots_on(&self, day: &str) -> &[TimeSlot] {
        self.schedule.get(day).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A program section ("Kids Karate").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub groups: Vec<ClassGroup>,
}

/// The weekly schedule, keyed by program section.
///
/// Keys that are not one of the six known sections, and sections that do
/// not parse, are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDocument {
    sections: HashMap<Category, Section>,
}

impl ScheduleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, category: Category, section: Section) -> Self {
        self.sections.insert(category, section);
        self
    }

    pub fn section(&self, category: Category) -> Option<&Section> {
        self.sections.get(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|s| s.groups.is_empty())
    }
}

impl From<BTreeMap<String, serde_json::Value>> for ScheduleDocument {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let mut sections = HashMap::new();
        for (key, value) in raw {
            let Some(category) = Category::from_key(&key) else {
                tracing::debug!(section = %key, "skipping unknown schedule section");
                continue;
            };
            match serde_json::from_value::<Section>(value) {
                Ok(section) => {
                    sections.insert(category, section);
                }
                Err(e) => tracing::warn!(section = %key, error = %e, "skipping unreadable schedule section"),
            }
        }
        Self { sections }
    }
}

impl<'de> Deserialize<'de> for ScheduleDocument {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, serde_json::Value>::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for ScheduleDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordered: BTreeMap<&str, &Section> =
            self.sections.iter().map(|(c, s)| (c.key(), s)).collect();
        ordered.serialize(serializer)
    }
}

/// One concrete occurrence of a class on a given weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInstance {
    /// `section-group-day-time`; the natural key for check-ins.
    pub id: String,
    /// Section title.
    pub program: String,
    /// Group display name.
    pub group: String,
    pub time: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub category: Category,
    pub day: String,
    pub belts: Vec<String>,
    /// The session student already checked in today.
    pub checked_in: bool,
}

impl ClassInstance {
    pub fn class_id(category: Category, group: &str, day: &str, time: &str) -> String {
        format!("{}-{}-{}-{}", category.key(), group, day, time)
    }

    /// Start on the reference instant's calendar day.
    pub fn start_on(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        window::parse_time_to_instant(&self.time, reference)
    }

    pub fn status(&self, now: NaiveDateTime) -> Option<TimeStatus> {
        self.start_on(now).map(|start| window::class_status(start, now))
    }

    pub fn is_admissible(&self, now: NaiveDateTime, lead: Duration) -> bool {
        self.start_on(now)
            .is_some_and(|start| window::is_admissible_with_lead(start, now, lead))
    }
}

/// Whose check-ins mark a class as already joined.
#[derive(Debug, Clone, Copy)]
pub struct Attendance<'a> {
    pub records: &'a [CheckinRecord],
    /// Current session student, if anyone is signed in.
    pub student_id: Option<&'a str>,
    /// Kiosk clock; "today" is its calendar date.
    pub now: DateTime<FixedOffset>,
}

impl<'a> Attendance<'a> {
    pub fn none(now: DateTime<FixedOffset>) -> Self {
        Self {
            records: &[],
            student_id: None,
            now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn has_joined(&self, class_id: &str) -> bool {
        self.student_id.is_some_and(|student| {
            is_checked_in(self.records, class_id, student, self.today(), self.now.offset())
        })
    }
}

/// Weekday name as used by the schedule document.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Flatten one weekday of the schedule into class instances.
///
/// Sections are walked in [`Category::ALL`] order, groups and slots in
/// document order, then the list is stably sorted by 24-hour start time.
/// Slots whose time label doesn't parse sort last.
pub fn classes_for_day(
    doc: &ScheduleDocument,
    day: &str,
    attendance: &Attendance<'_>,
) -> Vec<ClassInstance> {
    let mut classes = Vec::new();

    for category in Category::ALL {
        let Some(section) = doc.section(category) else {
            continue;
        };
        for group in &section.groups {
            for slot in group.slots_on(day) {
                let id = ClassInstance::class_id(category, &group.name, day, &slot.time);
                let checked_in = attendance.has_joined(&id);
                classes.push(ClassInstance {
                    id,
                    program: section.title.clone(),
                    group: group.name.clone(),
                    time: slot.time.clone(),
                    duration_minutes: slot.duration_minutes(),
                    category,
                    day: day.to_string(),
                    belts: group.belts.clone(),
                    checked_in,
                });
            }
        }
    }

    classes.sort_by_cached_key(|c| {
        let key = window::to_24_hour(&c.time);
        (key.is_none(), key)
    });

    tracing::debug!(day, count = classes.len(), "projected classes");
    classes
}

/// Classes still open for check-in at `now`.
pub fn upcoming_classes(
    classes: Vec<ClassInstance>,
    now: NaiveDateTime,
    lead: Duration,
) -> Vec<ClassInstance> {
    classes
        .into_iter()
        .filter(|c| c.is_admissible(now, lead))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::Role;
    use crate::ledger::tests::{record, stamp};

    fn slot(time: &str, is_hour: bool) -> TimeSlot {
        TimeSlot {
            time: time.to_string(),
            is_hour,
        }
    }

    fn group(name: &str, day: &str, slots: Vec<TimeSlot>) -> ClassGroup {
        ClassGroup {
            name: name.to_string(),
            belts: vec!["White".to_string(), "Gold".to_string()],
            schedule: HashMap::from([(day.to_string(), slots)]),
        }
    }

    fn kiosk_now() -> DateTime<FixedOffset> {
        stamp(16, 12, 0)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    #[test]
    fn slots_sort_by_time_not_document_order() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids Karate".into(),
                groups: vec![group(
                    "White • Gold",
                    "Monday",
                    vec![slot("10:30 AM", false), slot("9:00 AM", true)],
                )],
            },
        );

        let classes = classes_for_day(&doc, "Monday", &Attendance::none(kiosk_now()));
        let times: Vec<&str> = classes.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, vec!["9:00 AM", "10:30 AM"]);
        assert_eq!(classes[0].duration_minutes, 60);
        assert_eq!(classes[1].duration_minutes, 45);
    }

    #[test]
    fn pm_sorts_after_am_across_sections() {
        let doc = ScheduleDocument::new()
            .with_section(
                Category::Sparring,
                Section {
                    title: "Sparring".into(),
                    groups: vec![group("Sparring", "Monday", vec![slot("12:00 PM", true)])],
                },
            )
            .with_section(
                Category::Kids,
                Section {
                    title: "Kids".into(),
                    groups: vec![group("Orange", "Monday", vec![slot("4:30 PM", false), slot("bogus", false)])],
                },
            );

        let classes = classes_for_day(&doc, "Monday", &Attendance::none(kiosk_now()));
        let ids: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "sparring-Sparring-Monday-12:00 PM",
                "kids-Orange-Monday-4:30 PM",
                "kids-Orange-Monday-bogus",
            ]
        );
    }

    #[test]
    fn missing_day_is_empty() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids".into(),
                groups: vec![group("Orange", "Monday", vec![slot("4:30 PM", false)])],
            },
        );
        assert!(classes_for_day(&doc, "Sunday", &Attendance::none(kiosk_now())).is_empty());
    }

    #[test]
    fn checked_in_only_for_session_student_today() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids".into(),
                groups: vec![group("Orange", "Monday", vec![slot("4:30 PM", false), slot("5:30 PM", false)])],
            },
        );
        let records = vec![
            record("1", "s1", "kids-Orange-Monday-4:30 PM", Role::Student, stamp(16, 15, 0)),
            record("2", "s1", "kids-Orange-Monday-5:30 PM", Role::Student, stamp(9, 15, 0)),
        ];

        let mine = Attendance {
            records: &records,
            student_id: Some("s1"),
            now: kiosk_now(),
        };
        let flags: Vec<bool> = classes_for_day(&doc, "Monday", &mine).iter().map(|c| c.checked_in).collect();
        assert_eq!(flags, vec![true, false]);

        let someone_else = Attendance {
            student_id: Some("s2"),
            ..mine
        };
        assert!(classes_for_day(&doc, "Monday", &someone_else).iter().all(|c| !c.checked_in));

        let nobody = Attendance {
            student_id: None,
            ..mine
        };
        assert!(classes_for_day(&doc, "Monday", &nobody).iter().all(|c| !c.checked_in));
    }

    #[test]
    fn utc_stamped_check_in_marks_the_local_day() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids".into(),
                groups: vec![group("Orange", "Monday", vec![slot("7:30 PM", false)])],
            },
        );
        let at_utc = chrono::DateTime::parse_from_rfc3339("2026-03-17T01:00:00Z").unwrap();
        let records = vec![record("1", "s1", "kids-Orange-Monday-7:30 PM", Role::Student, at_utc)];
        let attendance = Attendance {
            records: &records,
            student_id: Some("s1"),
            now: stamp(16, 22, 0),
        };
        assert_eq!(attendance.today(), today());
        assert!(classes_for_day(&doc, "Monday", &attendance)[0].checked_in);
    }

    #[test]
    fn instance_serializes_duration_key() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids".into(),
                groups: vec![group("Orange", "Monday", vec![slot("7:30 PM", true)])],
            },
        );
        let class = &classes_for_day(&doc, "Monday", &Attendance::none(kiosk_now()))[0];
        let json = serde_json::to_value(class).unwrap();
        assert_eq!(json["duration"], 60);
        assert_eq!(json["checkedIn"], false);
        assert!(json.get("durationMinutes").is_none());
    }

    #[test]
    fn document_parses_known_sections_only() {
        let json = r#"{
            "version": 3,
            "kids": {
                "title": "Kids Karate",
                "groups": [{
                    "name": "White • Gold",
                    "belts": ["White", "Gold"],
                    "schedule": {"Monday": [{"time": "4:00 PM", "isHour": false}]}
                }]
            },
            "weapons": {"title": "Weapons", "groups": "oops"},
            "eskrima": {"title": "Eskrima"}
        }"#;
        let doc: ScheduleDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.section(Category::Kids).unwrap().groups.len(), 1);
        assert!(doc.section(Category::Weapons).is_none());
        assert!(doc.section(Category::Eskrima).unwrap().groups.is_empty());
    }

    #[test]
    fn upcoming_filters_by_admission_window() {
        let doc = ScheduleDocument::new().with_section(
            Category::Kids,
            Section {
                title: "Kids".into(),
                groups: vec![group("Orange", "Monday", vec![slot("9:00 AM", false), slot("6:00 PM", false)])],
            },
        );
        let now = today().and_hms_opt(12, 0, 0).unwrap();
        let classes = classes_for_day(&doc, "Monday", &Attendance::none(kiosk_now()));
        let open = upcoming_classes(classes, now, Duration::minutes(120));
        let times: Vec<&str> = open.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, vec!["6:00 PM"]);
        assert_eq!(open[0].status(now).unwrap().label, "Upcoming");
    }

    #[test]
    fn weekday_names() {
        assert_eq!(day_name(Weekday::Sun), "Sunday");
        assert_eq!(day_name(Weekday::Mon), "Monday");
        assert_eq!(day_name(Weekday::Sat), "Saturday");
    }
}
