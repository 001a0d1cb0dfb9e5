use chrono::Datelike;
use clap::Args;
use dojo_core::{
    can_help, classes_for_day, day_name, qualifies_for_class, Attendance, CheckinDesk,
    CheckinError, CheckinRecord, CheckinRequest, Database, Role, RoleDecision, StudentDaySummary,
};
use serde::Serialize;

use super::{parse_day, print_json, Clock, Kiosk};

#[derive(Args)]
pub struct CheckinArgs {
    /// Class id as shown by `classes`
    class_id: String,
    /// Student id
    #[arg(long)]
    student: String,
    #[arg(long)]
    pin: String,
    /// Role, when the student may join either way
    #[arg(long)]
    role: Option<Role>,
}

#[derive(Args)]
pub struct EligibilityArgs {
    class_id: String,
    #[arg(long)]
    student: String,
    /// Weekday the class is on (defaults to today)
    #[arg(long, value_parser = parse_day)]
    day: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckinOutcome {
    record: CheckinRecord,
    summary: StudentDaySummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EligibilityReport {
    student_id: String,
    class_id: String,
    decision: RoleDecision,
    can_help: bool,
    qualifies: bool,
}

pub fn run(args: CheckinArgs, clock: Clock) -> Result<(), Box<dyn std::error::Error>> {
    let kiosk = Kiosk::open()?;
    let now = clock.now();
    let student = kiosk.student(&args.student)?;
    let class = kiosk
        .upcoming(now)
        .into_iter()
        .find(|c| c.id == args.class_id)
        .ok_or_else(|| CheckinError::UnknownClass(args.class_id.clone()))?;

    let mut desk = kiosk.desk(now)?;
    let record = desk.check_in(
        CheckinRequest {
            student,
            class: &class,
            role: args.role,
            pin: &args.pin,
        },
        now,
    )?;
    let summary = desk.summary(student, now.date_naive());
    print_json(&CheckinOutcome { record, summary })
}

pub fn eligibility(args: EligibilityArgs, clock: Clock) -> Result<(), Box<dyn std::error::Error>> {
    let kiosk = Kiosk::open()?;
    let now = clock.now();
    let student = kiosk.student(&args.student)?;
    let day = args.day.unwrap_or_else(|| day_name(now.weekday()));
    let class = classes_for_day(&kiosk.docs.schedule, day, &Attendance::none(now))
        .into_iter()
        .find(|c| c.id == args.class_id)
        .ok_or_else(|| CheckinError::UnknownClass(args.class_id.clone()))?;

    let decision = CheckinDesk::<&Database>::decide(student, &class);
    print_json(&EligibilityReport {
        student_id: student.id.clone(),
        class_id: class.id.clone(),
        decision,
        can_help: can_help(&student.rank, &class.group),
        qualifies: qualifies_for_class(&student.rank, &class.group, class.category.key()),
    })
}
