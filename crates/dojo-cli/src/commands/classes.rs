use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset};
use clap::Args;
use dojo_core::{classes_for_day, day_name, upcoming_classes, Attendance, ClassCounts, ClassInstance, SessionStore, TimeStatus};
use serde::Serialize;

use super::{parse_day, print_json, Clock, Kiosk};

#[derive(Args)]
pub struct ClassesArgs {
    /// Weekday to show (defaults to today)
    #[arg(long, value_parser = parse_day)]
    day: Option<&'static str>,
    /// Include classes outside the check-in window
    #[arg(long)]
    all: bool,
    /// Re-evaluate on every refresh interval until interrupted
    #[arg(long)]
    watch: bool,
}

/// One class tile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassTile {
    #[serde(flatten)]
    class: ClassInstance,
    /// Only meaningful for today's classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TimeStatus>,
    admissible: bool,
    counts: ClassCounts,
}

fn tiles(
    kiosk: &Kiosk,
    args: &ClassesArgs,
    now: DateTime<FixedOffset>,
) -> Result<Vec<ClassTile>, Box<dyn std::error::Error>> {
    let local = now.naive_local();
    let today_name = day_name(local.weekday());
    let day = args.day.unwrap_or(today_name);
    let is_today = day == today_name;

    let desk = kiosk.desk(now)?;
    let session = SessionStore::new(&kiosk.db).current()?;
    let attendance = Attendance {
        records: desk.ledger().records(),
        student_id: session.as_ref().map(|s| s.id.as_str()),
        now,
    };

    let lead = kiosk.config.checkin.admission_lead();
    let mut classes = classes_for_day(&kiosk.docs.schedule, day, &attendance);
    if is_today && !args.all {
        classes = upcoming_classes(classes, local, lead);
    }

    Ok(classes
        .into_iter()
        .map(|class| {
            let (status, admissible) = if is_today {
                (class.status(local), class.is_admissible(local, lead))
            } else {
                (None, false)
            };
            let counts = desk.counts(&class.id, local.date());
            ClassTile {
                class,
                status,
                admissible,
                counts,
            }
        })
        .collect())
}

pub fn run(args: ClassesArgs, clock: Clock) -> Result<(), Box<dyn std::error::Error>> {
    let kiosk = Kiosk::open()?;

    if !args.watch {
        return print_json(&tiles(&kiosk, &args, clock.now())?);
    }

    let period = Duration::from_secs(kiosk.config.checkin.refresh_interval_secs.max(1));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async {
        let step = chrono::Duration::from_std(period)?;
        let mut interval = tokio::time::interval(period);
        let mut tick = 0;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    print_json(&tiles(&kiosk, &args, clock.at_tick(tick, step))?)?;
                    tick += 1;
                }
                _ = &mut ctrl_c => {
                    tracing::debug!("watch interrupted");
                    break;
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
