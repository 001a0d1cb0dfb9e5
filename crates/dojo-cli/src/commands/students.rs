use clap::Subcommand;
use dojo_core::{Config, Student};
use serde::Serialize;

use super::{load_documents, print_json};

#[derive(Subcommand)]
pub enum StudentsAction {
    /// Search the roster by name
    Search {
        /// Name fragment; empty lists everyone
        #[arg(default_value = "")]
        query: String,
        /// Maximum results (defaults to checkin.search_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one student
    Show {
        id: String,
    },
}

/// Roster entry without the PIN.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentCard<'a> {
    id: &'a str,
    name: &'a str,
    rank: &'a str,
    rank_value: u8,
    total_classes: u32,
}

impl<'a> From<&'a Student> for StudentCard<'a> {
    fn from(student: &'a Student) -> Self {
        Self {
            id: &student.id,
            name: &student.name,
            rank: &student.rank,
            rank_value: student.rank_value(),
            total_classes: student.total_classes,
        }
    }
}

pub fn run(action: StudentsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let docs = load_documents(&config)?;

    match action {
        StudentsAction::Search { query, limit } => {
            let limit = limit.unwrap_or(config.checkin.search_limit);
            let cards: Vec<StudentCard> = docs
                .roster
                .search(&query, limit)
                .into_iter()
                .map(StudentCard::from)
                .collect();
            print_json(&cards)?;
        }
        StudentsAction::Show { id } => {
            let student = docs
                .roster
                .find(&id)
                .ok_or_else(|| dojo_core::CheckinError::UnknownStudent(id.clone()))?;
            print_json(&StudentCard::from(student))?;
        }
    }
    Ok(())
}
