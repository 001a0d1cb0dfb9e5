use clap::Subcommand;
use dojo_core::{CheckinError, Config, Database, SessionStore};

use super::{load_documents, print_json};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the signed-in student
    Show,
    /// Sign a student in on this kiosk
    Start {
        /// Student id
        id: String,
        #[arg(long)]
        pin: String,
    },
    /// Sign out
    End,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let store = SessionStore::new(&db);

    match action {
        SessionAction::Show => match store.current()? {
            Some(pointer) => print_json(&pointer)?,
            None => println!("null"),
        },
        SessionAction::Start { id, pin } => {
            let docs = load_documents(&Config::load_or_default())?;
            let student = docs
                .roster
                .find(&id)
                .ok_or_else(|| CheckinError::UnknownStudent(id.clone()))?;
            if !student.verify_pin(&pin) {
                return Err(CheckinError::IncorrectPin.into());
            }
            print_json(&store.sign_in(student)?)?;
        }
        SessionAction::End => {
            store.sign_out()?;
            println!("signed out");
        }
    }
    Ok(())
}
