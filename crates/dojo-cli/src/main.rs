use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "dojo-cli", version, about = "Dojo check-in kiosk")]
struct Cli {
    /// Evaluate as of this instant instead of the wall clock (RFC 3339)
    #[arg(long, global = true, value_name = "INSTANT")]
    at: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classes on the schedule
    Classes {
        #[command(flatten)]
        args: commands::classes::ClassesArgs,
    },
    /// Check a student into a class
    Checkin {
        #[command(flatten)]
        args: commands::checkin::CheckinArgs,
    },
    /// Role a student would join a class with
    Eligibility {
        #[command(flatten)]
        args: commands::checkin::EligibilityArgs,
    },
    /// Check-in ledger queries and cancellation
    Ledger {
        #[command(subcommand)]
        action: commands::ledger::LedgerAction,
    },
    /// Roster lookup
    Students {
        #[command(subcommand)]
        action: commands::students::StudentsAction,
    },
    /// Kiosk session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let clock = commands::Clock::new(cli.at);
    let result = match cli.command {
        Commands::Classes { args } => commands::classes::run(args, clock),
        Commands::Checkin { args } => commands::checkin::run(args, clock),
        Commands::Eligibility { args } => commands::checkin::eligibility(args, clock),
        Commands::Ledger { action } => commands::ledger::run(action, clock),
        Commands::Students { action } => commands::students::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
