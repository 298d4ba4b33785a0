//! `hostelctl` — command-line front end for the hostel complaint tracker.
//!
//! Each invocation opens the redb file, restores the persisted session,
//! runs one command, and exits. The session survives between invocations
//! through the `user` key, so `login` once and then `submit` or `review`.

mod commands;

use std::path::PathBuf;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use hostel::{ComplaintCategory, ComplaintStatus, HostelApp, HostelConfig};
use tracing::info;

use crate::commands::Output;

/// Hostel complaint tracker CLI.
#[derive(Parser, Debug)]
#[command(name = "hostelctl", about = "Hostel complaint tracker")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides `db_path` from the config).
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with a directory account.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted for when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session.
    Logout,

    /// Show the logged-in identity.
    Whoami,

    /// File a complaint as the logged-in student.
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Complaint category.
        #[arg(long, default_value = "other", value_parser = category_parser())]
        category: ComplaintCategory,
        /// Room number.
        #[arg(long)]
        room: String,
    },

    /// List complaints, optionally filtered.
    List {
        /// Only complaints filed by this student id.
        #[arg(long, conflicts_with_all = ["hostel", "status"])]
        student: Option<String>,
        /// Only complaints filed in this hostel id.
        #[arg(long, conflicts_with = "status")]
        hostel: Option<String>,
        /// Only complaints with this status.
        #[arg(long)]
        status: Option<ComplaintStatus>,
    },

    /// Resolve or reject a complaint.
    Review {
        /// Complaint id.
        id: String,
        /// resolved or rejected.
        #[arg(long)]
        status: ComplaintStatus,
        #[arg(long)]
        comments: Option<String>,
    },

    /// Count complaints per status.
    Stats,
}

/// Accepts exactly the category names the model knows, and lists them in
/// `--help`.
fn category_parser() -> impl TypedValueParser<Value = ComplaintCategory> {
    PossibleValuesParser::new(ComplaintCategory::ALL.map(|c| c.as_str()))
        .try_map(|s: String| s.parse::<ComplaintCategory>())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            HostelConfig::load(path)?
        }
        None => HostelConfig::default(),
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let app = HostelApp::open(config)?;
    let output = cli.output;

    match cli.command {
        Commands::Login { email, password } => {
            let email = match email {
                Some(email) => email,
                None => commands::prompt("Email: ")?,
            };
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::session::login(&app, &email, &password).await?;
        }

        Commands::Logout => commands::session::logout(&app)?,

        Commands::Whoami => commands::session::whoami(&app, output)?,

        Commands::Submit {
            title,
            description,
            category,
            room,
        } => {
            commands::complaint::submit(&app, title, description, category, room, output).await?;
        }

        Commands::List {
            student,
            hostel,
            status,
        } => {
            let filter = match (student, hostel, status) {
                (Some(id), _, _) => commands::complaint::Filter::Student(id),
                (None, Some(id), _) => commands::complaint::Filter::Hostel(id),
                (None, None, Some(status)) => commands::complaint::Filter::Status(status),
                (None, None, None) => commands::complaint::Filter::All,
            };
            commands::complaint::list(&app, filter, output)?;
        }

        Commands::Review {
            id,
            status,
            comments,
        } => {
            commands::complaint::review(&app, &id, status, comments.as_deref(), output).await?;
        }

        Commands::Stats => commands::complaint::stats(&app, output)?,
    }

    Ok(())
}
