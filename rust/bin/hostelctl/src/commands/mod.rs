//! Command implementations. Each one takes the opened app and prints its
//! result to stdout.

pub mod complaint;
pub mod session;

use std::io::Write;

use anyhow::Result;
use hostel::{HostelApp, Identity};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Output {
    Table,
    Json,
}

/// Read one trimmed line from stdin after printing `label` to stderr.
pub fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// The active identity, or an error telling the user to log in.
pub(crate) fn require_user(app: &HostelApp) -> Result<Identity> {
    app.session()
        .user()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `hostelctl login` first."))
}
