//! Complaint commands: submit, list, review, stats.

use anyhow::Result;
use hostel::{Complaint, ComplaintCategory, ComplaintForm, ComplaintStatus, HostelApp, Role};

use super::{Output, require_user};

/// Which slice of the collection `list` prints.
#[derive(Debug)]
pub enum Filter {
    All,
    Student(String),
    Hostel(String),
    Status(ComplaintStatus),
}

pub async fn submit(
    app: &HostelApp,
    title: String,
    description: String,
    category: ComplaintCategory,
    room_number: String,
    output: Output,
) -> Result<()> {
    let user = require_user(app)?;
    if user.role != Role::Student {
        anyhow::bail!("Only students can file complaints.");
    }

    let form = ComplaintForm {
        title,
        description,
        category: category.as_str().to_string(),
        room_number,
    };
    let Some(complaint) = app.submit(form).await? else {
        anyhow::bail!("Not logged in.");
    };

    let headline = format!("Complaint {} submitted.", complaint.id);
    print!("{}", render_one(&headline, &complaint, output)?);
    Ok(())
}

pub fn list(app: &HostelApp, filter: Filter, output: Output) -> Result<()> {
    let store = app.complaints();
    let items = match &filter {
        Filter::All => store.get_all_complaints(),
        Filter::Student(id) => store.get_student_complaints(id),
        Filter::Hostel(id) => store.get_hostel_complaints(id),
        Filter::Status(status) => store.get_complaints_by_status(*status),
    };

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        Output::Table => {
            if items.is_empty() {
                println!("No complaints.");
                return Ok(());
            }
            println!(
                "{:<44} {:<9} {:<12} {:<6} {:<8} TITLE",
                "ID", "STATUS", "CATEGORY", "ROOM", "STUDENT"
            );
            for c in &items {
                println!(
                    "{:<44} {:<9} {:<12} {:<6} {:<8} {}",
                    c.id, c.status, c.category, c.room_number, c.student_id, c.title
                );
            }
        }
    }
    Ok(())
}

pub async fn review(
    app: &HostelApp,
    id: &str,
    status: ComplaintStatus,
    comments: Option<&str>,
    output: Output,
) -> Result<()> {
    let user = require_user(app)?;
    if !user.is_rector() {
        anyhow::bail!("Only the rector can review complaints.");
    }
    if !status.is_closed() {
        anyhow::bail!("Review status must be resolved or rejected.");
    }

    match app.complaints().review(id, status, comments).await? {
        Some(complaint) => {
            let headline = format!("Complaint {} marked {}.", complaint.id, complaint.status);
            print!("{}", render_one(&headline, &complaint, output)?);
            Ok(())
        }
        None => anyhow::bail!("Complaint {} not found.", id),
    }
}

pub fn stats(app: &HostelApp, output: Output) -> Result<()> {
    let counts = app.complaints().status_counts();

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
        Output::Table => {
            println!("Pending:   {}", counts.pending);
            println!("Resolved:  {}", counts.resolved);
            println!("Rejected:  {}", counts.rejected);
            println!("Total:     {}", counts.total());
        }
    }
    Ok(())
}

/// Render one complaint. The headline is only part of table output, so
/// `-o json` stays machine-readable.
fn render_one(headline: &str, c: &Complaint, output: Output) -> Result<String> {
    use std::fmt::Write;

    let mut out = String::new();
    match output {
        Output::Json => writeln!(out, "{}", serde_json::to_string_pretty(c)?)?,
        Output::Table => {
            writeln!(out, "{}", headline)?;
            writeln!(out, "Title:     {}", c.title)?;
            writeln!(out, "Category:  {}", c.category)?;
            writeln!(out, "Room:      {}", c.room_number)?;
            writeln!(out, "Status:    {}", c.status)?;
            writeln!(out, "Filed:     {} by {}", c.created_at.to_rfc3339(), c.student_name)?;
            if let Some(updated) = c.updated_at {
                writeln!(out, "Updated:   {}", updated.to_rfc3339())?;
            }
            if let Some(comments) = &c.comments {
                writeln!(out, "Comments:  {}", comments)?;
            }
        }
    }
    Ok(out)
}
