//! Login / logout / whoami.

use anyhow::Result;
use hostel::HostelApp;

use super::Output;

pub async fn login(app: &HostelApp, email: &str, password: &str) -> Result<()> {
    if !app.session().login(email, password).await? {
        anyhow::bail!("Login failed: invalid email or password.");
    }

    if let Some(user) = app.session().user() {
        println!("Logged in as {} ({}).", user.name, user.role);
    }
    Ok(())
}

pub fn logout(app: &HostelApp) -> Result<()> {
    let previous = app.session().user();
    app.session().logout()?;

    match previous {
        Some(user) => println!("Logged out {}.", user.email),
        None => println!("No active session."),
    }
    Ok(())
}

pub fn whoami(app: &HostelApp, output: Output) -> Result<()> {
    let Some(user) = app.session().user() else {
        anyhow::bail!("Not logged in.");
    };

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        Output::Table => {
            println!("ID:      {}", user.id);
            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            println!("Role:    {}", user.role);
            println!("Hostel:  {}", user.hostel_id.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}
