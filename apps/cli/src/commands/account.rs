//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! VITRINE_PASSWORD='correct horse' vitrine login -e ana@example.com
//! vitrine register -e bea@example.com --first-name Bea
//! vitrine profile --last-name Souza
//! vitrine whoami
//! vitrine logout
//! ```
//!
//! # Environment Variables
//!
//! - `VITRINE_PASSWORD` - Password for `login` and `register`
//! - `VITRINE_PASSWORD_CONFIRM` - Confirmation for `register`

use anyhow::Context;
use secrecy::SecretString;
use tracing::info;

use vitrine_core::{ProfileUpdate, RegistrationForm, User};

use super::print_json;
use crate::app::App;

pub async fn login(app: &App, email: &str, password: String) -> anyhow::Result<()> {
    let password = SecretString::from(password);
    let user = app.session.login(email, &password).await?;
    info!(user_id = user.id, "Signed in");
    print_user(app, &user, "Signed in as")
}

pub async fn register(
    app: &App,
    email: String,
    password: String,
    confirm: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> anyhow::Result<()> {
    let password2 = confirm.unwrap_or_else(|| password.clone());
    let form = RegistrationForm {
        email,
        password,
        password2,
        first_name,
        last_name,
    };

    let user = app.session.register(&form).await?;
    print_user(app, &user, "Account created for")
}

pub async fn whoami(app: &App) -> anyhow::Result<()> {
    match app.session.restore().await? {
        Some(user) => print_user(app, &user, "Signed in as"),
        None if app.json => print_json(&serde_json::Value::Null),
        None => {
            println!("Not signed in.");
            Ok(())
        }
    }
}

pub async fn update_profile(
    app: &App,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> anyhow::Result<()> {
    let update = ProfileUpdate {
        email,
        first_name,
        last_name,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to update: pass --email, --first-name or --last-name");
    }

    let user = app
        .session
        .update_profile(&update)
        .await
        .context("Failed to update profile")?;
    print_user(app, &user, "Updated")
}

pub fn logout(app: &App) -> anyhow::Result<()> {
    app.session.logout()?;
    if !app.json {
        println!("Signed out.");
    }
    Ok(())
}

fn print_user(app: &App, user: &User, label: &str) -> anyhow::Result<()> {
    if app.json {
        return print_json(user);
    }
    println!("{} {} <{}>", label, user.display_name(), user.email);
    Ok(())
}
