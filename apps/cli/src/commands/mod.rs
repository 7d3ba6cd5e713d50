//! Command handlers, one module per area.

mod account;
mod catalog;

use crate::app::App;
use crate::cli::{Commands, ProductCommands};

pub async fn dispatch(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Products { action } => match action {
            ProductCommands::List {
                category,
                min_price,
                max_price,
                search,
            } => catalog::list(app, category, min_price, max_price, search).await,
            ProductCommands::Show { id, size, qty } => catalog::show(app, id, size, qty).await,
        },
        Commands::Login { email, password } => account::login(app, &email, password.password).await,
        Commands::Register {
            email,
            password,
            confirm,
            first_name,
            last_name,
        } => {
            account::register(app, email, password.password, confirm, first_name, last_name).await
        }
        Commands::Whoami => account::whoami(app).await,
        Commands::Profile {
            email,
            first_name,
            last_name,
        } => account::update_profile(app, email, first_name, last_name).await,
        Commands::Logout => account::logout(app),
    }
}

/// Prints a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
