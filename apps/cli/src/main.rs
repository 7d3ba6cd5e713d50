//! # Vitrine CLI
//!
//! Command-line storefront over the Vitrine REST API.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load .env (dotenvy)                                                 │
//! │  2. Initialize tracing (RUST_LOG, stderr)                               │
//! │  3. Load ClientConfig (file → env → flags → validate)                   │
//! │  4. Build Session + Catalog (stored tokens are not read yet)            │
//! │  5. Run the command, map errors to an exit code                         │
//! │     (whoami restores the session; profile uses the stored tokens)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! vitrine products list --category watches --max-price 200
//! vitrine products show 2 --size 2 --qty 1
//! VITRINE_PASSWORD='correct horse' vitrine login -e ana@example.com
//! vitrine whoami
//! vitrine logout
//! ```

mod app;
mod cli;
mod commands;
mod exit;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::Cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(exit::code_for(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::init(&cli)?;
    commands::dispatch(&app, cli.command).await
}

/// Installs the fmt subscriber on stderr so stdout stays clean for output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info,vitrine=debug" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
