//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vitrine_core::Money;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Vitrine storefront from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to vitrine.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "VITRINE_API_URL")]
    pub api_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductCommands,
    },

    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Create an account and sign in
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        #[command(flatten)]
        password: PasswordArg,

        /// Password confirmation (defaults to the password)
        #[arg(long, env = "VITRINE_PASSWORD_CONFIRM", hide_env_values = true)]
        confirm: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Show the signed-in user
    Whoami,

    /// Update profile fields
    Profile {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Forget the stored session
    Logout,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products, optionally filtered
    List {
        /// Category name (case-insensitive on the server)
        #[arg(long)]
        category: Option<String>,

        /// Minimum price, e.g. 49.99
        #[arg(long, value_parser = parse_money)]
        min_price: Option<Money>,

        /// Maximum price, e.g. 200
        #[arg(long, value_parser = parse_money)]
        max_price: Option<Money>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one product and check it against a cart
    Show {
        /// Product ID
        id: i64,

        /// Size ID to select (defaults to the first size in stock)
        #[arg(long)]
        size: Option<i64>,

        /// Quantity to check
        #[arg(long, default_value_t = 1)]
        qty: i64,
    },
}

#[derive(Args)]
pub struct PasswordArg {
    /// Password (prefer the environment variable)
    #[arg(short, long, env = "VITRINE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse_decimal(s).map_err(|e| e.to_string())
}
