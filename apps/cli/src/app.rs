//! Application context: the owned session and catalog.

use anyhow::Context;
use tracing::{debug, info};

use vitrine_client::{Catalog, ClientConfig, Session};

use crate::cli::Cli;

/// Everything a command needs. Built once per invocation and passed down
/// by reference.
pub struct App {
    pub session: Session,
    pub catalog: Catalog,
    pub json: bool,
}

impl App {
    /// Loads configuration and builds the session.
    ///
    /// Tokens are not touched here; commands that need the signed-in user
    /// call [`Session::restore`] themselves.
    pub fn init(cli: &Cli) -> anyhow::Result<Self> {
        let mut config =
            ClientConfig::load(cli.config.clone()).context("Failed to load configuration")?;

        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
            config.validate().context("Invalid --api-url")?;
        }

        info!(
            api = %config.api.base_url,
            store = %config.storage.backend,
            "Configuration loaded"
        );

        let session = Session::from_config(&config)?;
        let catalog = Catalog::new(session.api().clone());
        debug!(base = %session.api().base_url(), "Client ready");

        Ok(App {
            session,
            catalog,
            json: cli.json,
        })
    }
}
