//! Command execution

use super::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::{JsonLineSink, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::state::StateManager;
use crate::streams::StreamRegistry;
use tracing::info;

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { config_json } => self.check(config_json.as_deref()).await,
            Commands::Streams => self.streams(),
            Commands::Sync { config_json } => self.sync(config_json.as_deref()).await,
        }
    }

    async fn check(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let client = self.build_client(&config)?;

        client
            .get_json("/users", &[("limit".to_string(), "1".to_string())])
            .await?;
        println!("Connection OK");
        Ok(())
    }

    fn streams(&self) -> Result<()> {
        let registry = StreamRegistry::builtin()?;
        for name in registry.names() {
            println!("{name}");
        }
        Ok(())
    }

    async fn sync(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let client = self.build_client(&config)?;
        let state = self.load_state()?;
        let registry = StreamRegistry::builtin()?;

        let mut engine = SyncEngine::new(client, state, config.start_timestamp_millis()?);
        let mut sink = JsonLineSink::new(std::io::stdout().lock());

        let stats = engine.run(&registry, &mut sink).await?;
        info!(
            records = stats.records_emitted,
            pages = stats.pages_fetched,
            skipped = stats.contexts_skipped,
            duration_ms = stats.duration_ms,
            "sync finished"
        );
        Ok(())
    }

    fn load_config(&self, inline: Option<&str>) -> Result<TapConfig> {
        if let Some(json) = inline {
            return TapConfig::from_json(json);
        }
        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config(
                "no configuration provided; pass --config or --config-json",
            )),
        }
    }

    fn load_state(&self) -> Result<StateManager> {
        if let Some(json) = &self.cli.state_json {
            return StateManager::from_json(json);
        }
        match &self.cli.state {
            Some(path) => StateManager::from_file(path),
            None => Ok(StateManager::in_memory()),
        }
    }

    fn build_client(&self, config: &TapConfig) -> Result<HttpClient> {
        HttpClient::new(HttpClientConfig::new(
            config.base_url(),
            config.api_token.clone(),
        ))
    }
}
