//! Search command implementation.

use super::{render, CommandOutput};
use crate::amazon::client::HttpFetch;
use crate::api::{AmazonApi, ItemSearch};
use crate::config::Config;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Executes a keyword search.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, search: &ItemSearch) -> Result<CommandOutput> {
        let api = AmazonApi::from_config(&self.config).context("Failed to create API client")?;

        self.execute_with_api(&api, search).await
    }

    /// Executes the search with a provided client (for testing).
    pub async fn execute_with_api<F: HttpFetch>(
        &self,
        api: &AmazonApi<F>,
        search: &ItemSearch,
    ) -> Result<CommandOutput> {
        let keywords = search.keywords.trim();
        if keywords.is_empty() {
            anyhow::bail!("Search keywords must not be empty");
        }

        info!("Searching for: {}", keywords);

        let output = api
            .item_search(search)
            .await
            .with_context(|| format!("Search for '{}' failed", keywords))?;

        debug!("Search returned {} items", output.items().len());
        Ok(render(api, &self.config, &output))
    }
}
