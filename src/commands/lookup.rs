//! Item lookup command implementation.

use super::{render, CommandOutput};
use crate::amazon::client::HttpFetch;
use crate::api::{AmazonApi, ItemLookup};
use crate::config::Config;
use anyhow::{Context, Result};
use tracing::info;

/// Looks items up by ASIN.
pub struct LookupCommand {
    config: Config,
}

impl LookupCommand {
    /// Creates a new lookup command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the items and returns formatted output.
    pub async fn execute(&self, lookup: &ItemLookup) -> Result<CommandOutput> {
        let api = AmazonApi::from_config(&self.config).context("Failed to create API client")?;

        self.execute_with_api(&api, lookup).await
    }

    /// Fetches the items with a provided client (for testing).
    pub async fn execute_with_api<F: HttpFetch>(
        &self,
        api: &AmazonApi<F>,
        lookup: &ItemLookup,
    ) -> Result<CommandOutput> {
        if lookup.asins.is_empty() {
            anyhow::bail!("At least one ASIN is required");
        }

        let asins = lookup.asins.iter().map(|asin| normalize_asin(asin)).collect::<Result<Vec<_>>>()?;
        let lookup = ItemLookup { asins, ..lookup.clone() };

        info!("Looking up {} item(s)", lookup.asins.len());

        let output = api
            .item_lookup(&lookup)
            .await
            .with_context(|| format!("Lookup of {} failed", lookup.asins.join(",")))?;

        Ok(render(api, &self.config, &output))
    }
}

/// Validates an ASIN (10 alphanumeric characters) and upper-cases it.
fn normalize_asin(asin: &str) -> Result<String> {
    let asin = asin.trim().to_uppercase();
    if asin.len() != 10 || !asin.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!("Invalid ASIN format: '{}'. ASIN should be 10 alphanumeric characters.", asin);
    }
    Ok(asin)
}
