//! Offline commands: build or sign request URLs without sending them.

use crate::amazon::signer::{self, Params, Signer};
use crate::amazon::UrlBuilder;
use crate::config::Config;
use anyhow::{Context, Result};
use tracing::debug;

/// Prints the signed URL for an operation.
pub struct UrlCommand {
    config: Config,
}

impl UrlCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Builds the signed URL for `operation` with `Key=Value` parameters.
    pub fn execute(&self, operation: &str, params: &[String]) -> Result<String> {
        let operation = operation.trim();
        if operation.is_empty() {
            anyhow::bail!("Operation must not be empty");
        }

        let params = parse_params(params)?;
        let credential = self.config.credential().context("Missing credentials")?;
        let builder = UrlBuilder::new(credential, self.config.locale)
            .with_signer(Signer::new(self.config.version.clone()));

        debug!("Building {} URL with {} parameter(s)", operation, params.len());
        builder.build_signed_url(operation, &params).context("Failed to build signed URL")
    }
}

/// Signs an arbitrary request URL with the configured secret key.
pub struct SignCommand {
    config: Config,
}

impl SignCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn execute(&self, url: &str, version: Option<&str>) -> Result<String> {
        let credential = self.config.credential().context("Missing credentials")?;
        let version = version.unwrap_or(&self.config.version);

        signer::sign(url, credential.secret_key(), Some(version)).context("Failed to sign URL")
    }
}

/// Parses `Key=Value` arguments. A missing `=` means an empty value.
pub fn parse_params(args: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for arg in args {
        let (key, value) = arg.split_once('=').unwrap_or((arg.as_str(), ""));
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid parameter '{}': expected Key=Value", arg);
        }
        params.insert(key, value);
    }
    Ok(params)
}
