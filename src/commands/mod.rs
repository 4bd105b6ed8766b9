//! CLI command implementations.

pub mod lookup;
pub mod search;
pub mod sign;

pub use lookup::LookupCommand;
pub use search::SearchCommand;
pub use sign::{SignCommand, UrlCommand};

use crate::amazon::client::HttpFetch;
use crate::amazon::ErrorRecord;
use crate::api::AmazonApi;
use crate::config::Config;
use crate::format::Formatter;
use crate::transform::Output;

/// Rendered command result plus the failures the client recorded on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub errors: Vec<ErrorRecord>,
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), errors: Vec::new() }
    }
}

fn render<F: HttpFetch>(api: &AmazonApi<F>, config: &Config, output: &Output) -> CommandOutput {
    let formatter = Formatter::new(config.format).with_currency(api.url_builder().locale().currency());
    CommandOutput { text: formatter.format_output(output), errors: api.errors() }
}
