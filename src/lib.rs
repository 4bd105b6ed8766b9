//! amz-paapi - Amazon Product Advertising API client
//!
//! Signs requests against the regional XML endpoints and turns the
//! responses into documents, text or normalized item lists.

pub mod amazon;
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod transform;

pub use amazon::models::{ErrorRecord, NormalizedItem};
pub use amazon::locales::Locale;
pub use api::{AmazonApi, ItemLookup, ItemSearch};
pub use config::Config;
pub use error::{Error, Result};
pub use transform::{Output, Transformer};
