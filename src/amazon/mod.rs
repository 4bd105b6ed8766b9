//! Amazon-specific modules for signing, transport, parsing, and data models.

pub mod client;
pub mod credentials;
pub mod document;
pub mod extract;
pub mod locales;
pub mod models;
pub mod response;
pub mod signer;
pub mod url_builder;

pub use client::{HttpClient, HttpFetch};
pub use credentials::Credential;
pub use document::{Document, Element};
pub use extract::extract_items;
pub use locales::Locale;
pub use models::{ErrorRecord, NormalizedItem};
pub use response::{validate, ApiError, Validation};
pub use signer::{canonicalize, sign, Params, Signer};
pub use url_builder::UrlBuilder;
