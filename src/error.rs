//! Error types shared by the signing and response pipelines.

use crate::amazon::response::ApiError;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the Product Advertising API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mandatory credential field was missing at construction.
    #[error("{0} should be defined")]
    Configuration(&'static str),

    /// The URL handed to the signer could not be parsed.
    #[error("malformed request URL '{url}': {reason}")]
    MalformedInput { url: String, reason: String },

    /// The HTTP collaborator failed to deliver a response body.
    #[error("Error downloading data : {url} : {reason}")]
    Transport { url: String, reason: String },

    /// The response body was not well-formed XML.
    #[error("failed to parse response XML: {0}")]
    Parse(String),

    /// The response document was empty.
    #[error("No XML response found from AWS.")]
    NoResponse,

    /// The response document had no `Items` container.
    #[error("No items found.")]
    NoItems,

    /// The service flagged the request as invalid.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A document could not be written back out as text.
    #[error("failed to serialize response: {0}")]
    Serialize(String),
}

impl Error {
    /// Short, stable code identifying the failure, used in error records.
    pub fn code(&self) -> &str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::MalformedInput { .. } => "MalformedInputError",
            Error::Transport { .. } => "TransportError",
            Error::Parse(_) => "ParseError",
            Error::NoResponse => "NoResponse",
            Error::NoItems => "NoItems",
            Error::Api(api) => &api.code,
            Error::Serialize(_) => "SerializeError",
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl Into<String>) -> Self {
        Error::MalformedInput { url: url.to_string(), reason: reason.into() }
    }
}
