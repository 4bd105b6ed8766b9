//! Response validation.

use crate::amazon::document::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error reported by the service inside an otherwise well-formed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("API error ({code}) : {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// Outcome of checking a response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    NoResponse,
    NoItems,
    ApiError(ApiError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Converts a failed validation into the matching [`Error`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Validation::Valid => Ok(()),
            Validation::NoResponse => Err(Error::NoResponse),
            Validation::NoItems => Err(Error::NoItems),
            Validation::ApiError(err) => Err(Error::Api(err)),
        }
    }
}

/// Classifies a response document.
///
/// Checks run in order: empty document, missing `Items`, then the
/// `Items/Request/IsValid` flag. A missing flag counts as valid, and so does
/// an `Items` node without any `Item` children.
pub fn validate(doc: &Document) -> Validation {
    if doc.is_empty() {
        debug!("Response document is empty");
        return Validation::NoResponse;
    }

    let Some(items) = doc.find(&["Items"]) else {
        debug!("Response has no Items node");
        return Validation::NoItems;
    };

    match items.text_at(&["Request", "IsValid"]) {
        Some(flag) if flag != "True" => {
            let error = items.find(&["Request", "Errors", "Error"]);
            let code = error.and_then(|e| e.text_at(&["Code"])).unwrap_or_default();
            let message = error.and_then(|e| e.text_at(&["Message"])).unwrap_or_default();
            debug!("Request flagged invalid: {} ({})", code, flag);
            Validation::ApiError(ApiError::new(code, message))
        }
        _ => Validation::Valid,
    }
}
