//! Output transformers applied to parsed responses.

use crate::amazon::document::Document;
use crate::amazon::extract::extract_items;
use crate::amazon::models::{ErrorRecord, NormalizedItem};
use crate::amazon::response::validate;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Representation a client produces for every response.
///
/// Chosen once when the client is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transformer {
    /// The parsed document, untouched.
    Document,
    /// The document re-serialized as XML text.
    Xml,
    /// The document's JSON mirror as text.
    Json,
    /// Normalized items; failures are recorded and yield an empty list.
    #[default]
    Items,
    /// Normalized items; failures are returned as errors.
    StrictItems,
}

/// Result of running a transformer over one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Document(Document),
    Text(String),
    Items(Vec<NormalizedItem>),
    /// The request failed and the failure was recorded in the error log.
    Failed,
}

impl Output {
    /// Returns the items of an item-list output, or an empty slice otherwise.
    pub fn items(&self) -> &[NormalizedItem] {
        match self {
            Output::Items(items) => items,
            _ => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Output::Failed)
    }
}

impl Transformer {
    /// Returns true for the variant that propagates failures.
    pub fn is_strict(&self) -> bool {
        matches!(self, Transformer::StrictItems)
    }

    /// Transforms a parsed document.
    ///
    /// Only [`Transformer::StrictItems`] and serialization failures return
    /// `Err`; the item list variant records validation failures in `errors`.
    pub fn transform(&self, doc: Document, errors: &ErrorLog) -> Result<Output> {
        match self {
            Transformer::Document => Ok(Output::Document(doc)),
            Transformer::Xml => doc.to_xml().map(Output::Text),
            Transformer::Json => doc.to_json_string().map(Output::Text),
            Transformer::Items => match validate(&doc).into_result() {
                Ok(()) => Ok(Output::Items(extract_items(&doc))),
                Err(err) => {
                    errors.record(&err);
                    Ok(Output::Items(Vec::new()))
                }
            },
            Transformer::StrictItems => {
                validate(&doc).into_result()?;
                Ok(Output::Items(extract_items(&doc)))
            }
        }
    }

    /// Handles a failure that happened before a document was available.
    ///
    /// The strict variant hands the error back; every other variant records
    /// it and answers [`Output::Failed`].
    pub fn fail(&self, err: Error, errors: &ErrorLog) -> Result<Output> {
        if self.is_strict() {
            return Err(err);
        }
        errors.record(&err);
        Ok(Output::Failed)
    }
}

impl fmt::Display for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transformer::Document => "document",
            Transformer::Xml => "xml",
            Transformer::Json => "json",
            Transformer::Items => "items",
            Transformer::StrictItems => "strict-items",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Transformer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" => Ok(Transformer::Document),
            "xml" => Ok(Transformer::Xml),
            "json" => Ok(Transformer::Json),
            "items" => Ok(Transformer::Items),
            "strict-items" | "strict" => Ok(Transformer::StrictItems),
            _ => Err(format!(
                "Unknown transformer: {}. Valid options: document, xml, json, items, strict-items",
                s
            )),
        }
    }
}

/// Failures recorded by non-strict transformers, shared across requests.
#[derive(Debug, Default)]
pub struct ErrorLog {
    records: Mutex<Vec<ErrorRecord>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, err: &Error) {
        warn!("Request failed: {}", err);
        self.push(ErrorRecord::from(err));
    }

    pub fn push(&self, record: ErrorRecord) {
        self.records.lock().push(record);
    }

    /// Returns a copy of the recorded errors, oldest first.
    pub fn snapshot(&self) -> Vec<ErrorRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        let cleared = std::mem::take(&mut *self.records.lock());
        debug!("Cleared {} recorded errors", cleared.len());
    }
}
