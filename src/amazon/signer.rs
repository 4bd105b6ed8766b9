//! Query canonicalization and HMAC-SHA256 request signing.
//!
//! The service verifies a signature computed over
//! `GET\n<host>\n<path>\n<canonical query>`, so every byte produced here
//! (key order, escaping, newline count) has to match what the service
//! recomputes on its side.

use crate::error::{Error, Result};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use url::Url;

/// Protocol version sent when the caller does not pick one.
pub const DEFAULT_VERSION: &str = "2011-08-01";

/// Format of the `Timestamp` parameter: "2014-08-18T12:00:00Z".
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Every byte except `A-Z a-z 0-9 - _ .` is escaped.
///
/// `~` is escaped here and restored afterwards by [`strict_encode`].
static STRICT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// Percent-encodes a key or value the way the service expects.
///
/// Spaces become `%20` (never `+`) and `%7E` is turned back into `~`.
pub fn strict_encode(input: &str) -> String {
    utf8_percent_encode(input, &STRICT_ENCODE_SET).to_string().replace("%7E", "~")
}

/// Request parameters keyed by name.
///
/// Keys are kept in byte order. A `None` value marks a parameter that was
/// not supplied; it is skipped entirely when canonicalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Option<String>>);

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Some(value.into()));
    }

    /// Sets a parameter that may be absent.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        self.0.insert(key.into(), value.map(Into::into));
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value of a present parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a parameter, returning its value if it had one.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key).flatten()
    }

    /// Iterates in byte order of the keys.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Sorted, strictly encoded `key=value&...` string covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery(String);

impl CanonicalQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes parameters into their canonical query form.
pub fn canonicalize(params: &Params) -> CanonicalQuery {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{}={}", strict_encode(k), strict_encode(v))))
        .collect();

    CanonicalQuery(pairs.join("&"))
}

/// Builds the exact string that gets signed.
pub fn signature_payload(host: &str, path: &str, query: &CanonicalQuery) -> String {
    format!("GET\n{}\n{}\n{}", host, path, query)
}

/// Base64 HMAC-SHA256 of `payload`, strictly encoded for use in a query.
pub fn compute_signature(payload: &str, secret_key: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
        .map_err(|_| Error::Configuration("Amazon secret key"))?;
    mac.update(payload.as_bytes());

    Ok(strict_encode(&BASE64_STANDARD.encode(mac.finalize().into_bytes())))
}

/// A signed request, ready to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    /// Canonical query with `&Signature=...` appended.
    pub query: String,
}

impl SignedRequest {
    /// Returns the absolute URL.
    pub fn to_url(&self) -> String {
        self.to_string()
    }

    /// Returns the encoded signature value.
    pub fn signature(&self) -> &str {
        self.query.rsplit_once("&Signature=").map(|(_, sig)| sig).unwrap_or_default()
    }
}

impl fmt::Display for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "{}?{}", self.path, self.query)
    }
}

/// Signs request URLs with a fixed protocol version.
#[derive(Debug, Clone)]
pub struct Signer {
    version: String,
    time: Option<DateTime<Utc>>,
}

impl Default for Signer {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl Signer {
    /// Creates a signer stamping requests with the given `Version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into(), time: None }
    }

    /// Freezes the signing time.
    ///
    /// Real requests must be signed with the current time; this exists so
    /// signatures can be reproduced.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Signs `raw_url` and returns the absolute signed URL.
    pub fn sign(&self, raw_url: &str, secret_key: &str) -> Result<String> {
        Ok(self.sign_request(raw_url, secret_key)?.to_url())
    }

    /// Signs `raw_url`, keeping the request split into its parts.
    ///
    /// `Timestamp` and `Version` are overwritten and any previous
    /// `Signature` is dropped before the query is canonicalized.
    pub fn sign_request(&self, raw_url: &str, secret_key: &str) -> Result<SignedRequest> {
        let url = Url::parse(raw_url).map_err(|e| Error::malformed(raw_url, e.to_string()))?;
        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => return Err(Error::malformed(raw_url, "missing host")),
        };

        let mut params: Params =
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        params.remove("Signature");

        let now = self.time.unwrap_or_else(Utc::now);
        params.insert("Timestamp", now.format(TIMESTAMP_FORMAT).to_string());
        params.insert("Version", self.version.as_str());

        let canonical = canonicalize(&params);
        let payload = signature_payload(host, url.path(), &canonical);
        let signature = compute_signature(&payload, secret_key)?;

        debug!("Signed request for {}{} ({} parameters)", host, url.path(), params.len());

        Ok(SignedRequest {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port(),
            path: url.path().to_string(),
            query: format!("{}&Signature={}", canonical, signature),
        })
    }
}

/// Signs `raw_url` with the current time and `version` (default [`DEFAULT_VERSION`]).
pub fn sign(raw_url: &str, secret_key: &str, version: Option<&str>) -> Result<String> {
    Signer::new(version.unwrap_or(DEFAULT_VERSION)).sign(raw_url, secret_key)
}
