//! Composition of signed Product Advertising API request URLs.

use crate::amazon::credentials::Credential;
use crate::amazon::locales::Locale;
use crate::amazon::signer::{Params, Signer};
use crate::error::Result;
use tracing::{debug, warn};

/// Service name sent with every request.
pub const SERVICE: &str = "AWSECommerceService";

/// Builds signed request URLs for one credential and locale.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    credential: Credential,
    locale: Locale,
    signer: Signer,
    endpoint: Option<String>,
}

impl UrlBuilder {
    /// Creates a builder targeting the locale's regional endpoint.
    pub fn new(credential: Credential, locale: Locale) -> Self {
        Self { credential, locale, signer: Signer::default(), endpoint: None }
    }

    /// Replaces the signer, e.g. to change the protocol version.
    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    /// Overrides the endpoint URL (for testing against a local server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| self.locale.endpoint())
    }

    /// Identity parameters present on every request.
    pub fn base_params(&self) -> Params {
        Params::new()
            .with("Service", SERVICE)
            .with("AssociateTag", self.credential.associate_tag())
            .with("AWSAccessKeyId", self.credential.access_key_id())
    }

    /// Merges operation parameters under the identity parameters.
    ///
    /// Absent and empty values are dropped. `Operation` and the identity
    /// parameters cannot be overridden by `params`.
    pub fn merge_params(&self, operation: &str, params: &Params) -> Params {
        let mut merged = Params::new();
        for (key, value) in params.iter() {
            match value {
                Some(value) if !value.is_empty() => merged.insert(key, value),
                _ => {}
            }
        }

        if let Some(previous) = merged.get("Operation").filter(|op| *op != operation) {
            warn!("Ignoring Operation={} in favour of {}", previous, operation);
        }
        merged.insert("Operation", operation);

        for (key, value) in self.base_params().iter() {
            let Some(value) = value else { continue };
            if merged.get(key).is_some_and(|existing| existing != value) {
                warn!("Ignoring caller-supplied {}; identity parameters are fixed", key);
            }
            merged.insert(key, value);
        }

        merged
    }

    /// Returns the request URL before signing.
    pub fn unsigned_url(&self, operation: &str, params: &Params) -> String {
        let merged = self.merge_params(operation, params);
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(merged.iter().filter_map(|(k, v)| v.map(|v| (k, v))))
            .finish();

        format!("{}?{}", self.endpoint(), query)
    }

    /// Returns the signed URL for `operation` with `params`.
    pub fn build_signed_url(&self, operation: &str, params: &Params) -> Result<String> {
        let unsigned = self.unsigned_url(operation, params);
        let signed = self.signer.sign_request(&unsigned, self.credential.secret_key())?;

        debug!(
            "Built {} request for {}{} (locale {})",
            operation, signed.host, signed.path, self.locale
        );

        Ok(signed.to_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_builder(locale: Locale) -> UrlBuilder {
        let cred = Credential::new("defaultKeyId", "defaultSecretKey", "defaultAssociateTag").unwrap();
        UrlBuilder::new(cred, locale)
    }

    fn query_param(url: &str, key: &str) -> Option<String> {
        let parsed = url::Url::parse(url).unwrap();
        let value = parsed.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned());
        value
    }

    #[test]
    fn test_default_locale_host() {
        let url = make_builder(Locale::Us).build_signed_url("ItemLookup", &Params::new()).unwrap();
        assert!(url.starts_with("https://webservices.amazon.com/onca/xml?"));
    }

    #[test]
    fn test_locale_hosts() {
        let cases = [
            (Locale::Uk, "amazon.co.uk"),
            (Locale::Jp, "amazon.co.jp"),
            (Locale::Mx, "amazon.com.mx"),
            (Locale::De, "amazon.de"),
            (Locale::lookup("unknown"), "webservices.amazon.com/"),
        ];

        for (locale, expected) in cases {
            let url = make_builder(locale).build_signed_url("ItemLookup", &Params::new()).unwrap();
            assert!(url.contains(expected), "{} not in {}", expected, url);
        }
    }

    #[test]
    fn test_contains_identity_parameters() {
        let url = make_builder(Locale::Us).build_signed_url("ItemLookup", &Params::new()).unwrap();

        assert!(url.contains("Service=AWSECommerceService"));
        assert!(url.contains("AssociateTag=defaultAssociateTag"));
        assert!(url.contains("AWSAccessKeyId=defaultKeyId"));
        assert!(url.contains("Operation=ItemLookup"));
        assert!(url.contains("Version=2011-08-01"));
        assert!(url.contains("&Signature="));
    }

    #[test]
    fn test_timestamp_format() {
        let url = make_builder(Locale::Us).build_signed_url("ItemLookup", &Params::new()).unwrap();
        let timestamp = query_param(&url, "Timestamp").unwrap();

        assert_eq!(timestamp.len(), 20);
        assert!(chrono::NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%SZ").is_ok());
    }

    #[test]
    fn test_response_group_encoding() {
        let params = Params::new().with("ResponseGroup", "ItemAttributes,Offers,Reviews,Images,EditorialReview");
        let url = make_builder(Locale::Us).build_signed_url("ItemLookup", &params).unwrap();

        assert!(url.contains(
            "ResponseGroup=ItemAttributes%2COffers%2CReviews%2CImages%2CEditorialReview"
        ));
    }

    #[test]
    fn test_identity_parameters_cannot_be_spoofed() {
        let params = Params::new()
            .with("AWSAccessKeyId", "attacker")
            .with("AssociateTag", "attacker-20")
            .with("Service", "Other")
            .with("Operation", "CartCreate");

        let merged = make_builder(Locale::Us).merge_params("ItemSearch", &params);
        assert_eq!(merged.get("AWSAccessKeyId"), Some("defaultKeyId"));
        assert_eq!(merged.get("AssociateTag"), Some("defaultAssociateTag"));
        assert_eq!(merged.get("Service"), Some("AWSECommerceService"));
        assert_eq!(merged.get("Operation"), Some("ItemSearch"));
    }

    #[test]
    fn test_absent_and_empty_values_are_omitted() {
        let mut params = Params::new().with("Keywords", "rust").with("Sort", "");
        params.insert_opt("Condition", None::<String>);

        let url = make_builder(Locale::Us).build_signed_url("ItemSearch", &params).unwrap();
        assert!(url.contains("Keywords=rust"));
        assert!(!url.contains("Sort="));
        assert!(!url.contains("Condition="));
    }

    #[test]
    fn test_unsigned_url() {
        let params = Params::new().with("Keywords", "harry potter");
        let url = make_builder(Locale::Uk).unsigned_url("ItemSearch", &params);

        assert!(url.starts_with("https://webservices.amazon.co.uk/onca/xml?"));
        assert!(url.contains("Keywords=harry+potter"));
        assert!(!url.contains("Signature"));
    }

    #[test]
    fn test_custom_endpoint() {
        let builder = make_builder(Locale::De).with_endpoint("http://127.0.0.1:9000/onca/xml");
        assert_eq!(builder.endpoint(), "http://127.0.0.1:9000/onca/xml");

        let url = builder.build_signed_url("ItemLookup", &Params::new()).unwrap();
        assert!(url.starts_with("http://127.0.0.1:9000/onca/xml?"));
    }

    #[test]
    fn test_fixed_signer_is_reproducible() {
        let time = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let builder = make_builder(Locale::Us).with_signer(Signer::default().with_time(time));
        let params = Params::new().with("ItemId", "B0001");

        let first = builder.build_signed_url("ItemLookup", &params).unwrap();
        let second = builder.build_signed_url("ItemLookup", &params).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Timestamp=2020-01-02T03%3A04%3A05Z"));
    }
}
