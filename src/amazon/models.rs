//! Data models produced by the response pipeline.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// One item of a validated response, reduced to the commonly used fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Amazon Standard Identification Number
    pub asin: String,
    /// Detail page URL
    pub url: String,
    /// List price in major currency units
    pub list_price: f64,
    /// Product title
    pub title: String,
    /// Lowest new offer in major units, 0.0 when there is no offer summary
    pub lowest_offer_price: f64,
    pub large_image_url: String,
    pub medium_image_url: String,
    pub small_image_url: String,
}

impl NormalizedItem {
    /// Returns true when the item carries a lowest offer price.
    pub fn has_offer(&self) -> bool {
        self.lowest_offer_price > 0.0
    }

    /// Returns how far the lowest offer undercuts the list price, in percent.
    pub fn discount_percent(&self) -> Option<u8> {
        if !self.has_offer() || self.list_price <= 0.0 || self.lowest_offer_price >= self.list_price {
            return None;
        }
        let discount = ((self.list_price - self.lowest_offer_price) / self.list_price * 100.0).round() as u8;
        Some(discount.min(99))
    }

    /// Returns the largest available image URL.
    pub fn best_image_url(&self) -> Option<&str> {
        [&self.large_image_url, &self.medium_image_url, &self.small_image_url]
            .into_iter()
            .find(|u| !u.is_empty())
            .map(String::as_str)
    }
}

/// A failure kept in the client's error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

impl From<&Error> for ErrorRecord {
    fn from(err: &Error) -> Self {
        match err {
            Error::Api(api) => Self::new(&api.code, &api.message),
            other => Self::new(other.code(), other.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amazon::response::ApiError;

    fn make_item(list_price: f64, lowest_offer_price: f64) -> NormalizedItem {
        NormalizedItem {
            asin: "B0001".to_string(),
            title: "Test".to_string(),
            list_price,
            lowest_offer_price,
            ..Default::default()
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(make_item(100.0, 75.0).discount_percent(), Some(25));
        assert_eq!(make_item(19.99, 14.99).discount_percent(), Some(25));
    }

    #[test]
    fn test_no_discount() {
        assert_eq!(make_item(100.0, 0.0).discount_percent(), None);
        assert_eq!(make_item(0.0, 10.0).discount_percent(), None);
        assert_eq!(make_item(10.0, 12.0).discount_percent(), None);
    }

    #[test]
    fn test_best_image_url() {
        let mut item = make_item(1.0, 0.0);
        assert_eq!(item.best_image_url(), None);

        item.small_image_url = "small.jpg".to_string();
        assert_eq!(item.best_image_url(), Some("small.jpg"));

        item.large_image_url = "large.jpg".to_string();
        assert_eq!(item.best_image_url(), Some("large.jpg"));
    }

    #[test]
    fn test_item_serialization() {
        let json = serde_json::to_value(make_item(12.5, 0.0)).unwrap();
        assert_eq!(json["asin"], "B0001");
        assert_eq!(json["list_price"], 12.5);
        assert_eq!(json["lowest_offer_price"], 0.0);
        assert_eq!(json["large_image_url"], "");
    }

    #[test]
    fn test_error_record_from_api_error() {
        let err = Error::from(ApiError::new("AWS.ECommerceService.NoExactMatches", "No results."));
        let record = ErrorRecord::from(&err);
        assert_eq!(record, ErrorRecord::new("AWS.ECommerceService.NoExactMatches", "No results."));
    }

    #[test]
    fn test_error_record_from_other_errors() {
        let record = ErrorRecord::from(&Error::NoItems);
        assert_eq!(record.code, "NoItems");
        assert_eq!(record.message, "No items found.");

        let record = ErrorRecord::from(&Error::Transport { url: "u".to_string(), reason: "r".to_string() });
        assert_eq!(record.message, "Error downloading data : u : r");
        assert_eq!(record.to_string(), "TransportError: Error downloading data : u : r");
    }
}
