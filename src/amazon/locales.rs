//! Product Advertising API locales and their regional endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Path of the XML endpoint, identical on every regional host.
pub const ENDPOINT_PATH: &str = "/onca/xml";

/// Supported marketplace locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    Br,
    Ca,
    Cn,
    De,
    Es,
    Fr,
    In,
    It,
    Jp,
    Mx,
    Uk,
    #[default]
    Us,
}

impl Locale {
    /// Returns the API host serving this locale.
    pub fn host(&self) -> &'static str {
        match self {
            Locale::Br => "webservices.amazon.com.br",
            Locale::Ca => "webservices.amazon.ca",
            Locale::Cn => "webservices.amazon.cn",
            Locale::De => "webservices.amazon.de",
            Locale::Es => "webservices.amazon.es",
            Locale::Fr => "webservices.amazon.fr",
            Locale::In => "webservices.amazon.in",
            Locale::It => "webservices.amazon.it",
            Locale::Jp => "webservices.amazon.co.jp",
            Locale::Mx => "webservices.amazon.com.mx",
            Locale::Uk => "webservices.amazon.co.uk",
            Locale::Us => "webservices.amazon.com",
        }
    }

    /// Returns the full endpoint URL requests are built against.
    pub fn endpoint(&self) -> String {
        format!("https://{}{}", self.host(), ENDPOINT_PATH)
    }

    /// Returns the currency prices are reported in for this locale.
    pub fn currency(&self) -> &'static str {
        match self {
            Locale::Br => "BRL",
            Locale::Ca => "CAD",
            Locale::Cn => "CNY",
            Locale::De | Locale::Es | Locale::Fr | Locale::It => "EUR",
            Locale::In => "INR",
            Locale::Jp => "JPY",
            Locale::Mx => "MXN",
            Locale::Uk => "GBP",
            Locale::Us => "USD",
        }
    }

    /// Resolves a locale code, falling back to [`Locale::Us`] for unknown codes.
    ///
    /// Unlike [`FromStr`], this never fails.
    pub fn lookup(code: &str) -> Locale {
        code.parse().unwrap_or_else(|_| {
            debug!("Unknown locale '{}', using us", code);
            Locale::Us
        })
    }

    /// Returns all supported locales.
    pub fn all() -> &'static [Locale] {
        &[
            Locale::Br,
            Locale::Ca,
            Locale::Cn,
            Locale::De,
            Locale::Es,
            Locale::Fr,
            Locale::In,
            Locale::It,
            Locale::Jp,
            Locale::Mx,
            Locale::Uk,
            Locale::Us,
        ]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Locale::Br => "br",
            Locale::Ca => "ca",
            Locale::Cn => "cn",
            Locale::De => "de",
            Locale::Es => "es",
            Locale::Fr => "fr",
            Locale::In => "in",
            Locale::It => "it",
            Locale::Jp => "jp",
            Locale::Mx => "mx",
            Locale::Uk => "uk",
            Locale::Us => "us",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "br" => Ok(Locale::Br),
            "ca" => Ok(Locale::Ca),
            "cn" => Ok(Locale::Cn),
            "de" => Ok(Locale::De),
            "es" => Ok(Locale::Es),
            "fr" => Ok(Locale::Fr),
            "in" => Ok(Locale::In),
            "it" => Ok(Locale::It),
            "jp" => Ok(Locale::Jp),
            "mx" => Ok(Locale::Mx),
            "uk" | "gb" => Ok(Locale::Uk),
            "us" => Ok(Locale::Us),
            _ => Err(LocaleParseError(s.to_string())),
        }
    }
}

// Config files go through the lenient lookup so a stale locale never stops the client.
impl From<String> for Locale {
    fn from(code: String) -> Self {
        Locale::lookup(&code)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct LocaleParseError(String);

impl fmt::Display for LocaleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown locale '{}'. Valid locales: br, ca, cn, de, es, fr, in, it, jp, mx, uk, us",
            self.0
        )
    }
}

impl std::error::Error for LocaleParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parsing_all() {
        for locale in Locale::all() {
            assert_eq!(Locale::from_str(&locale.to_string()).unwrap(), *locale);
        }

        assert_eq!(Locale::from_str("GB").unwrap(), Locale::Uk);
        assert_eq!(Locale::from_str(" DE ").unwrap(), Locale::De);

        assert!(Locale::from_str("germany").is_err());
        assert!(Locale::from_str("").is_err());
    }

    #[test]
    fn test_lookup_falls_back_to_us() {
        assert_eq!(Locale::lookup("de"), Locale::De);
        assert_eq!(Locale::lookup("unknown"), Locale::Us);
        assert_eq!(Locale::lookup(""), Locale::Us);
    }

    #[test]
    fn test_locale_hosts() {
        assert_eq!(Locale::Us.host(), "webservices.amazon.com");
        assert_eq!(Locale::Uk.host(), "webservices.amazon.co.uk");
        assert_eq!(Locale::De.host(), "webservices.amazon.de");
        assert_eq!(Locale::Jp.host(), "webservices.amazon.co.jp");
        assert_eq!(Locale::Mx.host(), "webservices.amazon.com.mx");
        assert_eq!(Locale::Br.host(), "webservices.amazon.com.br");
        assert_eq!(Locale::Cn.host(), "webservices.amazon.cn");
    }

    #[test]
    fn test_locale_endpoint() {
        assert_eq!(Locale::Us.endpoint(), "https://webservices.amazon.com/onca/xml");
        assert_eq!(Locale::De.endpoint(), "https://webservices.amazon.de/onca/xml");
    }

    #[test]
    fn test_locale_currencies() {
        assert_eq!(Locale::Us.currency(), "USD");
        assert_eq!(Locale::Uk.currency(), "GBP");
        assert_eq!(Locale::De.currency(), "EUR");
        assert_eq!(Locale::Fr.currency(), "EUR");
        assert_eq!(Locale::Jp.currency(), "JPY");
        assert_eq!(Locale::Cn.currency(), "CNY");
    }

    #[test]
    fn test_locale_all() {
        let all = Locale::all();
        assert_eq!(all.len(), 12);
        assert!(all.contains(&Locale::Us));
        assert!(all.contains(&Locale::Cn));
    }

    #[test]
    fn test_locale_default() {
        assert_eq!(Locale::default(), Locale::Us);
    }

    #[test]
    fn test_locale_parse_error_display() {
        let msg = Locale::from_str("xyz").unwrap_err().to_string();
        assert!(msg.contains("xyz"));
        assert!(msg.contains("Valid locales"));
    }

    #[test]
    fn test_locale_serde_is_lenient() {
        let json = serde_json::to_string(&Locale::Jp).unwrap();
        assert_eq!(json, "\"jp\"");

        let parsed: Locale = serde_json::from_str("\"uk\"").unwrap();
        assert_eq!(parsed, Locale::Uk);

        let parsed: Locale = serde_json::from_str("\"atlantis\"").unwrap();
        assert_eq!(parsed, Locale::Us);
    }
}
