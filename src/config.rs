//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::amazon::credentials::Credential;
use crate::amazon::locales::Locale;
use crate::amazon::signer::DEFAULT_VERSION;
use crate::transform::Transformer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Marketplace locale; unknown codes fall back to `us`
    #[serde(default)]
    pub locale: Locale,

    /// Access credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Protocol version sent with every request
    #[serde(default = "default_version")]
    pub version: String,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Return request failures as errors instead of recording them
    #[serde(default)]
    pub strict: bool,

    /// Known search indices; empty means the built-in list
    #[serde(default)]
    pub search_indices: Vec<String>,
}

/// Raw credential fields as read from file or environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub associate_tag: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::Us,
            credentials: CredentialsConfig::default(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            version: default_version(),
            format: OutputFormat::Table,
            strict: false,
            search_indices: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("amz-paapi").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("AWS_API_KEY") {
            self.credentials.access_key_id = key;
        }

        if let Ok(secret) = std::env::var("AWS_API_SECRET_KEY") {
            self.credentials.secret_key = secret;
        }

        if let Ok(tag) = std::env::var("AWS_ASSOCIATE_TAG") {
            self.credentials.associate_tag = tag;
        }

        if let Ok(locale) = std::env::var("AMZ_LOCALE") {
            self.locale = Locale::lookup(&locale);
        }

        if let Ok(proxy) = std::env::var("AMZ_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("AMZ_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }

    /// Validates the credential fields.
    pub fn credential(&self) -> crate::error::Result<Credential> {
        let c = &self.credentials;
        Credential::new(c.access_key_id.as_str(), c.secret_key.as_str(), c.associate_tag.as_str())
    }

    /// Returns the transformer matching the output format and strictness.
    pub fn transformer(&self) -> Transformer {
        match self.format {
            OutputFormat::Xml => Transformer::Xml,
            OutputFormat::Document => Transformer::Json,
            OutputFormat::Table | OutputFormat::Json | OutputFormat::Markdown | OutputFormat::Csv => {
                if self.strict {
                    Transformer::StrictItems
                } else {
                    Transformer::Items
                }
            }
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
    /// The response re-serialized as XML
    Xml,
    /// JSON mirror of the whole response document
    Document,
}

impl OutputFormat {
    /// Returns true for formats rendered from normalized items.
    pub fn is_item_format(&self) -> bool {
        matches!(self, OutputFormat::Table | OutputFormat::Json | OutputFormat::Markdown | OutputFormat::Csv)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            "document" | "doc" => Ok(OutputFormat::Document),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv, xml, document", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Document => write!(f, "document"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn with_credentials(key: &str, secret: &str, tag: &str) -> Config {
        Config {
            credentials: CredentialsConfig {
                access_key_id: key.to_string(),
                secret_key: secret.to_string(),
                associate_tag: tag.to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.locale, Locale::Us);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.version, "2011-08-01");
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
        assert!(!config.strict);
        assert!(config.search_indices.is_empty());
        assert!(config.credentials.access_key_id.is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert_eq!("document".parse::<OutputFormat>().unwrap(), OutputFormat::Document);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, markdown, csv, xml, document"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Xml.to_string(), "xml");
        assert_eq!(OutputFormat::Document.to_string(), "document");
    }

    #[test]
    fn test_output_format_serde() {
        let json = serde_json::to_string(&OutputFormat::Document).unwrap();
        assert_eq!(json, "\"document\"");

        let parsed: OutputFormat = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(parsed, OutputFormat::Markdown);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            locale = "de"
            proxy = "socks5://localhost:1080"
            timeout_secs = 10
            version = "2013-08-01"
            format = "xml"
            strict = true
            search_indices = ["Books", "Music"]

            [credentials]
            access_key_id = "AKID"
            secret_key = "secret"
            associate_tag = "tag-21"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.locale, Locale::De);
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.version, "2013-08-01");
        assert_eq!(config.format, OutputFormat::Xml);
        assert!(config.strict);
        assert_eq!(config.search_indices, vec!["Books", "Music"]);
        assert_eq!(config.credentials.access_key_id, "AKID");
        assert_eq!(config.credentials.associate_tag, "tag-21");
    }

    #[test]
    fn test_config_unknown_locale_falls_back() {
        let config: Config = toml::from_str("locale = \"atlantis\"").unwrap();
        assert_eq!(config.locale, Locale::Us);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            locale = "fr"
            timeout_secs = 5
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.locale, Locale::Fr);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.version, "2011-08-01");
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "locale = \"jp\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.locale, Locale::Jp);
    }

    #[test]
    fn test_config_with_env() {
        let vars = ["AWS_API_KEY", "AWS_API_SECRET_KEY", "AWS_ASSOCIATE_TAG", "AMZ_LOCALE", "AMZ_PROXY", "AMZ_TIMEOUT"];
        let saved: Vec<Option<String>> = vars.iter().map(|v| std::env::var(v).ok()).collect();

        std::env::set_var("AWS_API_KEY", "env-key");
        std::env::set_var("AWS_API_SECRET_KEY", "env-secret");
        std::env::set_var("AWS_ASSOCIATE_TAG", "env-tag");
        std::env::set_var("AMZ_LOCALE", "uk");
        std::env::set_var("AMZ_PROXY", "http://proxy:8080");
        std::env::set_var("AMZ_TIMEOUT", "not_a_number");

        let config = with_credentials("file-key", "file-secret", "file-tag").with_env();
        assert_eq!(config.credentials.access_key_id, "env-key");
        assert_eq!(config.credentials.secret_key, "env-secret");
        assert_eq!(config.credentials.associate_tag, "env-tag");
        assert_eq!(config.locale, Locale::Uk);
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        // Invalid values are ignored
        assert_eq!(config.timeout_secs, 30);

        std::env::set_var("AMZ_LOCALE", "invalid_locale");
        std::env::set_var("AMZ_TIMEOUT", "12");
        let config = Config::new().with_env();
        assert_eq!(config.locale, Locale::Us);
        assert_eq!(config.timeout_secs, 12);

        for (var, value) in vars.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(var, v),
                None => std::env::remove_var(var),
            }
        }
    }

    #[test]
    fn test_credential_validation_order() {
        let err = with_credentials("", "", "").credential().unwrap_err();
        assert_eq!(err.to_string(), "Amazon key ID should be defined");

        let err = with_credentials("k", "", "").credential().unwrap_err();
        assert_eq!(err.to_string(), "Amazon secret key should be defined");

        let err = with_credentials("k", "s", "").credential().unwrap_err();
        assert_eq!(err.to_string(), "Amazon associate tag should be defined");

        let cred = with_credentials("k", "s", "t").credential().unwrap();
        assert_eq!(cred.associate_tag(), "t");
    }

    #[test]
    fn test_transformer_selection() {
        let mut config = Config::default();
        assert_eq!(config.transformer(), Transformer::Items);

        config.strict = true;
        assert_eq!(config.transformer(), Transformer::StrictItems);

        config.format = OutputFormat::Xml;
        assert_eq!(config.transformer(), Transformer::Xml);

        config.format = OutputFormat::Document;
        assert_eq!(config.transformer(), Transformer::Json);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            locale: Locale::Uk,
            proxy: Some("socks5://localhost:1080".to_string()),
            format: OutputFormat::Csv,
            strict: true,
            ..with_credentials("k", "s", "t")
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.locale, config.locale);
        assert_eq!(parsed.proxy, config.proxy);
        assert_eq!(parsed.format, config.format);
        assert_eq!(parsed.strict, config.strict);
        assert_eq!(parsed.credentials.secret_key, "s");
    }
}
