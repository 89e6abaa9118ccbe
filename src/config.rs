use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of cards per feed page when the client does not ask for a limit
    #[serde(default = "default_feed_page_size")]
    pub feed_page_size: usize,

    /// Language preference seeded into a new session's profile
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Path to a JSON catalog; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Whether feed cards are sent to the explanation service
    #[serde(default)]
    pub enrichment_enabled: bool,

    /// Base URL of the explanation service
    #[serde(default)]
    pub enrichment_url: Option<String>,

    /// Timeout for one enrichment call, in milliseconds
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_feed_page_size() -> usize {
    8
}

fn default_language() -> String {
    "en".to_string()
}

fn default_enrichment_timeout_ms() -> u64 {
    7000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            feed_page_size: default_feed_page_size(),
            default_language: default_language(),
            catalog_path: None,
            enrichment_enabled: false,
            enrichment_url: None,
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Base URL of the explanation service, if enrichment is enabled and configured
    pub fn enrichment_endpoint(&self) -> Option<String> {
        if !self.enrichment_enabled {
            return None;
        }

        let trimmed = self.enrichment_url.as_deref()?.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(trimmed.trim_end_matches('/').to_string())
    }

    /// Enrichment timeout; zero falls back to the default
    pub fn enrichment_timeout(&self) -> Duration {
        let millis = if self.enrichment_timeout_ms == 0 {
            default_enrichment_timeout_ms()
        } else {
            self.enrichment_timeout_ms
        };
        Duration::from_millis(millis)
    }

    /// Default page size, never zero
    pub fn page_size(&self) -> usize {
        self.feed_page_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 8787);
        assert_eq!(config.feed_page_size, 8);
        assert_eq!(config.default_language, "en");
        assert!(!config.enrichment_enabled);
        assert_eq!(config.enrichment_timeout(), Duration::from_millis(7000));
    }

    #[test]
    fn test_env_overrides() {
        let vars = vec![
            ("PORT".to_string(), "9000".to_string()),
            ("ENRICHMENT_ENABLED".to_string(), "true".to_string()),
            ("ENRICHMENT_URL".to_string(), " http://localhost:8788/ ".to_string()),
            ("ENRICHMENT_TIMEOUT_MS".to_string(), "250".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.enrichment_endpoint(),
            Some("http://localhost:8788".to_string())
        );
        assert_eq!(config.enrichment_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_enrichment_endpoint_requires_flag() {
        let config = Config {
            enrichment_url: Some("http://localhost:8788".to_string()),
            ..Config::default()
        };
        assert_eq!(config.enrichment_endpoint(), None);
    }

    #[test]
    fn test_blank_enrichment_url_is_unset() {
        let config = Config {
            enrichment_enabled: true,
            enrichment_url: Some("   ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.enrichment_endpoint(), None);
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = Config {
            enrichment_timeout_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.enrichment_timeout(), Duration::from_millis(7000));
    }
}
