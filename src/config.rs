use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::api::ApiConfig;
use crate::error::Error;
use crate::fetch::DEFAULT_FRESH_FOR;
use crate::session::DEFAULT_TOKEN_KEY;

/// Shared settings of a [`Storefront`](crate::Storefront).
///
/// Required field (`api`) is a constructor parameter. Use
/// [`from_env()`](StorefrontConfig::from_env) for convention-based setup,
/// or [`new()`](StorefrontConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub(crate) api: ApiConfig,
    pub(crate) token_dir: PathBuf,
    pub(crate) token_key: String,
    pub(crate) catalog_fresh_for: Duration,
    pub(crate) http_timeout: Option<Duration>,
}

impl StorefrontConfig {
    #[must_use]
    pub fn new(api: ApiConfig) -> Self {
        Self {
            api,
            token_dir: PathBuf::from(".storefront"),
            token_key: DEFAULT_TOKEN_KEY.into(),
            catalog_fresh_for: DEFAULT_FRESH_FOR,
            http_timeout: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `STOREFRONT_API_URL`: backend base URL
    ///
    /// # Optional env vars
    /// - `STOREFRONT_TOKEN_DIR`: directory of the persisted token (default `.storefront`)
    /// - `STOREFRONT_TOKEN_KEY`: storage key of the token (default `token`)
    /// - `STOREFRONT_CATALOG_FRESH_SECS`: catalog freshness window (default 300)
    /// - `STOREFRONT_HTTP_TIMEOUT_SECS`: request timeout (default none)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or any value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let api_url = std::env::var("STOREFRONT_API_URL")
            .map_err(|_| Error::Config("STOREFRONT_API_URL is required".into()))?;
        let api_url: Url = api_url
            .parse()
            .map_err(|e| Error::Config(format!("STOREFRONT_API_URL: {e}")))?;

        let mut config = Self::new(ApiConfig::new(api_url)?);

        if let Ok(dir) = std::env::var("STOREFRONT_TOKEN_DIR") {
            config = config.with_token_dir(dir);
        }
        if let Ok(key) = std::env::var("STOREFRONT_TOKEN_KEY") {
            if key.is_empty() || key.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "STOREFRONT_TOKEN_KEY: {key:?} is not a valid file name"
                )));
            }
            config = config.with_token_key(key);
        }
        if let Ok(secs) = std::env::var("STOREFRONT_CATALOG_FRESH_SECS") {
            config = config.with_catalog_fresh_for(parse_secs("STOREFRONT_CATALOG_FRESH_SECS", &secs)?);
        }
        if let Ok(secs) = std::env::var("STOREFRONT_HTTP_TIMEOUT_SECS") {
            config = config.with_http_timeout(parse_secs("STOREFRONT_HTTP_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    #[must_use]
    pub fn with_catalog_fresh_for(mut self, fresh_for: Duration) -> Self {
        self.catalog_fresh_for = fresh_for;
        self
    }

    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    #[must_use]
    pub fn token_dir(&self) -> &PathBuf {
        &self.token_dir
    }

    #[must_use]
    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    #[must_use]
    pub fn catalog_fresh_for(&self) -> Duration {
        self.catalog_fresh_for
    }

    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration, Error> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::Config(format!("{var}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiConfig {
        ApiConfig::new("http://localhost:3000/api".parse().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::new(api());

        assert_eq!(config.token_dir(), &PathBuf::from(".storefront"));
        assert_eq!(config.token_key(), "token");
        assert_eq!(config.catalog_fresh_for(), Duration::from_secs(300));
        assert_eq!(config.http_timeout(), None);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::new(api())
            .with_token_dir("/var/lib/shop")
            .with_token_key("session")
            .with_catalog_fresh_for(Duration::from_secs(30))
            .with_http_timeout(Duration::from_secs(10));

        assert_eq!(config.token_dir(), &PathBuf::from("/var/lib/shop"));
        assert_eq!(config.token_key(), "session");
        assert_eq!(config.catalog_fresh_for(), Duration::from_secs(30));
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 42 ").unwrap(), Duration::from_secs(42));
        assert!(matches!(parse_secs("X", "soon"), Err(Error::Config(_))));
    }
}
