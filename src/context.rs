use std::sync::Arc;

use crate::api::ApiClient;
use crate::catalog::CatalogQuery;
use crate::config::StorefrontConfig;
use crate::error::Error;
use crate::fetch::ProductCatalog;
use crate::products::{Product, ProductDraft, ProductsPage};
use crate::session::{FileTokenStore, SessionStore};

/// Client-wide context: one session and one catalog cache sharing one HTTP
/// client.
///
/// Build it once at startup and hand references to whatever needs it. The
/// session starts in `Checking`; call [`bootstrap`](Self::bootstrap) to
/// settle it from the persisted token.
pub struct Storefront {
    api: Arc<ApiClient>,
    session: SessionStore<ApiClient, FileTokenStore>,
    catalog: ProductCatalog<ApiClient>,
}

impl Storefront {
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, Error> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            http = http.timeout(timeout);
        }
        let api = Arc::new(ApiClient::new(config.api).with_http_client(http.build()?));
        let tokens = Arc::new(FileTokenStore::new(config.token_dir, &config.token_key));

        Ok(Self {
            session: SessionStore::new(api.clone(), tokens),
            catalog: ProductCatalog::new(api.clone()).with_fresh_for(config.catalog_fresh_for),
            api,
        })
    }

    /// [`StorefrontConfig::from_env`] followed by [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for missing or invalid settings.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(StorefrontConfig::from_env()?)
    }

    /// Restore the session from the persisted token. Returns whether the
    /// client ended up authenticated.
    pub async fn bootstrap(&self) -> bool {
        self.session.restore().await
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore<ApiClient, FileTokenStore> {
        &self.session
    }

    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog<ApiClient> {
        &self.catalog
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Listing page for `query`, cached for the configured window.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure unchanged.
    pub async fn products(&self, query: &CatalogQuery) -> Result<Arc<ProductsPage>, Error> {
        self.catalog.fetch(query).await
    }

    /// Create or update a product with the session's token, then drop the
    /// cached listings so the change is visible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] without a network call when there
    /// is no authenticated session; otherwise propagates the backend failure.
    pub async fn save_product(&self, draft: &ProductDraft) -> Result<Product, Error> {
        let token = self.session.token().ok_or(Error::NotAuthenticated)?;
        let product = self.api.save_product(&token, draft).await?;
        self.catalog.invalidate();
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::session::AuthStatus;

    fn test_storefront(dir: &std::path::Path) -> Storefront {
        let api = ApiConfig::new("http://127.0.0.1:9/api".parse().unwrap()).unwrap();
        Storefront::new(StorefrontConfig::new(api).with_token_dir(dir)).unwrap()
    }

    #[tokio::test]
    async fn test_starts_checking() {
        let dir = tempfile::tempdir().unwrap();
        let storefront = test_storefront(dir.path());

        assert_eq!(storefront.session().status(), AuthStatus::Checking);
        assert_eq!(
            storefront.session().token_store().path(),
            dir.path().join("token")
        );
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let storefront = test_storefront(dir.path());

        assert!(!storefront.bootstrap().await);
        assert_eq!(storefront.session().status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_save_product_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let storefront = test_storefront(dir.path());

        let err = storefront
            .save_product(&ProductDraft::new("Cap", "cap"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }
}
