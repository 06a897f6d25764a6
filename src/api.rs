use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::CatalogQuery;
use crate::error::Error;
use crate::fetch::ProductSource;
use crate::products::{Product, ProductDraft, ProductsPage};
use crate::session::CredentialActions;
use crate::types::{AuthResult, BearerToken};

/// Storefront backend endpoints.
///
/// The base URL is the only required field. Endpoint paths are resolved
/// against it and can be overridden individually.
///
/// ```rust,ignore
/// use storefront_client::ApiConfig;
///
/// let config = ApiConfig::new("https://shop.example.com/api".parse()?)?
///     .with_products_url("https://catalog.example.com/products".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
    pub(crate) login_url: Url,
    pub(crate) register_url: Url,
    pub(crate) check_status_url: Url,
    pub(crate) products_url: Url,
    pub(crate) files_url: Url,
}

impl ApiConfig {
    /// Resolve the default endpoints under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` cannot be a base (e.g. `mailto:`).
    pub fn new(mut base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url} cannot be used as API base URL")));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let endpoint = |path: &str| {
            base_url
                .join(path)
                .map_err(|e| Error::Config(format!("{path}: {e}")))
        };

        Ok(Self {
            login_url: endpoint("auth/login")?,
            register_url: endpoint("auth/register")?,
            check_status_url: endpoint("auth/check-status")?,
            products_url: endpoint("products")?,
            files_url: endpoint("files/product")?,
            base_url,
        })
    }

    #[must_use]
    pub fn with_login_url(mut self, url: Url) -> Self {
        self.login_url = url;
        self
    }

    #[must_use]
    pub fn with_register_url(mut self, url: Url) -> Self {
        self.register_url = url;
        self
    }

    #[must_use]
    pub fn with_check_status_url(mut self, url: Url) -> Self {
        self.check_status_url = url;
        self
    }

    #[must_use]
    pub fn with_products_url(mut self, url: Url) -> Self {
        self.products_url = url;
        self
    }

    /// Override where bare product image names are served from.
    #[must_use]
    pub fn with_files_url(mut self, url: Url) -> Self {
        self.files_url = url;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    #[must_use]
    pub fn register_url(&self) -> &Url {
        &self.register_url
    }

    #[must_use]
    pub fn check_status_url(&self) -> &Url {
        &self.check_status_url
    }

    #[must_use]
    pub fn products_url(&self) -> &Url {
        &self.products_url
    }

    #[must_use]
    pub fn files_url(&self) -> &Url {
        &self.files_url
    }

    /// Listing URL carrying every field of `query`.
    #[must_use]
    pub fn listing_url(&self, query: &CatalogQuery) -> Url {
        let mut url = self.products_url.clone();
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        url
    }

    /// `POST` target for a new product, `PATCH` target for an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the products URL cannot take a path segment.
    pub fn product_url(&self, draft: &ProductDraft) -> Result<Url, Error> {
        let mut url = self.products_url.clone();
        if let Some(id) = draft.existing_id() {
            url.path_segments_mut()
                .map_err(|()| Error::Config(format!("{} cannot be a base", self.products_url)))?
                .pop_if_empty()
                .push(&id.0);
        }
        Ok(url)
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
}

/// HTTP client for the storefront backend.
///
/// Stateless: the bearer token is passed in by the caller, never read from
/// storage.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (timeouts, connection pool reuse, testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure, or
    /// [`Error::Validation`] when the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, Error> {
        let request = self
            .http
            .post(self.config.login_url.clone())
            .json(&LoginBody { email, password });
        Self::send_json(request, "login").await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure, or
    /// [`Error::Validation`] when the backend rejects the account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResult, Error> {
        let request = self.http.post(self.config.register_url.clone()).json(&RegisterBody {
            email,
            password,
            full_name,
        });
        Self::send_json(request, "register").await
    }

    /// `GET /auth/check-status` with the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when the token is rejected with
    /// `401`, [`Error::Transport`] on network failure.
    pub async fn check_status(&self, token: &BearerToken) -> Result<AuthResult, Error> {
        let request = self
            .http
            .get(self.config.check_status_url.clone())
            .bearer_auth(token.as_str());
        Self::send_json(request, "check status")
            .await
            .map_err(Error::for_check_status)
    }

    /// `GET /products` for one listing page. Image names are expanded to URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure, or a status error for
    /// non-2xx answers.
    pub async fn get_products(&self, query: &CatalogQuery) -> Result<ProductsPage, Error> {
        let request = self.http.get(self.config.listing_url(query));
        let page: ProductsPage = Self::send_json(request, "product listing").await?;
        Ok(page.with_image_urls(&self.config.files_url))
    }

    /// Create (`POST /products`) or update (`PATCH /products/{id}`) a product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the draft or the token is rejected,
    /// [`Error::Transport`] on network failure.
    pub async fn save_product(
        &self,
        token: &BearerToken,
        draft: &ProductDraft,
    ) -> Result<Product, Error> {
        let url = self.config.product_url(draft)?;
        let request = match draft.existing_id() {
            Some(_) => self.http.patch(url),
            None => self.http.post(url),
        }
        .bearer_auth(token.as_str())
        .json(draft);

        let product: Product = Self::send_json(request, "save product").await?;
        tracing::info!(product_id = %product.id, "Product saved");
        Ok(product.with_image_urls(&self.config.files_url))
    }

    async fn send_json<R: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<R, Error> {
        let response = Self::ensure_success(request.send().await?, operation).await?;
        response.json::<R>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::from_status(operation, status, detail))
    }
}

impl CredentialActions for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResult, Error> {
        ApiClient::login(self, email, password).await
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResult, Error> {
        ApiClient::register(self, email, password, full_name).await
    }

    async fn check_status(&self, token: &BearerToken) -> Result<AuthResult, Error> {
        ApiClient::check_status(self, token).await
    }
}

impl ProductSource for ApiClient {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<ProductsPage, Error> {
        self.get_products(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogParams;
    use crate::types::ProductId;

    fn test_config() -> ApiConfig {
        ApiConfig::new("https://shop.example.com/api".parse().unwrap()).unwrap()
    }

    #[test]
    fn test_default_endpoints_under_base_path() {
        let config = test_config();

        assert_eq!(config.base_url().as_str(), "https://shop.example.com/api/");
        assert_eq!(config.login_url().as_str(), "https://shop.example.com/api/auth/login");
        assert_eq!(
            config.register_url().as_str(),
            "https://shop.example.com/api/auth/register"
        );
        assert_eq!(
            config.check_status_url().as_str(),
            "https://shop.example.com/api/auth/check-status"
        );
        assert_eq!(config.products_url().as_str(), "https://shop.example.com/api/products");
        assert_eq!(
            config.files_url().as_str(),
            "https://shop.example.com/api/files/product"
        );
    }

    #[test]
    fn test_trailing_slash_base_is_kept() {
        let config = ApiConfig::new("http://localhost:3000/api/".parse().unwrap()).unwrap();
        assert_eq!(config.login_url().as_str(), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn test_non_base_url_is_rejected() {
        let err = ApiConfig::new("mailto:shop@example.com".parse().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = test_config()
            .with_products_url("https://catalog.example.com/v2/products".parse().unwrap());
        assert_eq!(
            config.products_url().as_str(),
            "https://catalog.example.com/v2/products"
        );
        assert_eq!(config.login_url().as_str(), "https://shop.example.com/api/auth/login");
    }

    #[test]
    fn test_listing_url_carries_query() {
        let query = CatalogParams::new()
            .with_page("2")
            .with_price("50-100")
            .with_sizes("M")
            .with_gender("women")
            .build();

        assert_eq!(
            test_config().listing_url(&query).as_str(),
            "https://shop.example.com/api/products?limit=9&offset=9&sizes=M&gender=women&minPrice=50&maxPrice=100"
        );
    }

    #[test]
    fn test_product_url_for_create_and_update() {
        let config = test_config();
        let create = ProductDraft::new("Cap", "cap");
        let update = ProductDraft::new("Cap", "cap").with_id(ProductId::from("p 1".to_string()));

        assert_eq!(
            config.product_url(&create).unwrap().as_str(),
            "https://shop.example.com/api/products"
        );
        assert_eq!(
            config.product_url(&update).unwrap().as_str(),
            "https://shop.example.com/api/products/p%201"
        );
    }

    #[test]
    fn test_register_body_uses_camel_case() {
        let body = serde_json::to_value(RegisterBody {
            email: "a@b.com",
            password: "pw",
            full_name: "A B",
        })
        .unwrap();
        assert_eq!(body["fullName"], "A B");
    }
}
