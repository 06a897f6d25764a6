//! Cached product listing.
//!
//! A [`CatalogQuery`] is bound to a [`CacheKey`] and to the fetch call of a
//! [`ProductSource`]. Successful pages are reused for the freshness window;
//! failures go back to the caller untouched and are never cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use derive_more::Display;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::catalog::CatalogQuery;
use crate::error::Error;
use crate::products::ProductsPage;

/// How long a fetched page is served without asking the backend again.
pub const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(5 * 60);

/// Backend product listing (`GET /products`).
pub trait ProductSource: Send + Sync + 'static {
    fn fetch_products(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<ProductsPage, Error>> + Send;
}

/// Deterministic encoding of every field of a [`CatalogQuery`].
///
/// Fields are written in a fixed order, absent filters are left out and an
/// empty filter is written as `key=`, so two keys are equal exactly when the
/// queries are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn for_query(query: &CatalogQuery) -> Self {
        Self(format!("products?{}", query.to_query_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Entry {
    fetched_at: Instant,
    page: Arc<ProductsPage>,
}

/// Product listing with a per-query freshness window.
///
/// Two concurrent misses for the same key both reach the backend; the later
/// answer replaces the earlier one in the cache. A page whose fetch started
/// before [`invalidate`](Self::invalidate) is returned but not cached.
pub struct ProductCatalog<S> {
    source: Arc<S>,
    fresh_for: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
    generation: AtomicU64,
}

impl<S: ProductSource> ProductCatalog<S> {
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            fresh_for: DEFAULT_FRESH_FOR,
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Override the freshness window (default: 5 minutes).
    #[must_use]
    pub fn with_fresh_for(mut self, fresh_for: Duration) -> Self {
        self.fresh_for = fresh_for;
        self
    }

    #[must_use]
    pub fn fresh_for(&self) -> Duration {
        self.fresh_for
    }

    /// Listing page for `query`, from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns whatever the [`ProductSource`] failed with.
    pub async fn fetch(&self, query: &CatalogQuery) -> Result<Arc<ProductsPage>, Error> {
        let key = CacheKey::for_query(query);
        if let Some(page) = self.cached(&key) {
            tracing::debug!(key = %key, "Catalog cache hit");
            return Ok(page);
        }

        tracing::debug!(key = %key, "Catalog cache miss");
        let started = self.generation.load(Ordering::Acquire);
        let page = Arc::new(self.source.fetch_products(query).await?);

        let mut entries = self.entries.lock();
        if self.generation.load(Ordering::Acquire) != started {
            tracing::debug!(key = %key, "Catalog invalidated during fetch, not caching");
            return Ok(page);
        }
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.fresh_for);
        entries.insert(
            key,
            Entry {
                fetched_at: Instant::now(),
                page: page.clone(),
            },
        );
        Ok(page)
    }

    /// Drop every cached page, e.g. after a product was edited.
    pub fn invalidate(&self) {
        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<ProductsPage>> {
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.fresh_for)
            .map(|entry| entry.page.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use super::*;
    use crate::catalog::CatalogParams;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProductSource for CountingSource {
        async fn fetch_products(&self, query: &CatalogQuery) -> Result<ProductsPage, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Status {
                    operation: "product listing",
                    status: 502,
                    detail: "Bad Gateway".into(),
                });
            }
            Ok(ProductsPage::new(u64::from(query.offset()), 1, Vec::new()))
        }
    }

    fn catalog() -> (ProductCatalog<CountingSource>, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::default());
        (ProductCatalog::new(source.clone()), source)
    }

    #[test]
    fn cache_key_covers_every_field() {
        let query = CatalogParams::new()
            .with_page("2")
            .with_price("0-50")
            .with_sizes("S")
            .with_gender("men")
            .with_query("tee")
            .build();

        assert_eq!(
            CacheKey::for_query(&query).as_str(),
            "products?limit=9&offset=9&sizes=S&gender=men&minPrice=0&maxPrice=50&query=tee"
        );
    }

    #[test]
    fn equivalent_inputs_share_a_key() {
        let defaults = CatalogParams::new().build();
        let explicit = CatalogParams::new()
            .with_page("1")
            .with_limit("9")
            .with_price("any")
            .build();
        let garbage = CatalogParams::new().with_page("x").with_price("??").build();

        assert_eq!(CacheKey::for_query(&defaults), CacheKey::for_query(&explicit));
        assert_eq!(CacheKey::for_query(&defaults), CacheKey::for_query(&garbage));
    }

    #[test]
    fn empty_filter_has_its_own_key() {
        let absent = CatalogParams::new().build();
        let empty = CatalogParams::new().with_gender("").build();
        assert_ne!(CacheKey::for_query(&absent), CacheKey::for_query(&empty));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_results_skip_the_backend() {
        let (catalog, source) = catalog();
        let query = CatalogParams::new().with_page("3").build();

        let first = catalog.fetch(&query).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = catalog.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_results_are_refetched() {
        let (catalog, source) = catalog();
        let query = CatalogQuery::default();

        catalog.fetch(&query).await.unwrap();
        tokio::time::advance(DEFAULT_FRESH_FOR).await;
        catalog.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn different_queries_are_cached_separately() {
        let (catalog, source) = catalog();
        let page_one = CatalogParams::new().build();
        let page_two = CatalogParams::new().with_page("2").build();

        assert_eq!(catalog.fetch(&page_one).await.unwrap().count, 0);
        assert_eq!(catalog.fetch(&page_two).await.unwrap().count, 9);
        catalog.fetch(&page_one).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_propagate_and_are_not_cached() {
        let (catalog, source) = catalog();
        let query = CatalogQuery::default();

        source.failing.store(true, Ordering::SeqCst);
        let err = catalog.fetch(&query).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, .. }));

        source.failing.store(false, Ordering::SeqCst);
        catalog.fetch(&query).await.unwrap();
        catalog.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_refetch() {
        let (catalog, source) = catalog();
        let query = CatalogQuery::default();

        catalog.fetch(&query).await.unwrap();
        catalog.invalidate();
        catalog.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    /// Answers with the catalog version current when the request started,
    /// after a delay.
    #[derive(Default)]
    struct SlowVersionedSource {
        version: AtomicU64,
    }

    impl ProductSource for SlowVersionedSource {
        async fn fetch_products(&self, _query: &CatalogQuery) -> Result<ProductsPage, Error> {
            let version = self.version.load(Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(ProductsPage::new(version, 1, Vec::new()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_started_before_invalidate_is_not_cached() {
        let source = Arc::new(SlowVersionedSource::default());
        let catalog = ProductCatalog::new(source.clone());
        let query = CatalogQuery::default();

        let (in_flight, ()) = tokio::join!(catalog.fetch(&query), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            source.version.store(1, Ordering::SeqCst);
            catalog.invalidate();
        });
        assert_eq!(in_flight.unwrap().count, 0);

        assert_eq!(catalog.fetch(&query).await.unwrap().count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_window_applies() {
        let (catalog, source) = catalog();
        let catalog = catalog.with_fresh_for(Duration::from_secs(10));
        let query = CatalogQuery::default();

        catalog.fetch(&query).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        catalog.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(catalog.fresh_for(), Duration::from_secs(10));
    }
}
