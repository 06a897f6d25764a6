//! Catalog filter normalization.
//!
//! Raw navigation state (query-string values and the route `gender` segment)
//! is converted into a [`CatalogQuery`] here and nowhere else. Building never
//! fails: every malformed input has a default.

use serde::{Deserialize, Serialize};

/// Page used when the raw value is missing or not a positive integer.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the raw value is missing or not a positive integer.
pub const DEFAULT_LIMIT: u32 = 9;

/// Price filter offered by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceBracket {
    #[default]
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "0-50")]
    UpTo50,
    #[serde(rename = "50-100")]
    From50To100,
    #[serde(rename = "100-200")]
    From100To200,
    #[serde(rename = "200+")]
    Over200,
}

impl PriceBracket {
    pub const ALL: [Self; 5] = [
        Self::Any,
        Self::UpTo50,
        Self::From50To100,
        Self::From100To200,
        Self::Over200,
    ];

    /// Resolve a navigation key. Unknown keys mean no price filter.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|bracket| bracket.key() == key)
            .unwrap_or(Self::Any)
    }

    /// Key used in the `price` query-string parameter.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::UpTo50 => "0-50",
            Self::From50To100 => "50-100",
            Self::From100To200 => "100-200",
            Self::Over200 => "200+",
        }
    }

    /// `(min_price, max_price)`; `None` means unbounded.
    #[must_use]
    pub fn bounds(self) -> (Option<u32>, Option<u32>) {
        match self {
            Self::Any => (None, None),
            Self::UpTo50 => (Some(0), Some(50)),
            Self::From50To100 => (Some(50), Some(100)),
            Self::From100To200 => (Some(100), Some(200)),
            Self::Over200 => (Some(200), None),
        }
    }
}

impl std::fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolves a raw price key straight to its `(min_price, max_price)` bounds.
#[must_use]
pub fn resolve_bracket(key: &str) -> (Option<u32>, Option<u32>) {
    PriceBracket::from_key(key).bounds()
}

/// Raw catalog filter inputs, exactly as read from navigation state.
///
/// ```rust,ignore
/// let query = CatalogParams::from_query_string("page=2&price=50-100&sizes=M", Some("men"))
///     .build();
/// assert_eq!(query.offset(), 9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub price: Option<String>,
    pub sizes: Option<String>,
    pub query: Option<String>,
    /// Route segment, not part of the query string.
    pub gender: Option<String>,
}

impl CatalogParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `page`, `limit`, `price`, `sizes` and `query` from a URL query
    /// string (leading `?` optional). The first occurrence of a key wins.
    #[must_use]
    pub fn from_query_string(query_string: &str, gender: Option<&str>) -> Self {
        let mut params = Self {
            gender: gender.map(str::to_owned),
            ..Self::default()
        };

        let raw = query_string.strip_prefix('?').unwrap_or(query_string);
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "price" => &mut params.price,
                "sizes" => &mut params.sizes,
                "query" => &mut params.query,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Normalize into a [`CatalogQuery`].
    ///
    /// - `page`/`limit` that are not positive integers, or are too large for
    ///   `u32`, fall back to [`DEFAULT_PAGE`]/[`DEFAULT_LIMIT`].
    /// - `offset = (page - 1) * limit`, or `0` if that does not fit in `u32`.
    /// - unknown price keys mean no price filter.
    /// - `sizes`, `gender` and `query` are kept verbatim; an empty string is
    ///   a filter value, not "absent".
    #[must_use]
    pub fn build(&self) -> CatalogQuery {
        let page = parse_positive(self.page.as_deref(), DEFAULT_PAGE);
        let limit = parse_positive(self.limit.as_deref(), DEFAULT_LIMIT);
        let offset = (page - 1).checked_mul(limit).unwrap_or(0);

        CatalogQuery {
            limit,
            offset,
            price: self
                .price
                .as_deref()
                .map_or(PriceBracket::Any, PriceBracket::from_key),
            sizes: self.sizes.clone(),
            gender: self.gender.clone(),
            query: self.query.clone(),
        }
    }
}

fn parse_positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Normalized product-listing query.
///
/// Only [`CatalogParams::build`] constructs it, so `limit >= 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    limit: u32,
    offset: u32,
    price: PriceBracket,
    sizes: Option<String>,
    gender: Option<String>,
    query: Option<String>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        CatalogParams::default().build()
    }
}

impl CatalogQuery {
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// One-based page this query points at.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.offset / self.limit + 1
    }

    #[must_use]
    pub fn price_bracket(&self) -> PriceBracket {
        self.price
    }

    #[must_use]
    pub fn min_price(&self) -> Option<u32> {
        self.price.bounds().0
    }

    #[must_use]
    pub fn max_price(&self) -> Option<u32> {
        self.price.bounds().1
    }

    #[must_use]
    pub fn sizes(&self) -> Option<&str> {
        self.sizes.as_deref()
    }

    #[must_use]
    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Request parameters in a fixed order. Absent filters are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(sizes) = &self.sizes {
            pairs.push(("sizes", sizes.clone()));
        }
        if let Some(gender) = &self.gender {
            pairs.push(("gender", gender.clone()));
        }
        if let Some(min) = self.min_price() {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price() {
            pairs.push(("maxPrice", max.to_string()));
        }
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        pairs
    }

    /// URL-encoded form of [`query_pairs`](Self::query_pairs).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Raw parameters that build back into this query.
    #[must_use]
    pub fn to_params(&self) -> CatalogParams {
        CatalogParams {
            page: Some(self.page().to_string()),
            limit: Some(self.limit.to_string()),
            price: Some(self.price.key().to_string()),
            sizes: self.sizes.clone(),
            query: self.query.clone(),
            gender: self.gender.clone(),
        }
    }
}
