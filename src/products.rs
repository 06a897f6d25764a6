use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{ProductId, UserIdentity};

/// Draft id that makes a save create a new product instead of updating one.
pub const NEW_PRODUCT_ID: &str = "new";

/// Product as listed by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub gender: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl Product {
    /// Rewrite bare image file names into URLs under `files_url`.
    pub(crate) fn with_image_urls(mut self, files_url: &Url) -> Self {
        self.images = self
            .images
            .into_iter()
            .map(|image| image_url(files_url, image))
            .collect();
        self
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProductsPage {
    /// Total number of products matching the filters.
    pub count: u64,
    /// Total number of pages for the requested page size.
    pub pages: u32,
    pub products: Vec<Product>,
}

impl ProductsPage {
    #[must_use]
    pub fn new(count: u64, pages: u32, products: Vec<Product>) -> Self {
        Self {
            count,
            pages,
            products,
        }
    }

    pub(crate) fn with_image_urls(mut self, files_url: &Url) -> Self {
        self.products = self
            .products
            .into_iter()
            .map(|product| product.with_image_urls(files_url))
            .collect();
        self
    }
}

/// Editable product fields sent by the admin form.
///
/// An `id` of `None` or [`NEW_PRODUCT_ID`] creates a product; any other id
/// updates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProductDraft {
    #[serde(skip)]
    pub id: Option<ProductId>,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub slug: String,
    pub stock: u32,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

impl ProductDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, sizes: Vec<String>) -> Self {
        self.sizes = sizes;
        self
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// Id of the product this draft updates, or `None` when it creates one.
    #[must_use]
    pub fn existing_id(&self) -> Option<&ProductId> {
        self.id.as_ref().filter(|id| id.0 != NEW_PRODUCT_ID)
    }
}

/// Full URL for a product image. Values that already look like URLs are
/// kept as they are.
#[must_use]
pub fn image_url(files_url: &Url, image: String) -> String {
    if image.contains("http") {
        return image;
    }
    format!("{}/{}", files_url.as_str().trim_end_matches('/'), image)
}
