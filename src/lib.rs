#![doc = include_str!("../README.md")]

#[cfg(feature = "http")]
pub mod api;
pub mod catalog;
#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
mod context;
pub mod error;
pub mod fetch;
pub mod pagination;
pub mod products;
pub mod session;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "http")]
pub use api::{ApiClient, ApiConfig};
pub use catalog::{CatalogParams, CatalogQuery, PriceBracket, resolve_bracket};
#[cfg(feature = "http")]
pub use config::StorefrontConfig;
#[cfg(feature = "http")]
pub use context::Storefront;
pub use error::Error;
pub use fetch::{CacheKey, ProductCatalog, ProductSource};
pub use pagination::PageControl;
pub use products::{Product, ProductDraft, ProductsPage};
pub use session::{AuthStatus, CredentialActions, Session, SessionStore, TokenStore};
pub use types::{AuthResult, BearerToken, ProductId, UserId, UserIdentity};
