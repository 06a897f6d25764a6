//! Client authentication session.
//!
//! [`SessionStore`] owns the in-memory [`Session`] and the persisted token.
//! Backend calls go through a [`CredentialActions`] implementation
//! (`ApiClient` with the `http` feature) and the token lives in a
//! [`TokenStore`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_client::session::{FileTokenStore, SessionStore, DEFAULT_TOKEN_KEY};
//!
//! let tokens = Arc::new(FileTokenStore::new(".storefront", DEFAULT_TOKEN_KEY));
//! let session = SessionStore::new(Arc::new(api_client), tokens);
//!
//! // At startup
//! session.restore().await;
//!
//! if !session.login("a@b.com", "secret").await {
//!     // show the error banner; session is Unauthenticated
//! }
//! ```

mod storage;
mod store;
mod traits;
mod types;

pub use storage::{DEFAULT_TOKEN_KEY, FileTokenStore, MemoryTokenStore};
pub use store::SessionStore;
pub use traits::{CredentialActions, TokenStore};
pub use types::{AuthStatus, Session};
