use std::future::Future;

use crate::error::Error;
use crate::types::{AuthResult, BearerToken};

/// Backend calls that produce an authenticated identity.
///
/// Implementations propagate every failure unchanged and never touch
/// durable storage or session state; reacting to failures is the
/// [`SessionStore`](super::SessionStore)'s job.
///
/// # Example
///
/// ```rust,ignore
/// impl CredentialActions for MyBackend {
///     async fn login(&self, email: &str, password: &str) -> Result<AuthResult, Error> {
///         self.http.post_json("/auth/login", &(email, password)).await
///     }
///     // ...
/// }
/// ```
pub trait CredentialActions: Send + Sync + 'static {
    /// Exchange email and password for a user and token.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthResult, Error>> + Send;

    /// Create an account and sign it in.
    fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> impl Future<Output = Result<AuthResult, Error>> + Send;

    /// Revalidate a stored token. The backend may answer with a fresh token.
    fn check_status(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<AuthResult, Error>> + Send;
}

/// Durable single-slot storage for the bearer token.
///
/// An empty slot means the client was never authenticated (or logged out).
/// Writes and erasures are last-write-wins.
pub trait TokenStore: Send + Sync + 'static {
    /// Read the persisted token, if any.
    fn load(&self) -> impl Future<Output = Result<Option<BearerToken>, Error>> + Send;

    /// Replace the persisted token.
    fn save(&self, token: &BearerToken) -> impl Future<Output = Result<(), Error>> + Send;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> impl Future<Output = Result<(), Error>> + Send;
}
