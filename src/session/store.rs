use std::sync::Arc;

use parking_lot::RwLock;

use super::traits::{CredentialActions, TokenStore};
use super::types::{AuthStatus, Session};
use crate::error::Error;
use crate::types::{AuthResult, BearerToken, UserIdentity};

/// The client's single authentication state holder.
///
/// Login, register and restore report a plain `bool`: every failure is
/// logged, the persisted token is erased and the session becomes
/// [`Session::Unauthenticated`]. Errors never reach the caller.
///
/// Each transition replaces the whole [`Session`] once the awaited backend
/// call has resolved. Backend calls of overlapping operations are not
/// serialized; the last one to finish decides the final state. The token
/// write and the session swap of one transition happen under a commit guard,
/// so the persisted slot always matches the session another commit left.
pub struct SessionStore<A, T> {
    actions: Arc<A>,
    tokens: Arc<T>,
    session: RwLock<Session>,
    commit: tokio::sync::Mutex<()>,
}

impl<A: CredentialActions, T: TokenStore> SessionStore<A, T> {
    /// Create the store in [`Session::Checking`]. Call
    /// [`restore`](Self::restore) at startup to settle it.
    #[must_use]
    pub fn new(actions: Arc<A>, tokens: Arc<T>) -> Self {
        Self {
            actions,
            tokens,
            session: RwLock::new(Session::Checking),
            commit: tokio::sync::Mutex::new(()),
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.session.read().status()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserIdentity> {
        self.session.read().user().cloned()
    }

    #[must_use]
    pub fn token(&self) -> Option<BearerToken> {
        self.session.read().token().cloned()
    }

    /// `true` iff the current user holds the `admin` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.read().is_admin()
    }

    /// Token storage backing this store.
    #[must_use]
    pub fn token_store(&self) -> &T {
        &self.tokens
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        let outcome = self.actions.login(email, password).await;
        self.settle("login", outcome).await
    }

    pub async fn register(&self, email: &str, password: &str, full_name: &str) -> bool {
        let outcome = self.actions.register(email, password, full_name).await;
        self.settle("register", outcome).await
    }

    /// Forget the current user. Always succeeds.
    pub async fn logout(&self) {
        let _commit = self.commit.lock().await;
        self.erase_token().await;
        *self.session.write() = Session::Unauthenticated;
        tracing::info!("Logged out");
    }

    /// Revalidate the persisted token with the backend.
    ///
    /// The session is [`Session::Checking`] until the answer arrives. An
    /// empty slot fails without a network call.
    pub async fn restore(&self) -> bool {
        *self.session.write() = Session::Checking;

        let outcome = match self.tokens.load().await {
            Ok(Some(token)) => self.actions.check_status(&token).await,
            Ok(None) => Err(Error::NotAuthenticated),
            Err(e) => Err(e),
        };
        self.settle("restore", outcome).await
    }

    /// Persist or erase the token and swap the session as one step.
    /// Never called while a backend request is pending.
    async fn settle(&self, operation: &'static str, outcome: Result<AuthResult, Error>) -> bool {
        let _commit = self.commit.lock().await;
        match outcome {
            Ok(result) => {
                if let Err(e) = self.tokens.save(&result.token).await {
                    tracing::warn!(error = %e, operation, "Failed to persist token");
                }
                tracing::info!(user_id = %result.user.id, operation, "Session authenticated");
                *self.session.write() = Session::from(result);
                true
            }
            Err(e) => {
                if matches!(e, Error::NotAuthenticated) {
                    tracing::info!(operation, "No valid persisted session");
                } else {
                    tracing::warn!(error = %e, operation, "Authentication failed");
                }
                self.erase_token().await;
                *self.session.write() = Session::Unauthenticated;
                false
            }
        }
    }

    async fn erase_token(&self) {
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "Failed to erase persisted token");
        }
    }
}
