use crate::types::{AuthResult, BearerToken, UserIdentity};

/// Coarse authentication status, as used to gate the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    Checking,
    Authenticated,
    Unauthenticated,
}

/// Current authentication state of the client.
///
/// A user and a token exist exactly when the session is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// Initial state, and the state while a restore is in flight.
    #[default]
    Checking,
    Authenticated {
        user: UserIdentity,
        token: BearerToken,
    },
    Unauthenticated,
}

impl Session {
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        match self {
            Self::Checking => AuthStatus::Checking,
            Self::Authenticated { .. } => AuthStatus::Authenticated,
            Self::Unauthenticated => AuthStatus::Unauthenticated,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&BearerToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// `true` iff a user is present and holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(UserIdentity::is_admin)
    }
}

impl From<AuthResult> for Session {
    fn from(result: AuthResult) -> Self {
        Self::Authenticated {
            user: result.user,
            token: result.token,
        }
    }
}
