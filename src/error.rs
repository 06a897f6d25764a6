#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx answer outside the 4xx range.
    #[error("{operation} failed with status {status}: {detail}")]
    Status {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    /// The backend rejected the request payload or credentials (4xx).
    #[error("{operation} rejected with status {status}: {detail}")]
    Validation {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Maps a non-2xx HTTP status to the matching variant.
    pub(crate) fn from_status(operation: &'static str, status: u16, detail: String) -> Self {
        match status {
            400..=499 => Self::Validation {
                operation,
                status,
                detail,
            },
            _ => Self::Status {
                operation,
                status,
                detail,
            },
        }
    }

    /// A `401` from check-status means the stored token is no longer valid.
    pub(crate) fn for_check_status(self) -> Self {
        match self {
            Self::Validation { status: 401, .. } => Self::NotAuthenticated,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_validation_failures() {
        let err = Error::from_status("login", 401, "Unauthorized".into());
        assert!(matches!(err, Error::Validation { status: 401, .. }));
        assert_eq!(err.to_string(), "login rejected with status 401: Unauthorized");
    }

    #[test]
    fn server_errors_keep_status() {
        let err = Error::from_status("product listing", 503, String::new());
        assert!(matches!(
            err,
            Error::Status {
                operation: "product listing",
                status: 503,
                ..
            }
        ));
    }

    #[test]
    fn rejected_token_is_not_authenticated() {
        let err = Error::from_status("check status", 401, "Unauthorized".into());
        assert!(matches!(err.for_check_status(), Error::NotAuthenticated));
    }

    #[test]
    fn other_check_status_failures_pass_through() {
        let forbidden = Error::from_status("check status", 403, "Forbidden".into());
        assert!(matches!(
            forbidden.for_check_status(),
            Error::Validation { status: 403, .. }
        ));

        let down = Error::from_status("check status", 500, String::new());
        assert!(matches!(
            down.for_check_status(),
            Error::Status { status: 500, .. }
        ));
    }
}
