use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Authentication errors for the middleware layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session found.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Session cookie present but the session is gone.
    #[error("Session expired")]
    SessionExpired,

    /// Finish called without a pending handshake for this browser.
    #[error("No pending login session")]
    NoPendingSession,

    /// Identifier or provider failure not turned into a login redirect.
    #[error("Federated login failed: {0}")]
    Federation(String),

    /// Session or handshake store operation failed.
    #[error("Session store error: {0}")]
    Store(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host account resolver failed or the handshake was misused.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated | Self::SessionExpired => {
                (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
            }
            Self::NoPendingSession => (StatusCode::BAD_REQUEST, "no session").into_response(),
            Self::Federation(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::Store(_) | Self::Config(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<Error> for AuthError {
    fn from(e: Error) -> Self {
        match e {
            Error::NoPendingSession => Self::NoPendingSession,
            Error::PreconditionViolation(_) => Self::Unauthenticated,
            Error::InvalidIdentifier(_) | Error::Provider(_) => Self::Federation(e.to_string()),
            Error::Store(msg) => Self::Store(msg),
            Error::Config(msg) => Self::Config(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
