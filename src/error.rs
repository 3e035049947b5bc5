use crate::handshake::HandshakeState;

/// Error type returned by host-implemented traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handshake coordination errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The user-supplied identifier is malformed or unsupported. No handshake is stored.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The identity provider client failed. The handshake is discarded.
    #[error("Identity provider error: {0}")]
    Provider(#[source] ProviderError),

    /// Finish was called without a matching pending handshake.
    #[error("No pending login session")]
    NoPendingSession,

    /// Associate entry invoked without an authenticated caller.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(&'static str),

    /// Host account resolution or linking failed.
    #[error("Account resolver error: {0}")]
    Account(String),

    /// Handshake store operation failed.
    #[error("Handshake store error: {0}")]
    Store(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid handshake transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: HandshakeState,
        to: HandshakeState,
    },
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::InvalidIdentifier(msg) => Self::InvalidIdentifier(msg),
            other => Self::Provider(other),
        }
    }
}

/// Failures reported by an [`IdentityProvider`](crate::IdentityProvider).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[cfg(feature = "openid")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but refused the assertion.
    #[error("{operation} rejected: {detail}")]
    Rejected {
        operation: &'static str,
        detail: String,
    },

    /// The user cancelled at the provider.
    #[error("authentication cancelled by user")]
    Cancelled,

    /// The callback is missing required fields or carries inconsistent values.
    #[error("malformed response: {0}")]
    Malformed(String),
}
