#![doc = include_str!("../README.md")]

pub mod error;
pub mod handshake;
pub mod identity;
pub mod keys;
pub mod login;
#[cfg(feature = "middleware")]
pub mod middleware;
#[cfg(feature = "openid")]
pub mod openid;
pub mod outcome;
pub mod provider;
pub mod store;
#[cfg(test)]
mod testing;
pub mod types;

// Re-exports for convenient access
pub use error::{BoxError, Error, ProviderError};
pub use handshake::{HandshakeSession, HandshakeState};
pub use identity::VerifiedIdentity;
pub use keys::generate_session_key;
pub use login::FederatedLogin;
#[cfg(feature = "openid")]
pub use openid::{OpenIdConfig, OpenIdProvider};
pub use outcome::{AccountResolver, Outcome, OutcomeHandler};
pub use provider::{CallbackParams, IdentityProvider, RedirectInstruction};
pub use store::{DEFAULT_HANDSHAKE_TTL, HandshakeStore, MemoryHandshakeStore};
pub use types::{ExternalId, SessionId, SessionKey, UserId};
