//! Plug-and-play federated login routes for Axum.
//!
//! Mounts the begin / finish endpoints of a [`FederatedLogin`](crate::FederatedLogin)
//! under one URL namespace, keeps the transport session key in an encrypted
//! cookie, and turns each [`Outcome`](crate::Outcome) into a redirect.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use federated_login::middleware::{AuthConfig, auth_routes};
//! use federated_login::{FederatedLogin, MemoryHandshakeStore, OpenIdConfig, OpenIdProvider};
//!
//! // 1. Implement AccountResolver and SessionStore for your app
//! // 2. Configure from environment
//! let config = AuthConfig::from_env()?;
//! let login = FederatedLogin::new(
//!     base_url,
//!     OpenIdProvider::new(OpenIdConfig::from_env()?),
//!     account_resolver,
//!     MemoryHandshakeStore::new().with_ttl(config.handshake_ttl()),
//! );
//!
//! // 3. Mount auth routes
//! let app = axum::Router::new().merge(auth_routes(config, login, session_store));
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;
mod traits;
mod types;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractor::{AuthUser, resolve_session};
pub use routes::auth_routes;
pub use traits::SessionStore;
pub use types::NewSession;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
