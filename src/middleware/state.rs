use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::AuthSettings;
use super::traits::SessionStore;
use crate::login::FederatedLogin;
use crate::outcome::AccountResolver;
use crate::provider::IdentityProvider;
use crate::store::HandshakeStore;

/// Shared state for auth route handlers.
pub(super) struct AuthState<P, R, H, S> {
    pub(super) login: Arc<FederatedLogin<P, R, H>>,
    pub(super) session_store: Arc<S>,
    pub(super) settings: AuthSettings,
}

// Manual Clone: avoid derive adding `P: Clone, R: Clone, ...` bounds.
impl<P, R, H, S> Clone for AuthState<P, R, H, S> {
    fn clone(&self) -> Self {
        Self {
            login: self.login.clone(),
            session_store: self.session_store.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<P, R, H, S> FromRef<AuthState<P, R, H, S>> for Key
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    fn from_ref(state: &AuthState<P, R, H, S>) -> Self {
        state.settings.cookie_key.clone()
    }
}
