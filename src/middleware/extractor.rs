use axum_extra::extract::PrivateCookieJar;

use super::error::AuthError;
use super::traits::SessionStore;
use crate::types::{ExternalId, SessionId, UserId};

/// Authenticated user resolved from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Session ID (from cookie).
    pub session_id: SessionId,
    /// App-specific user ID (from `SessionStore::find`).
    pub user_id: UserId,
    /// External identifier the session was signed in with.
    pub identifier: ExternalId,
}

/// Look up the signed-in user for this request.
///
/// # Example
///
/// ```rust,ignore
/// let auth = resolve_session(&session_store, &jar, "__federated_session").await?;
/// ```
///
/// # Errors
///
/// [`AuthError::Unauthenticated`] without a session cookie,
/// [`AuthError::SessionExpired`] if the store no longer knows the session,
/// [`AuthError::Store`] if the lookup fails.
pub async fn resolve_session<S: SessionStore>(
    store: &S,
    jar: &PrivateCookieJar,
    cookie_name: &str,
) -> Result<AuthUser, AuthError> {
    let session_id = jar
        .get(cookie_name)
        .map(|c| SessionId(c.value().to_string()))
        .ok_or(AuthError::Unauthenticated)?;

    store
        .find(&session_id)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
        .ok_or(AuthError::SessionExpired)
}
