use std::future::Future;

use super::extractor::AuthUser;
use super::types::NewSession;
use crate::error::BoxError;
use crate::types::SessionId;

/// Consumer-provided login session persistence.
///
/// Sessions are identified by opaque [`SessionId`]s.
/// The consumer chooses the ID format (ULID, UUID, etc.).
///
/// # Example
///
/// ```rust,ignore
/// impl SessionStore for MyAppState {
///     async fn create(&self, session: NewSession) -> Result<SessionId, BoxError> {
///         let id = SessionId(Ulid::new().to_string());
///         self.db.insert_session(&id, &session).await?;
///         Ok(id)
///     }
///
///     async fn find(&self, session_id: &SessionId) -> Result<Option<AuthUser>, BoxError> {
///         self.db.find_session(session_id).await
///     }
///
///     async fn delete(&self, session_id: &SessionId) -> Result<(), BoxError> {
///         self.db.delete_session(session_id).await
///     }
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Create a new session. Returns the session ID.
    fn create(
        &self,
        session: NewSession,
    ) -> impl Future<Output = Result<SessionId, BoxError>> + Send;

    /// Look up a session by ID. Returns `AuthUser` if session is valid.
    fn find(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Option<AuthUser>, BoxError>> + Send;

    /// Delete a session (logout).
    fn delete(&self, session_id: &SessionId) -> impl Future<Output = Result<(), BoxError>> + Send;
}
