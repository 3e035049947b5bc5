use crate::identity::VerifiedIdentity;
use crate::types::UserId;

/// Session data from a successful federated sign-in.
///
/// Passed to [`SessionStore::create`](super::SessionStore::create) for the consumer to persist.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// User ID returned by [`AccountResolver::resolve`](crate::AccountResolver::resolve).
    pub user_id: UserId,
    /// Identity the provider vouched for (transient, for display and logging).
    pub identity: VerifiedIdentity,
    /// Client `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}
