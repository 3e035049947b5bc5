use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use time::{Duration, OffsetDateTime};

use crate::error::BoxError;
use crate::handshake::HandshakeSession;
use crate::types::SessionKey;

/// Pending handshakes, at most one per transport session key.
///
/// # Contract
///
/// - `put` overwrites any entry for the same key. The replaced handshake is
///   abandoned; nothing is sent to the provider.
/// - `take` retrieves and removes in one atomic step, so two racing finish
///   requests can never both obtain the same handshake.
pub trait HandshakeStore: Send + Sync + 'static {
    /// Store a handshake, replacing any previous one for `key`.
    fn put(
        &self,
        key: SessionKey,
        handshake: HandshakeSession,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Remove and return the handshake for `key`, if any.
    fn take(
        &self,
        key: &SessionKey,
    ) -> impl Future<Output = Result<Option<HandshakeSession>, BoxError>> + Send;
}

/// Lifetime of a pending handshake unless overridden with
/// [`MemoryHandshakeStore::with_ttl`].
pub const DEFAULT_HANDSHAKE_TTL: Duration = Duration::minutes(10);

/// In-process [`HandshakeStore`].
///
/// Entries live until taken, replaced, or older than the TTL
/// ([`DEFAULT_HANDSHAKE_TTL`] unless set with [`with_ttl`](Self::with_ttl)).
/// An expired entry is treated as absent. Every `put` purges expired entries,
/// which scans the whole map under the lock, so the map is bounded by the
/// number of logins started within one TTL.
#[derive(Debug)]
pub struct MemoryHandshakeStore {
    entries: Mutex<HashMap<SessionKey, HandshakeSession>>,
    ttl: Duration,
}

impl Default for MemoryHandshakeStore {
    fn default() -> Self {
        Self {
            entries: Mutex::default(),
            ttl: DEFAULT_HANDSHAKE_TTL,
        }
    }
}

impl MemoryHandshakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire entries once their transport session would have expired.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of pending handshakes, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, HandshakeSession>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, handshake: &HandshakeSession, now: OffsetDateTime) -> bool {
        now - handshake.created_at() > self.ttl
    }
}

impl HandshakeStore for MemoryHandshakeStore {
    async fn put(&self, key: SessionKey, handshake: HandshakeSession) -> Result<(), BoxError> {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.lock();

        entries.retain(|_, h| !self.is_expired(h, now));

        if entries.insert(key.clone(), handshake).is_some() {
            tracing::debug!(session_key = %key, "Replaced pending handshake");
        }
        Ok(())
    }

    async fn take(&self, key: &SessionKey) -> Result<Option<HandshakeSession>, BoxError> {
        let now = OffsetDateTime::now_utc();
        let taken = self.lock().remove(key);

        Ok(taken.filter(|h| {
            let expired = self.is_expired(h, now);
            if expired {
                tracing::debug!(session_key = %key, "Discarded expired handshake");
            }
            !expired
        }))
    }
}
