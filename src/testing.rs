//! Hard-coded trait implementations shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use url::Url;

use crate::error::{BoxError, ProviderError};
use crate::identity::VerifiedIdentity;
use crate::outcome::AccountResolver;
use crate::provider::{CallbackParams, IdentityProvider, RedirectInstruction};
use crate::types::UserId;

static INIT: Once = Once::new();

/// Initialise tracing once for all tests.
pub(crate) fn init_tracer() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Provider that accepts callbacks carrying `sig=valid`.
///
/// The nickname is the part of the identifier before the first `-`.
#[derive(Debug, Default)]
pub(crate) struct MockProvider {
    begin_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    last_return_to: Mutex<Option<Url>>,
}

impl MockProvider {
    pub(crate) fn begin_calls(&self) -> usize {
        self.begin_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_return_to(&self) -> Option<Url> {
        self.last_return_to.lock().unwrap().clone()
    }

    pub(crate) fn valid_callback(identifier: &str) -> CallbackParams {
        [("identity", identifier), ("sig", "valid")].into_iter().collect()
    }

    pub(crate) fn tampered_callback(identifier: &str) -> CallbackParams {
        [("identity", identifier), ("sig", "forged")].into_iter().collect()
    }
}

impl IdentityProvider for MockProvider {
    async fn begin_authentication(
        &self,
        identifier: &str,
        return_to: &Url,
    ) -> Result<RedirectInstruction, ProviderError> {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        if identifier.is_empty() {
            return Err(ProviderError::InvalidIdentifier("empty identifier".into()));
        }
        *self.last_return_to.lock().unwrap() = Some(return_to.clone());

        let mut url: Url = "https://idp.example/auth".parse().unwrap();
        url.query_pairs_mut()
            .append_pair("identity", identifier)
            .append_pair("return_to", return_to.as_str());
        Ok(RedirectInstruction::new(url))
    }

    async fn complete_authentication(
        &self,
        _return_to: &Url,
        response: &CallbackParams,
    ) -> Result<VerifiedIdentity, ProviderError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if response.get("sig") != Some("valid") {
            return Err(ProviderError::Rejected {
                operation: "verification",
                detail: "signature mismatch".into(),
            });
        }
        let identifier = response
            .get("identity")
            .ok_or_else(|| ProviderError::Malformed("missing identity".into()))?;
        let nickname = identifier.split('-').next().unwrap_or(identifier);

        Ok(VerifiedIdentity::new(identifier).with_nickname(nickname))
    }
}

/// Account resolver backed by a fixed identifier → user map.
#[derive(Debug, Default)]
pub(crate) struct MockResolver {
    accounts: HashMap<String, UserId>,
    linked: Arc<Mutex<Vec<(UserId, String)>>>,
    resolve_calls: AtomicUsize,
    failing: bool,
}

impl MockResolver {
    pub(crate) fn with_account(mut self, identifier: &str, user_id: &str) -> Self {
        self.accounts
            .insert(identifier.to_string(), UserId::from(user_id));
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn linked(&self) -> Vec<(UserId, String)> {
        self.linked.lock().unwrap().clone()
    }

    /// Shared view of `link` calls, readable after the resolver is moved.
    pub(crate) fn link_log(&self) -> Arc<Mutex<Vec<(UserId, String)>>> {
        Arc::clone(&self.linked)
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

impl AccountResolver for MockResolver {
    async fn resolve(&self, identity: &VerifiedIdentity) -> Result<Option<UserId>, BoxError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err("account database unavailable".into());
        }
        Ok(self.accounts.get(identity.identifier.as_str()).cloned())
    }

    async fn link(&self, user_id: &UserId, identity: &VerifiedIdentity) -> Result<(), BoxError> {
        if self.failing {
            return Err("account database unavailable".into());
        }
        self.linked
            .lock()
            .unwrap()
            .push((user_id.clone(), identity.identifier.to_string()));
        Ok(())
    }
}

#[cfg(feature = "middleware")]
pub(crate) use sessions::MemorySessionStore;

#[cfg(feature = "middleware")]
mod sessions {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::BoxError;
    use crate::middleware::{AuthUser, NewSession, SessionStore};
    use crate::types::SessionId;

    /// Login sessions kept in a map, ids are sequential.
    #[derive(Debug, Default)]
    pub(crate) struct MemorySessionStore {
        sessions: Mutex<HashMap<SessionId, NewSession>>,
        next_id: AtomicUsize,
    }

    impl SessionStore for MemorySessionStore {
        async fn create(&self, session: NewSession) -> Result<SessionId, BoxError> {
            let id = SessionId(format!("sess-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
            self.sessions.lock().unwrap().insert(id.clone(), session);
            Ok(id)
        }

        async fn find(&self, session_id: &SessionId) -> Result<Option<AuthUser>, BoxError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .get(session_id)
                .map(|s| AuthUser {
                    session_id: session_id.clone(),
                    user_id: s.user_id.clone(),
                    identifier: s.identity.identifier.clone(),
                }))
        }

        async fn delete(&self, session_id: &SessionId) -> Result<(), BoxError> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }
    }
}
