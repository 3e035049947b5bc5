use url::Url;

use crate::error::Error;
use crate::handshake::HandshakeSession;
use crate::outcome::{AccountResolver, Outcome, OutcomeHandler};
use crate::provider::{CallbackParams, IdentityProvider, RedirectInstruction};
use crate::store::HandshakeStore;
use crate::types::{SessionKey, UserId};

/// Begin/finish entry points for federated login and account linking.
///
/// Owns the identity provider client, the host's account resolver and the
/// handshake store. Callback paths are resolved against `base_url`, the
/// externally visible root of the host application.
pub struct FederatedLogin<P, R, H> {
    base_url: Url,
    provider: P,
    resolver: R,
    store: H,
}

impl<P, R, H> FederatedLogin<P, R, H>
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
{
    #[must_use]
    pub fn new(mut base_url: Url, provider: P, resolver: R, store: H) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            provider,
            resolver,
            store,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    #[must_use]
    pub fn store(&self) -> &H {
        &self.store
    }

    /// Start a login for `identifier`.
    ///
    /// On success the new handshake replaces any pending one for `key` and the
    /// redirect is returned. `from` is kept only if it is a same-site relative path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] / [`Error::Provider`] if the provider
    /// refuses to start (nothing is stored and any earlier handshake for `key`
    /// is discarded), [`Error::Config`] if `callback_path` does not resolve
    /// against the base URL, [`Error::Store`] if the handshake cannot be saved.
    pub async fn begin_login(
        &self,
        key: &SessionKey,
        identifier: &str,
        callback_path: &str,
        from: Option<&str>,
    ) -> Result<RedirectInstruction, Error> {
        let handler = OutcomeHandler::SignIn {
            from: from.and_then(sanitize_from),
        };
        self.begin(key, identifier, callback_path, handler).await
    }

    /// Start linking `identifier` to the authenticated caller's account.
    ///
    /// # Errors
    ///
    /// [`Error::PreconditionViolation`] if `current_user` is `None`; checked
    /// before the provider is contacted. Otherwise as [`begin_login`](Self::begin_login).
    pub async fn begin_associate(
        &self,
        key: &SessionKey,
        current_user: Option<&UserId>,
        identifier: &str,
        callback_path: &str,
    ) -> Result<RedirectInstruction, Error> {
        let user_id = current_user
            .cloned()
            .ok_or(Error::PreconditionViolation("associate requires an authenticated caller"))?;
        self.begin(key, identifier, callback_path, OutcomeHandler::Link { user_id })
            .await
    }

    /// Complete the pending handshake for `key` with the provider's response.
    ///
    /// The handshake is removed from the store before verification, whatever
    /// the result.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingSession`] if nothing is pending for `key`,
    /// [`Error::Provider`] if verification fails, [`Error::Account`] if the
    /// outcome handler's account operation fails.
    pub async fn finish(&self, key: &SessionKey, params: &CallbackParams) -> Result<Outcome, Error> {
        let handshake = self
            .store
            .take(key)
            .await
            .map_err(|e| Error::Store(e.to_string()))?
            .ok_or(Error::NoPendingSession)?;

        handshake
            .finish(&self.provider, &self.resolver, params)
            .await
    }

    async fn begin(
        &self,
        key: &SessionKey,
        identifier: &str,
        callback_path: &str,
        handler: OutcomeHandler,
    ) -> Result<RedirectInstruction, Error> {
        let return_to = self
            .base_url
            .join(callback_path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("callback path {callback_path:?}: {e}")))?;

        let mut handshake = HandshakeSession::new(key.clone(), identifier.trim(), return_to, handler);
        let redirect = match handshake.commence(&self.provider).await {
            Ok(redirect) => redirect,
            Err(e) => {
                // A restart invalidates the previous handshake even when it fails.
                let discarded = self
                    .store
                    .take(key)
                    .await
                    .map_err(|e| Error::Store(e.to_string()))?;
                if discarded.is_some() {
                    tracing::debug!(session_key = %key, "Discarded pending handshake after failed restart");
                }
                return Err(e);
            }
        };

        self.store
            .put(key.clone(), handshake)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        tracing::info!(session_key = %key, identifier = %identifier, "Federated handshake started");
        Ok(redirect)
    }
}

/// Keep `from` only when it is a relative path on this site.
fn sanitize_from(from: &str) -> Option<String> {
    let relative = from.starts_with('/')
        && !from.starts_with("//")
        && !from.contains('\\')
        && !from.chars().any(|c| c.is_control());
    relative.then(|| from.to_string())
}
