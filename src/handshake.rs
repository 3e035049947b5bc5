use time::OffsetDateTime;
use url::Url;

use crate::error::Error;
use crate::outcome::{AccountResolver, Outcome, OutcomeHandler};
use crate::provider::{CallbackParams, IdentityProvider, RedirectInstruction};
use crate::types::SessionKey;

/// Lifecycle of a [`HandshakeSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Created,
    AwaitingCallback,
    Completed,
    Failed,
}

impl HandshakeState {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::AwaitingCallback)
                | (Self::Created, Self::Failed)
                | (Self::AwaitingCallback, Self::Completed)
                | (Self::AwaitingCallback, Self::Failed)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One in-flight login or account-linking attempt.
///
/// Created at login start, parked in a [`HandshakeStore`](crate::HandshakeStore)
/// while the browser visits the provider, and consumed by [`finish`](Self::finish).
/// `finish` takes `self` by value, so a session completes at most once.
#[derive(Debug)]
pub struct HandshakeSession {
    key: SessionKey,
    identifier: String,
    return_to: Url,
    created_at: OffsetDateTime,
    state: HandshakeState,
    handler: OutcomeHandler,
}

impl HandshakeSession {
    #[must_use]
    pub fn new(
        key: SessionKey,
        identifier: impl Into<String>,
        return_to: Url,
        handler: OutcomeHandler,
    ) -> Self {
        Self {
            key,
            identifier: identifier.into(),
            return_to,
            created_at: OffsetDateTime::now_utc(),
            state: HandshakeState::Created,
            handler,
        }
    }

    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn return_to(&self) -> &Url {
        &self.return_to
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    #[must_use]
    pub fn handler(&self) -> &OutcomeHandler {
        &self.handler
    }

    fn transition(&mut self, next: HandshakeState) -> Result<(), Error> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Ask the provider where to send the browser.
    ///
    /// Moves to `AwaitingCallback` on success and to `Failed` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] or [`Error::Provider`] when the
    /// provider refuses to start, [`Error::InvalidTransition`] if the session
    /// was already commenced.
    pub async fn commence<P: IdentityProvider>(
        &mut self,
        provider: &P,
    ) -> Result<RedirectInstruction, Error> {
        if self.state != HandshakeState::Created {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: HandshakeState::AwaitingCallback,
            });
        }

        let begun = provider
            .begin_authentication(&self.identifier, &self.return_to)
            .await;

        match begun {
            Ok(redirect) => {
                self.transition(HandshakeState::AwaitingCallback)?;
                Ok(redirect)
            }
            Err(e) => {
                self.transition(HandshakeState::Failed)?;
                tracing::warn!(identifier = %self.identifier, error = %e, "Handshake could not start");
                Err(e.into())
            }
        }
    }

    /// Verify the provider's response and run the outcome handler.
    ///
    /// The handler runs only when verification succeeds; a provider failure is
    /// returned as is and never retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if verification fails, [`Error::Account`]
    /// if the handler's account operation fails, and
    /// [`Error::InvalidTransition`] if the session never reached
    /// `AwaitingCallback`.
    pub async fn finish<P: IdentityProvider, R: AccountResolver>(
        mut self,
        provider: &P,
        resolver: &R,
        response: &CallbackParams,
    ) -> Result<Outcome, Error> {
        if self.state != HandshakeState::AwaitingCallback {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: HandshakeState::Completed,
            });
        }

        let verified = provider
            .complete_authentication(&self.return_to, response)
            .await;

        let identity = match verified {
            Ok(identity) => identity,
            Err(e) => {
                self.transition(HandshakeState::Failed)?;
                tracing::warn!(identifier = %self.identifier, error = %e, "Handshake verification failed");
                return Err(Error::Provider(e));
            }
        };

        self.transition(HandshakeState::Completed)?;
        tracing::debug!(
            identifier = %identity.identifier,
            elapsed = ?(OffsetDateTime::now_utc() - self.created_at),
            "Handshake completed"
        );

        self.handler.run(identity, resolver).await
    }
}
