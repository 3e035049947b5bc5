use std::future::Future;

use crate::error::{BoxError, Error};
use crate::identity::VerifiedIdentity;
use crate::types::UserId;

/// Host-provided account lookup and linking.
///
/// # Example
///
/// ```rust,ignore
/// impl AccountResolver for MyAppState {
///     async fn resolve(&self, identity: &VerifiedIdentity) -> Result<Option<UserId>, BoxError> {
///         Ok(self.repo.find_by_openid(identity.identifier.as_str()).await?.map(|u| u.id.into()))
///     }
///
///     async fn link(&self, user_id: &UserId, identity: &VerifiedIdentity) -> Result<(), BoxError> {
///         self.repo.add_openid(user_id, identity.identifier.as_str()).await?;
///         Ok(())
///     }
/// }
/// ```
pub trait AccountResolver: Send + Sync + 'static {
    /// Find the local account that claimed this external identifier.
    fn resolve(
        &self,
        identity: &VerifiedIdentity,
    ) -> impl Future<Output = Result<Option<UserId>, BoxError>> + Send;

    /// Attach the external identifier to an existing account.
    fn link(
        &self,
        user_id: &UserId,
        identity: &VerifiedIdentity,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// What to do once the provider has verified the identity.
///
/// Chosen by the entry point that created the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeHandler {
    /// Sign in the account that claimed the identity.
    SignIn {
        /// Relative path to land on after sign-in.
        from: Option<String>,
    },
    /// Link the identity to the already authenticated caller.
    Link { user_id: UserId },
}

/// Final result of a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    SignedIn {
        user_id: UserId,
        identity: VerifiedIdentity,
        from: Option<String>,
    },
    Linked {
        user_id: UserId,
        identity: VerifiedIdentity,
    },
    /// The provider vouched for the identity but no local account claims it.
    ///
    /// Not an error: the host decides how to offer account creation.
    Unclaimed { identity: VerifiedIdentity },
}

impl OutcomeHandler {
    pub(crate) async fn run<R: AccountResolver>(
        self,
        identity: VerifiedIdentity,
        resolver: &R,
    ) -> Result<Outcome, Error> {
        match self {
            Self::SignIn { from } => {
                let account = resolver
                    .resolve(&identity)
                    .await
                    .map_err(|e| Error::Account(e.to_string()))?;

                match account {
                    Some(user_id) => {
                        tracing::info!(user_id = %user_id, identifier = %identity.identifier, "Federated sign-in");
                        Ok(Outcome::SignedIn {
                            user_id,
                            identity,
                            from,
                        })
                    }
                    None => {
                        tracing::info!(identifier = %identity.identifier, "Unclaimed federated identity");
                        Ok(Outcome::Unclaimed { identity })
                    }
                }
            }
            Self::Link { user_id } => {
                resolver
                    .link(&user_id, &identity)
                    .await
                    .map_err(|e| Error::Account(e.to_string()))?;
                tracing::info!(user_id = %user_id, identifier = %identity.identifier, "Federated identity linked");
                Ok(Outcome::Linked { user_id, identity })
            }
        }
    }
}
