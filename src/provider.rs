use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ProviderError;
use crate::identity::VerifiedIdentity;

/// Where to send the user's browser to authenticate at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RedirectInstruction {
    pub url: Url,
}

impl RedirectInstruction {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

/// Raw parameters of the provider's return request (query string or form body).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackParams(BTreeMap<String, String>);

impl CallbackParams {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Combine two parameter sets; `other` wins on duplicate keys.
    #[must_use]
    pub fn merge(mut self, other: CallbackParams) -> Self {
        self.0.extend(other.0);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Client for the remote identity provider.
///
/// Both calls may hit the network and may fail for reasons outside this
/// crate's control. They are not assumed to be pure: a second
/// `begin_authentication` for the same identifier can invalidate a redirect
/// already issued, so callers never retry.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Build the redirect that starts authentication for `identifier`.
    ///
    /// The provider sends the browser back to `return_to` when done.
    fn begin_authentication(
        &self,
        identifier: &str,
        return_to: &Url,
    ) -> impl Future<Output = Result<RedirectInstruction, ProviderError>> + Send;

    /// Verify the provider's response delivered to `return_to`.
    fn complete_authentication(
        &self,
        return_to: &Url,
        response: &CallbackParams,
    ) -> impl Future<Output = Result<VerifiedIdentity, ProviderError>> + Send;
}
