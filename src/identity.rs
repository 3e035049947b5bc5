use serde::{Deserialize, Serialize};

use crate::types::ExternalId;

/// Identity asserted by the provider after a successful handshake.
///
/// Handed to the outcome handler and never persisted by this crate. Only
/// `identifier` is guaranteed; the remaining fields depend on what the
/// provider chose to release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VerifiedIdentity {
    pub identifier: ExternalId,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl VerifiedIdentity {
    /// Create an identity with only the required identifier.
    #[must_use]
    pub fn new(identifier: impl Into<ExternalId>) -> Self {
        Self {
            identifier: identifier.into(),
            nickname: None,
            full_name: None,
            email: None,
        }
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
