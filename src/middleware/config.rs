use axum_extra::extract::cookie::Key;
use time::Duration;

use super::error::AuthError;

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) handshake_cookie_name: String,
    pub(crate) handshake_ttl_minutes: i64,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_redirect: String,
    pub(crate) logout_redirect: String,
    pub(crate) association_redirect: String,
    pub(crate) signup_redirect: String,
    pub(crate) error_redirect: String,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            handshake_cookie_name: "__openid_handshake".into(),
            handshake_ttl_minutes: 10,
            session_cookie_name: "__federated_session".into(),
            session_ttl_days: 30,
            secure_cookies: true,
            auth_path: "/openid".into(),
            login_redirect: "/".into(),
            logout_redirect: "/".into(),
            association_redirect: "/".into(),
            signup_redirect: "/signup".into(),
            error_redirect: "/login".into(),
        }
    }

    pub(crate) fn finish_path(&self) -> String {
        format!("{}/finish", self.auth_path)
    }
}

/// Federated login route configuration.
///
/// Use [`from_env()`](AuthConfig::from_env) for convention-based setup,
/// or [`new()`](AuthConfig::new) with `with_*` methods for full control.
pub struct AuthConfig {
    pub(super) settings: AuthSettings,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    /// Create config with defaults: routes under `/openid`, secure cookies,
    /// an ephemeral cookie key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `OPENID_URL_NAME`: URL namespace the routes are mounted under (default `openid`)
    /// - `DEV_AUTH`: Set to `"1"` or `"true"` to disable secure cookies
    /// - `COOKIE_KEY`: Cookie encryption key bytes
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if `COOKIE_KEY` is set but too short.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let dev_auth = matches!(var("DEV_AUTH").as_deref(), Some("1") | Some("true"));

        let cookie_key = match var("COOKIE_KEY") {
            Some(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                AuthError::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            None => Key::generate(),
        };

        let mut config = Self::new()
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_auth);

        if let Some(name) = var("OPENID_URL_NAME") {
            config = config.with_auth_path(format!("/{}", name.trim_matches('/')));
        }

        Ok(config)
    }

    /// Lifetime of the handshake cookie. Give the same TTL to a
    /// [`MemoryHandshakeStore`](crate::MemoryHandshakeStore) so abandoned
    /// handshakes expire with it.
    #[must_use]
    pub fn handshake_ttl(&self) -> Duration {
        Duration::minutes(self.settings.handshake_ttl_minutes)
    }

    /// Path of the finish route, to be used as the provider callback.
    #[must_use]
    pub fn finish_path(&self) -> String {
        self.settings.finish_path()
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_handshake_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.handshake_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_handshake_ttl_minutes(mut self, minutes: i64) -> Self {
        self.settings.handshake_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_association_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.association_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_signup_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.signup_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_error_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.error_redirect = path.into();
        self
    }
}
