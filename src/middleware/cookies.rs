use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::AuthSettings;
use crate::keys::generate_session_key;
use crate::types::{SessionId, SessionKey};

/// Reuse the browser's handshake key or mint a new one, refreshing the cookie.
pub(super) fn handshake_key(
    jar: PrivateCookieJar,
    settings: &AuthSettings,
) -> (PrivateCookieJar, SessionKey) {
    let key = get_handshake_key(&jar, &settings.handshake_cookie_name)
        .unwrap_or_else(generate_session_key);
    let cookie = handshake_cookie(settings, &key);
    (jar.add(cookie), key)
}

/// Handshake key cookie, scoped to the auth routes.
///
/// The provider may deliver its response as a cross-site POST, which only
/// carries `SameSite=None` cookies; browsers accept those only when secure.
fn handshake_cookie(settings: &AuthSettings, key: &SessionKey) -> Cookie<'static> {
    let same_site = if settings.secure_cookies {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build((settings.handshake_cookie_name.clone(), key.to_string()))
        .http_only(true)
        .secure(settings.secure_cookies)
        .same_site(same_site)
        .path(settings.auth_path.clone())
        .max_age(Duration::minutes(settings.handshake_ttl_minutes))
        .build()
}

/// Create removal cookie for the handshake key.
pub(super) fn clear_handshake_cookie(settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build((settings.handshake_cookie_name.clone(), ""))
        .path(settings.auth_path.clone())
        .max_age(Duration::ZERO)
        .build()
}

/// Get the handshake key from cookies.
pub(super) fn get_handshake_key(jar: &PrivateCookieJar, name: &str) -> Option<SessionKey> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .map(SessionKey)
}

/// Create session cookie.
pub(super) fn session_cookie(settings: &AuthSettings, session_id: &SessionId) -> Cookie<'static> {
    Cookie::build((settings.session_cookie_name.clone(), session_id.to_string()))
        .http_only(true)
        .secure(settings.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(settings.session_ttl_days))
        .build()
}

/// Create removal cookie for session.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
