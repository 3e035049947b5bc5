use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, header::USER_AGENT};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::config::{AuthConfig, AuthSettings};
use super::cookies;
use super::error::AuthError;
use super::extractor::resolve_session;
use super::state::AuthState;
use super::traits::SessionStore;
use super::types::NewSession;
use crate::error::{Error, ProviderError};
use crate::login::FederatedLogin;
use crate::outcome::{AccountResolver, Outcome};
use crate::provider::{CallbackParams, IdentityProvider};
use crate::store::HandshakeStore;
use crate::types::SessionId;

/// Create the federated login router.
///
/// Mounts `startLogin`, `startAssociate`, `finish` and `logout` under the
/// configured URL namespace.
pub fn auth_routes<P, R, H, S>(
    config: AuthConfig,
    login: FederatedLogin<P, R, H>,
    session_store: S,
) -> Router
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    let auth_path = config.settings.auth_path.clone();

    let state = AuthState {
        login: Arc::new(login),
        session_store: Arc::new(session_store),
        settings: config.settings,
    };

    Router::new()
        .route(&format!("{auth_path}/startLogin"), get(start_login::<P, R, H, S>))
        .route(
            &format!("{auth_path}/startAssociate"),
            get(start_associate::<P, R, H, S>),
        )
        .route(
            &format!("{auth_path}/finish"),
            get(finish_query::<P, R, H, S>).post(finish_form::<P, R, H, S>),
        )
        .route(
            &format!("{auth_path}/logout"),
            get(logout::<P, R, H, S>).post(logout::<P, R, H, S>),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct StartParams {
    openid: Option<String>,
    from: Option<String>,
}

// ── Start ──────────────────────────────────────────────────────────

async fn start_login<P, R, H, S>(
    State(state): State<AuthState<P, R, H, S>>,
    jar: PrivateCookieJar,
    Query(params): Query<StartParams>,
) -> Result<(PrivateCookieJar, Redirect), Response>
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    let identifier = params.openid.unwrap_or_default();
    let (jar, key) = cookies::handshake_key(jar, &state.settings);

    let redirect = state
        .login
        .begin_login(
            &key,
            &identifier,
            &state.settings.finish_path(),
            params.from.as_deref(),
        )
        .await
        .map_err(|e| reject(&state.settings, e))?;

    Ok((jar, Redirect::to(redirect.url.as_str())))
}

async fn start_associate<P, R, H, S>(
    State(state): State<AuthState<P, R, H, S>>,
    jar: PrivateCookieJar,
    Query(params): Query<StartParams>,
) -> Result<(PrivateCookieJar, Redirect), Response>
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    let current = match resolve_session(
        state.session_store.as_ref(),
        &jar,
        &state.settings.session_cookie_name,
    )
    .await
    {
        Ok(user) => Some(user),
        Err(AuthError::Unauthenticated | AuthError::SessionExpired) => None,
        Err(e) => return Err(e.into_response()),
    };

    let identifier = params.openid.unwrap_or_default();
    let (jar, key) = cookies::handshake_key(jar, &state.settings);

    let redirect = state
        .login
        .begin_associate(
            &key,
            current.as_ref().map(|u| &u.user_id),
            &identifier,
            &state.settings.finish_path(),
        )
        .await
        .map_err(|e| reject(&state.settings, e))?;

    Ok((jar, Redirect::to(redirect.url.as_str())))
}

// ── Finish ─────────────────────────────────────────────────────────

async fn finish_query<P, R, H, S>(
    State(state): State<AuthState<P, R, H, S>>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    finish(state, jar, headers, params).await
}

/// Providers may POST long assertions; `return_to` parameters stay in the query.
async fn finish_form<P, R, H, S>(
    State(state): State<AuthState<P, R, H, S>>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Query(query): Query<CallbackParams>,
    Form(form): Form<CallbackParams>,
) -> Response
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    finish(state, jar, headers, query.merge(form)).await
}

async fn finish<P, R, H, S>(
    state: AuthState<P, R, H, S>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    params: CallbackParams,
) -> Response
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    let settings = &state.settings;

    let Some(key) = cookies::get_handshake_key(&jar, &settings.handshake_cookie_name) else {
        tracing::warn!("Finish request without handshake cookie");
        return AuthError::NoPendingSession.into_response();
    };
    let jar = jar.remove(cookies::clear_handshake_cookie(settings));

    let outcome = match state.login.finish(&key, &params).await {
        Ok(outcome) => outcome,
        Err(e) => return (jar, reject(settings, e)).into_response(),
    };

    match outcome {
        Outcome::SignedIn {
            user_id,
            identity,
            from,
        } => {
            let session = NewSession {
                user_id,
                identity,
                user_agent: extract_user_agent(&headers),
                ip_address: extract_client_ip(&headers),
            };

            let session_id = match state.session_store.create(session).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(error = %e, "Session creation failed");
                    return (jar, login_error(&settings.error_redirect, "session_failed"))
                        .into_response();
                }
            };

            tracing::info!(session_id = %session_id, "Federated login successful");

            let target = from.as_deref().unwrap_or(&settings.login_redirect);
            (
                jar.add(cookies::session_cookie(settings, &session_id)),
                Redirect::to(target),
            )
                .into_response()
        }
        Outcome::Linked { .. } => {
            (jar, Redirect::to(&settings.association_redirect)).into_response()
        }
        Outcome::Unclaimed { identity } => {
            let encoded = urlencoding::encode(identity.identifier.as_str());
            let target = format!("{}?identifier={encoded}", settings.signup_redirect);
            (jar, Redirect::to(&target)).into_response()
        }
    }
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<P, R, H, S>(
    State(state): State<AuthState<P, R, H, S>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect)
where
    P: IdentityProvider,
    R: AccountResolver,
    H: HandshakeStore,
    S: SessionStore,
{
    if let Some(cookie) = jar.get(&state.settings.session_cookie_name) {
        let session_id = SessionId(cookie.value().to_string());
        if let Err(e) = state.session_store.delete(&session_id).await {
            tracing::warn!(error = %e, "Session deletion failed during logout");
        }
    }

    let clear_cookie = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    (jar.remove(clear_cookie), Redirect::to(&state.settings.logout_redirect))
}

// ── Helpers ────────────────────────────────────────────────────────

/// User-facing failures go back to the login page; the rest map to a status.
fn reject(settings: &AuthSettings, e: Error) -> Response {
    match e {
        Error::InvalidIdentifier(ref msg) => {
            tracing::info!(reason = %msg, "Rejected OpenID identifier");
            login_error(&settings.error_redirect, "invalid_identifier")
        }
        Error::Provider(ProviderError::Cancelled) => {
            login_error(&settings.error_redirect, "cancelled")
        }
        Error::Provider(ref err) => {
            tracing::warn!(error = %err, "OpenID authentication failed");
            login_error(&settings.error_redirect, "authentication_failed")
        }
        other => AuthError::from(other).into_response(),
    }
}

fn login_error(error_redirect: &str, code: &str) -> Response {
    let encoded = urlencoding::encode(code);
    Redirect::to(&format!("{error_redirect}?error={encoded}")).into_response()
}

fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}
