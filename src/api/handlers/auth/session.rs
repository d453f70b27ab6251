//! Session and PKCE cookies, plus request authentication.

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue, StatusCode,
};
use tracing::{debug, error};

use super::state::{AuthConfig, AuthState};
use crate::identity::{AuthError, Session, User};

pub(crate) const SESSION_COOKIE_NAME: &str = "central_session";
pub(crate) const REFRESH_COOKIE_NAME: &str = "central_refresh";
pub(crate) const PKCE_COOKIE_NAME: &str = "central_pkce";

fn cookie(
    config: &AuthConfig,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    // Only mark cookies secure when the site is served over HTTPS.
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// The access token cookie lives no longer than the token itself.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    session: &Session,
) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(
        config,
        SESSION_COOKIE_NAME,
        &session.access_token,
        config.access_cookie_max_age(session.expires_in),
    )
}

pub(crate) fn refresh_cookie(
    config: &AuthConfig,
    session: &Session,
) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(
        config,
        REFRESH_COOKIE_NAME,
        &session.refresh_token,
        config.session_ttl_seconds(),
    )
}

pub(crate) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(config, SESSION_COOKIE_NAME, "", 0)
}

pub(crate) fn clear_refresh_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(config, REFRESH_COOKIE_NAME, "", 0)
}

pub(crate) fn verifier_cookie(
    config: &AuthConfig,
    verifier: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(config, PKCE_COOKIE_NAME, verifier, config.pkce_ttl_seconds())
}

pub(crate) fn clear_verifier_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    cookie(config, PKCE_COOKIE_NAME, "", 0)
}

/// `Set-Cookie` headers carrying the access and refresh tokens.
pub(crate) fn refreshed_headers(config: &AuthConfig, session: &Session) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match (session_cookie(config, session), refresh_cookie(config, session)) {
        (Ok(access), Ok(refresh)) => {
            headers.append(SET_COOKIE, access);
            headers.append(SET_COOKIE, refresh);
        }
        (Err(err), _) | (_, Err(err)) => error!("Failed to build session cookie: {err}"),
    }
    headers
}

/// `Set-Cookie` headers for a freshly established session. The PKCE verifier
/// is single use, so it is dropped at the same time.
pub(crate) fn session_headers(config: &AuthConfig, session: Option<&Session>) -> HeaderMap {
    let Some(session) = session else {
        return HeaderMap::new();
    };
    let mut headers = refreshed_headers(config, session);
    if !headers.is_empty() {
        if let Ok(clear) = clear_verifier_cookie(config) {
            headers.append(SET_COOKIE, clear);
        }
    }
    headers
}

/// Headers that drop every auth cookie.
pub(crate) fn cleared_headers(config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in [
        clear_session_cookie(config),
        clear_refresh_cookie(config),
        clear_verifier_cookie(config),
    ]
    .into_iter()
    .flatten()
    {
        headers.append(SET_COOKIE, value);
    }
    headers
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name && !val.trim().is_empty()).then(|| val.trim().to_string())
        })
}

/// Session token from `Authorization: Bearer` or the session cookie.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, SESSION_COOKIE_NAME))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// A request's resolved session. `cookies` is non-empty when the access
/// token had to be refreshed and must be sent back to the browser.
#[derive(Debug)]
pub(crate) struct Authenticated {
    pub(crate) user: User,
    pub(crate) cookies: HeaderMap,
}

fn rejection_status(err: &AuthError) -> StatusCode {
    if err.is_rejection() {
        debug!("Session rejected: {err}");
        StatusCode::UNAUTHORIZED
    } else {
        error!("Failed to resolve session: {err}");
        StatusCode::BAD_GATEWAY
    }
}

async fn refresh(
    refresh_token: &str,
    auth_state: &AuthState,
) -> Result<(Session, HeaderMap), AuthError> {
    let session = auth_state.identity().refresh_session(refresh_token).await?;
    let cookies = refreshed_headers(auth_state.config(), &session);
    Ok((session, cookies))
}

/// Access token for the request. When the access cookie is gone but the
/// refresh cookie is still there, the session is refreshed first.
pub(crate) async fn session_token(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> (Option<String>, HeaderMap) {
    if let Some(token) = extract_session_token(headers) {
        return (Some(token), HeaderMap::new());
    }
    let Some(refresh_token) = extract_cookie(headers, REFRESH_COOKIE_NAME) else {
        return (None, HeaderMap::new());
    };
    match refresh(&refresh_token, auth_state).await {
        Ok((session, cookies)) => (Some(session.access_token), cookies),
        Err(err) => {
            debug!("Session refresh failed: {err}");
            (None, cleared_headers(auth_state.config()))
        }
    }
}

/// Resolve the request's session into the provider user, refreshing an
/// expired access token when a refresh cookie is present.
///
/// # Errors
/// `401` when there is no session or the provider rejects it, `502` when the
/// provider cannot be reached.
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<Authenticated, StatusCode> {
    let refresh_token = extract_cookie(headers, REFRESH_COOKIE_NAME);

    if let Some(token) = extract_session_token(headers) {
        match auth_state.identity().get_user(&token).await {
            Ok(user) => {
                return Ok(Authenticated {
                    user,
                    cookies: HeaderMap::new(),
                })
            }
            Err(err) if err.is_rejection() && refresh_token.is_some() => {
                debug!("Access token rejected, refreshing: {err}");
            }
            Err(err) => return Err(rejection_status(&err)),
        }
    }

    let Some(refresh_token) = refresh_token else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let (session, cookies) = refresh(&refresh_token, auth_state)
        .await
        .map_err(|err| rejection_status(&err))?;
    let user = match session.user {
        Some(user) => user,
        None => auth_state
            .identity()
            .get_user(&session.access_token)
            .await
            .map_err(|err| rejection_status(&err))?,
    };
    Ok(Authenticated { user, cookies })
}
