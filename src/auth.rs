use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use tracing::warn;

use crate::{error::AppError, models::session::Session};

pub const SESSION_COOKIE: &str = "waypoint_session";

/// The session the browser holds, if any. Only its presence matters to the
/// views; the token itself is issued and validated by the auth service.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        Ok(Self(read_session(&jar)))
    }
}

impl CurrentSession {
    pub fn require(&self) -> Result<&Session, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }
}

pub fn read_session(jar: &PrivateCookieJar) -> Option<Session> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!("discarding unreadable session cookie: {err}");
            None
        }
    }
}

pub fn apply_session_cookie(
    jar: PrivateCookieJar,
    session: &Session,
) -> Result<PrivateCookieJar, AppError> {
    let value = serde_json::to_string(session).map_err(|err| AppError::Other(err.into()))?;
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
