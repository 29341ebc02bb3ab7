use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use lifelog_lib::session::{SESSION_COOKIE, SessionError};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// The account a request is authenticated as. Rejects with 401 when the request carries no
/// valid session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        state
            .sessions
            .verify(&token)
            .map(CurrentUser)
            .map_err(|e| match e {
                SessionError::InvalidKey => {
                    error!("Session secret is unusable: {e}");
                    AppError::Internal
                }
                _ => {
                    debug!("Rejected session token: {e}");
                    AppError::Unauthorized
                }
            })
    }
}

/// The session cookie, falling back to an `Authorization: Bearer` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookies| cookie_value(cookies, SESSION_COOKIE))
        .or_else(|| {
            headers
                .get(AUTHORIZATION)?
                .to_str()
                .ok()?
                .strip_prefix("Bearer ")
                .map(|token| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod test {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_cookie_value() {
        let cookies = "theme=dark; lifelog_session=abc.123.sig ; other=1";

        assert_eq!(
            cookie_value(cookies, SESSION_COOKIE).as_deref(),
            Some("abc.123.sig")
        );
        assert_eq!(cookie_value("theme=dark", SESSION_COOKIE), None);
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));

        headers.insert(COOKIE, HeaderValue::from_static("lifelog_session=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));

        assert_eq!(session_token(&headers), None);
    }
}
