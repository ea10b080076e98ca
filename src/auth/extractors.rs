use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::cookie::SESSION_COOKIE_NAME;
use super::jwt::JwtKeys;
use crate::error::AuthError;

/// Extracts the session token from the request and validates it, returning
/// the user ID. The token normally arrives in the `token` cookie; a `Bearer`
/// Authorization header with the same JWT is accepted as well.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(AuthError::Unauthorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            AuthError::Unauthorized
        })?;

        Ok(AuthUser(claims.sub))
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts.headers.get(axum::http::header::COOKIE) {
        if let Ok(value) = header.to_str() {
            for pair in value.split(';') {
                if let Some((key, val)) = pair.trim().split_once('=') {
                    if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                        return Some(val.trim().to_string());
                    }
                }
            }
        }
    }

    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn reads_token_from_cookie() {
        let parts = parts_with_headers(&[("cookie", "other=1; token=abc.def.ghi")]);
        assert_eq!(session_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let parts = parts_with_headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(session_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_cookie_value_is_no_token() {
        let parts = parts_with_headers(&[("cookie", "token=")]);
        assert_eq!(session_token(&parts), None);
    }

    #[test]
    fn missing_headers_is_no_token() {
        let parts = parts_with_headers(&[]);
        assert_eq!(session_token(&parts), None);
    }
}
