use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Client-readable login cookie.
pub const PUBLIC_COOKIE: &str = "teambuildPublic";
/// HttpOnly login cookie carrying the private token.
pub const PRIVATE_COOKIE: &str = "teambuildPrivate";

/// Verifies the signed credential on a request and yields the caller's id.
///
/// The private token is read from the `teambuildPrivate` cookie, falling
/// back to an `Authorization: Bearer` header.
pub struct AuthUser(pub i32);

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let from_cookie = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| cookie_value(h, PRIVATE_COOKIE))
            .map(str::to_owned);

        let from_bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_owned);

        let token = from_cookie
            .or(from_bearer)
            .ok_or_else(|| ApiError::Unauthorized("Missing authentication token".into()))?;

        let claims = match keys.verify_private(&token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(ApiError::Unauthorized("Invalid or expired token".into()));
            }
        };

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_private_cookie_among_pairs() {
        let header = "theme=dark; teambuildPrivate=abc.def.ghi; other=1";
        assert_eq!(cookie_value(header, PRIVATE_COOKIE), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_value_ignores_unrelated_cookies() {
        let header = "teambuildPublic=xyz; session=42";
        assert_eq!(cookie_value(header, PRIVATE_COOKIE), None);
    }

    #[test]
    fn cookie_value_handles_empty_header() {
        assert_eq!(cookie_value("", PRIVATE_COOKIE), None);
    }
}
