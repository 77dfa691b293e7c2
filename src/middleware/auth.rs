use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{validate_jwt, Claims, TokenKind};
use crate::error::ApiError;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";

/// Authenticated user context extracted from an access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware that attaches the caller when a Bearer token is present.
///
/// Requests without a Bearer token pass through anonymously; whether a route
/// needs a user is decided by the `AuthUser` extractor. A Bearer token that
/// fails validation is rejected outright.
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    match extract_jwt_from_headers(&headers) {
        Ok(None) => {}
        Ok(Some(token)) => match validate_jwt(&token, TokenKind::Access) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                return ApiError::from(e).into_response();
            }
        },
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    }

    next.run(request).await
}

/// Bearer token from the Authorization header; other schemes count as absent
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    let mut parts = auth_str.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = parts.next().unwrap_or_default().trim();
    if token.is_empty() {
        return Err("Invalid Authorization header. No credentials provided.".to_string());
    }
    if token.contains(' ') {
        return Err("Invalid Authorization header. Credentials string should not contain spaces.".to_string());
    }
    Ok(Some(token.to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))
    }
}
