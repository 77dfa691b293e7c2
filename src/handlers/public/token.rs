// handlers/public/token.rs - POST /token/ and POST /token/refresh/

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::payload::{parse_credentials, parse_refresh};
use crate::app::AppState;
use crate::auth::password::verify_password_blocking;
use crate::auth::{issue_access_token, issue_token_pair, validate_jwt, TokenKind, TokenPair};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub const BAD_CREDENTIALS: &str = "No active account found with the given credentials";
pub const BAD_REFRESH: &str = "Token is invalid or expired";

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// POST /token/ - Exchange `{username, password}` for an access/refresh pair
pub async fn obtain(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(body) = body?;
    let (username, password) = parse_credentials(&body)?;

    let Some(user) = state.store.find_user_by_username(&username).await? else {
        debug!("Token request for unknown user {}", username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        debug!("Token request with wrong password for {}", username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let pair = issue_token_pair(user.id, &user.username)?;
    info!("Issued tokens for user {}", user.username);
    Ok(ApiResponse::success(pair))
}

/// POST /token/refresh/ - Exchange `{refresh}` for a new access token
pub async fn refresh(body: Result<Json<Value>, JsonRejection>) -> ApiResult<AccessToken> {
    let Json(body) = body?;
    let token = parse_refresh(&body)?;

    let claims = validate_jwt(&token, TokenKind::Refresh).map_err(|e| {
        debug!("Refresh rejected: {}", e);
        ApiError::unauthorized(BAD_REFRESH)
    })?;

    let access = issue_access_token(claims.user_id, &claims.username)?;
    Ok(ApiResponse::success(AccessToken { access }))
}
