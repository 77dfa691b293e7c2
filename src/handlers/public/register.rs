// handlers/public/register.rs - POST /register/

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::api::payload::parse_registration;
use crate::api::RegisteredUser;
use crate::app::AppState;
use crate::auth::password::hash_password_blocking;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// POST /register/ - Create an account from `{username, password, email}`.
///
/// Answers 201 with `{username, email}`. The password is stored only as an
/// argon2id hash. Disabled deployments answer 403.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RegisteredUser> {
    if !state.api.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled."));
    }

    let Json(body) = body?;
    let (input, mut fields) = parse_registration(&body)?;
    if let Some(username) = input.username.as_deref() {
        if state.store.find_user_by_username(username).await?.is_some() {
            fields.reject("username", USERNAME_TAKEN);
        }
    }
    fields.finish()?;

    let registration = input
        .into_registration()
        .ok_or_else(|| ApiError::validation_error("Invalid input", None))?;
    let password_hash = hash_password_blocking(registration.password).await?;

    // The unique constraint still decides when two registrations race
    let user = state
        .store
        .create_user(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
        })
        .await?;

    info!("Registered user {} (id {})", user.username, user.id);
    Ok(ApiResponse::created(user.into()))
}
