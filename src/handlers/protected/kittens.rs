// handlers/protected/kittens.rs - kitten mutations (owner-or-read-only)
//
// Checks run in a fixed order: 401 (extractor), 404 (lookup),
// 403 (ownership), then 400 (body).

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::Method,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::api::payload::{does_not_exist, parse_kitten, Fields};
use crate::api::KittenView;
use crate::app::AppState;
use crate::auth::permissions::ensure_owner_or_read_only;
use crate::database::models::{KittenChanges, KittenDetail};
use crate::error::ApiError;
use crate::handlers::{not_found, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Record a field error when the referenced breed does not exist
async fn resolve_breed(state: &AppState, changes: &KittenChanges, fields: &mut Fields<'_>) -> Result<(), ApiError> {
    if let Some(breed_id) = changes.breed_id {
        if state.store.find_breed(breed_id).await?.is_none() {
            fields.reject("breed_id", does_not_exist(breed_id));
        }
    }
    Ok(())
}

/// Kitten named by the path, checked against the caller's ownership
async fn owned_kitten(state: &AppState, method: &Method, user: &AuthUser, id: &str) -> Result<KittenDetail, ApiError> {
    let id = parse_id(id)?;
    let kitten = state.store.find_kitten(id).await?.ok_or_else(not_found)?;
    ensure_owner_or_read_only(method, user, &kitten)?;
    Ok(kitten)
}

/// POST /kittens/ - Create a kitten owned by the caller; any `owner` in the body is ignored
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<KittenView> {
    let Json(body) = body?;
    let (changes, mut fields) = parse_kitten(&body, false)?;
    resolve_breed(&state, &changes, &mut fields).await?;
    fields.finish()?;

    let kitten = changes
        .into_new()
        .ok_or_else(|| ApiError::validation_error("Invalid input", None))?;
    let created = state.store.create_kitten(user.id, kitten).await?;

    info!("User {} created kitten {}", user.username, created.id);
    Ok(ApiResponse::created(created.into()))
}

async fn apply_update(
    user: AuthUser,
    state: AppState,
    method: Method,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> ApiResult<KittenView> {
    let kitten = owned_kitten(&state, &method, &user, &id).await?;

    let Json(body) = body?;
    let (changes, mut fields) = parse_kitten(&body, partial)?;
    resolve_breed(&state, &changes, &mut fields).await?;
    fields.finish()?;

    if changes.is_empty() {
        return Ok(ApiResponse::success(kitten.into()));
    }

    let updated = state.store.update_kitten(kitten.id, changes).await?;
    info!("User {} updated kitten {}", user.username, updated.id);
    Ok(ApiResponse::success(updated.into()))
}

/// PUT /kittens/:id/ - Replace every writable field
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    method: Method,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<KittenView> {
    let Path(id) = id?;
    apply_update(user, state, method, id, body, false).await
}

/// PATCH /kittens/:id/ - Change any subset of writable fields
pub async fn partial_update(
    user: AuthUser,
    State(state): State<AppState>,
    method: Method,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<KittenView> {
    let Path(id) = id?;
    apply_update(user, state, method, id, body, true).await
}

/// DELETE /kittens/:id/ - Remove a kitten and its ratings
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    method: Method,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let kitten = owned_kitten(&state, &method, &user, &id).await?;

    if !state.store.delete_kitten(kitten.id).await? {
        return Err(not_found());
    }

    info!("User {} deleted kitten {}", user.username, kitten.id);
    Ok(ApiResponse::no_content())
}
