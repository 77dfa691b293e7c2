// handlers/protected/ratings.rs - GET and POST /ratings/

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::api::payload::{does_not_exist, parse_rating, NON_FIELD_ERRORS};
use crate::api::RatingView;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub const RATING_NOT_UNIQUE: &str = "The fields user, kitten must make a unique set.";

/// GET /ratings/ - Every rating, ordered by id
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> ApiResult<Vec<RatingView>> {
    let ratings = state.store.list_ratings().await?;
    Ok(ApiResponse::success(ratings.into_iter().map(RatingView::from).collect()))
}

/// POST /ratings/ - Rate a kitten as the caller; one rating per (user, kitten)
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RatingView> {
    let Json(body) = body?;
    let (input, mut fields) = parse_rating(&body)?;

    if let Some(kitten_id) = input.kitten_id {
        if state.store.find_kitten(kitten_id).await?.is_none() {
            fields.reject("kitten", does_not_exist(kitten_id));
        }
    }
    fields.finish()?;

    let rating = input
        .into_new()
        .ok_or_else(|| ApiError::validation_error("Invalid input", None))?;
    if state.store.find_rating(user.id, rating.kitten_id).await?.is_some() {
        return Err(ApiError::field(NON_FIELD_ERRORS, RATING_NOT_UNIQUE));
    }

    // A concurrent duplicate is caught by the store's unique constraint
    let created = state.store.create_rating(user.id, rating).await?;
    info!("User {} rated kitten {} with {}", user.username, created.kitten_id, created.score);
    Ok(ApiResponse::created(created.into()))
}
