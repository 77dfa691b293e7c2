// handlers/public/breeds.rs - read-only breed catalogue

use axum::extract::{rejection::PathRejection, Path, State};

use crate::api::BreedView;
use crate::app::AppState;
use crate::handlers::{not_found, parse_id};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /breeds/ - Every breed, ordered by id
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<BreedView>> {
    let breeds = state.store.list_breeds().await?;
    Ok(ApiResponse::success(breeds.into_iter().map(BreedView::from).collect()))
}

/// GET /breeds/:id/ - One breed
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<BreedView> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let breed = state.store.find_breed(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(breed.into()))
}
