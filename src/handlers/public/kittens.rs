// handlers/public/kittens.rs - anonymous kitten reads

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    http::Uri,
};

use crate::api::KittenView;
use crate::app::AppState;
use crate::filter::{KittenFilter, Page, PageRequest};
use crate::handlers::{not_found, parse_id};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Breed name terms, split on whitespace and commas
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListQuery {
    /// Never fails: unknown keys are ignored and a repeated key keeps its last value
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "search" => &mut query.search,
                "page" => &mut query.page,
                "page_size" => &mut query.page_size,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        query
    }
}

async fn page_of(state: &AppState, filter: KittenFilter, query: &ListQuery, uri: &Uri) -> ApiResult<Page<KittenView>> {
    let request = PageRequest::from_params(query.page.as_deref(), query.page_size.as_deref(), &state.api)?;
    let listing = state.store.list_kittens(&filter, request.window()).await?;
    Ok(ApiResponse::success(Page::build(request, listing, uri)?))
}

/// GET /kittens/ - Paginated kittens, optionally searched by breed name
pub async fn list(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    uri: Uri,
) -> ApiResult<Page<KittenView>> {
    let query = ListQuery::from_raw(raw.as_deref());
    let filter = KittenFilter::from_search(query.search.as_deref());
    page_of(&state, filter, &query, &uri).await
}

/// GET /kittens/:id/ - One kitten
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<KittenView> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let kitten = state.store.find_kitten(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(kitten.into()))
}

/// GET /kittens/breed/:breed_name/ - Kittens of one breed, matched case-insensitively.
///
/// Unknown breeds give an empty page; `search` is not applied here.
pub async fn by_breed(
    State(state): State<AppState>,
    breed_name: Result<Path<String>, PathRejection>,
    RawQuery(raw): RawQuery,
    uri: Uri,
) -> ApiResult<Page<KittenView>> {
    let Path(breed_name) = breed_name?;
    let query = ListQuery::from_raw(raw.as_deref());
    page_of(&state, KittenFilter::BreedNamed(breed_name), &query, &uri).await
}
