use axum::{
    extract::Request,
    http::{header::ALLOW, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Router fallback for paths no route matches
pub async fn not_found_fallback() -> ApiError {
    ApiError::not_found("Not found.")
}

/// Give the router's bare 405 a JSON error body, keeping its `Allow` header
pub async fn json_method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let mut json = ApiError::method_not_allowed(&method).into_response();
    if let Some(allow) = response.headers().get(ALLOW) {
        json.headers_mut().insert(ALLOW, allow.clone());
    }
    json
}
