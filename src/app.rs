use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{ApiConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::{json_method_not_allowed, jwt_auth_middleware, not_found_fallback};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub api: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, api: ApiConfig) -> Self {
        Self {
            store,
            api: Arc::new(api),
        }
    }
}

/// Full HTTP surface with the global middleware stack
pub fn router(state: AppState, security: &SecurityConfig) -> Router {
    let body_limit = state.api.max_request_size_bytes;

    let mut app = Router::new()
        // Service
        .route("/", get(public::service::root))
        .route("/health", get(public::service::health))
        .merge(kitten_routes())
        .merge(breed_routes())
        .merge(rating_routes())
        .merge(account_routes())
        .fallback(not_found_fallback)
        .with_state(state)
        .layer(middleware::from_fn(json_method_not_allowed))
        .layer(middleware::from_fn(jwt_auth_middleware))
        .layer(DefaultBodyLimit::max(body_limit));

    if security.enable_cors {
        app = app.layer(cors_layer(security));
    }

    app.layer(TraceLayer::new_for_http())
}

fn kitten_routes() -> Router<AppState> {
    Router::new()
        .route("/kittens/", get(public::kittens::list).post(protected::kittens::create))
        .route("/kittens/breed/:breed_name/", get(public::kittens::by_breed))
        .route(
            "/kittens/:id/",
            get(public::kittens::show)
                .put(protected::kittens::update)
                .patch(protected::kittens::partial_update)
                .delete(protected::kittens::delete),
        )
}

fn breed_routes() -> Router<AppState> {
    Router::new()
        .route("/breeds/", get(public::breeds::list))
        .route("/breeds/:id/", get(public::breeds::show))
}

fn rating_routes() -> Router<AppState> {
    Router::new().route("/ratings/", get(protected::ratings::list).post(protected::ratings::create))
}

fn account_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/register/", post(public::register::register))
        .route("/token/", post(public::token::obtain))
        .route("/token/refresh/", post(public::token::refresh))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
