mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;

#[tokio::test]
async fn root_describes_the_service() {
    let app = TestApp::new();
    let (status, body) = app.get("/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Kitten Rating API");
    assert!(body["endpoints"]["kittens"].is_string());
}

#[tokio::test]
async fn health_checks_the_store() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected_even_on_public_routes() {
    let app = TestApp::new();
    let (status, body) = app.get("/breeds/", Some("not-a-jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn refresh_token_cannot_authenticate_requests() {
    let app = TestApp::new();
    let (user, _) = app.user("alice").await;
    let pair = kitten_rating_api::auth::issue_token_pair(user.id, &user.username).unwrap();

    let (status, _) = app.get("/ratings/", Some(&pair.refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/ratings/", Some(&pair.access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/kittens/")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_answer_with_a_json_404() {
    let app = TestApp::new();

    for uri in ["/nope/", "/kittens/1/extra/", "/kittens"] {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn wrong_method_is_a_json_405_with_allow_header() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let (status, body) = app.request(Method::DELETE, "/ratings/", Some(&token), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    assert_eq!(body["message"], "Method \"DELETE\" not allowed.");

    let request = axum::http::Request::builder()
        .method(Method::PUT)
        .uri("/breeds/")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response.headers().get("allow").unwrap().to_str().unwrap();
    assert!(allow.contains("GET"));
    assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
}
