mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn breeds_are_listed_in_id_order() {
    let app = TestApp::new();
    let siamese = app.breed("Siamese").await;
    let persian = app.breed("Persian").await;

    let (status, body) = app.get("/breeds/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": siamese.id, "name": "Siamese"},
            {"id": persian.id, "name": "Persian"}
        ])
    );
}

#[tokio::test]
async fn breed_detail_and_missing_breeds() {
    let app = TestApp::new();
    let siamese = app.breed("Siamese").await;

    let (status, body) = app.get(&format!("/breeds/{}/", siamese.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": siamese.id, "name": "Siamese"}));

    let (status, _) = app.get("/breeds/999/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/breeds/siamese/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn breeds_are_read_only() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let (status, _) = app.post("/breeds/", Some(&token), json!({"name": "Sphynx"})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (_, body) = app.get("/breeds/", None).await;
    assert_eq!(body, json!([]));
}
