mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn kitten(app: &TestApp, token: &str) -> Value {
    let breed = app.breed("Siamese").await;
    let (status, kitten) = app
        .post(
            "/kittens/",
            Some(token),
            json!({"breed_id": breed.id, "color": "Blue", "age": 3, "description": "Calm"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    kitten
}

#[tokio::test]
async fn ratings_require_authentication() {
    let app = TestApp::new();

    let (status, _) = app.get("/ratings/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/ratings/", None, json!({"kitten": 1, "score": 5})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rating_is_attributed_to_the_caller() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let (_, bob) = app.user("bob").await;
    let kitten = kitten(&app, &alice).await;

    let (status, rating) = app
        .post("/ratings/", Some(&bob), json!({"kitten": kitten["id"], "score": 5, "user": "alice"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rating["user"], "bob");
    assert_eq!(rating["kitten"], kitten["id"]);
    assert_eq!(rating["score"], 5);

    let (status, list) = app.get("/ratings/", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([rating]));
}

#[tokio::test]
async fn second_rating_for_the_same_kitten_fails() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let kitten = kitten(&app, &alice).await;

    let (status, _) = app
        .post("/ratings/", Some(&alice), json!({"kitten": kitten["id"], "score": 5}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/ratings/", Some(&alice), json!({"kitten": kitten["id"], "score": 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["field_errors"]["non_field_errors"],
        "The fields user, kitten must make a unique set."
    );

    let (_, list) = app.get("/ratings/", Some(&alice)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["score"], 5);
}

#[tokio::test]
async fn rating_field_errors() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let kitten = kitten(&app, &alice).await;

    let (status, body) = app.post("/ratings/", Some(&alice), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["kitten"], "This field is required.");
    assert_eq!(body["field_errors"]["score"], "This field is required.");

    let (_, body) = app
        .post("/ratings/", Some(&alice), json!({"kitten": 999, "score": -1}))
        .await;
    assert_eq!(body["field_errors"]["kitten"], "Invalid pk \"999\" - object does not exist.");
    assert_eq!(body["field_errors"]["score"], "Ensure this value is greater than or equal to 0.");

    let (_, body) = app
        .post("/ratings/", Some(&alice), json!({"kitten": "abc", "score": 32768}))
        .await;
    assert_eq!(body["field_errors"]["kitten"], "Incorrect type. Expected pk value, received string.");
    assert_eq!(body["field_errors"]["score"], "Ensure this value is less than or equal to 32767.");

    let (status, _) = app
        .post("/ratings/", Some(&alice), json!({"kitten": kitten["id"], "score": 32767}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}
