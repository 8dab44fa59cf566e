//! Video record and read-path tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use url::Url;

use tubely_models::{StorageReference, UserId};

use super::common::*;

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_and_list() {
    let app = TestApp::spawn(TestOptions::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/videos")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"title":"Boots","description":"first cut"}"#))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["title"], "Boots");
    assert_eq!(created["user_id"], app.user.to_string());
    assert!(created.get("video_url").is_none());

    // Someone else's video stays out of the listing
    app.seed_video(UserId::new()).await;

    let response = app.send(authed("GET", "/api/videos", &app.token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_requires_title() {
    let app = TestApp::spawn(TestOptions::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/videos")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"title":"   "}"#))
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_each_read_signs_a_fresh_url() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;
    let reference = StorageReference::new(TEST_BUCKET, "landscape/abc123.mp4");
    app.state
        .videos
        .update(&video.clone().with_storage_reference(&reference))
        .await
        .unwrap();

    let uri = format!("/api/videos/{}", video.id);
    let first = body_json(app.send(authed("GET", &uri, &app.token)).await).await;
    let second = body_json(app.send(authed("GET", &uri, &app.token)).await).await;

    let first = first["video_url"].as_str().unwrap().to_string();
    let second = second["video_url"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    let first = Url::parse(&first).unwrap();
    let second = Url::parse(&second).unwrap();
    assert_eq!(first.host_str(), second.host_str());
    assert_eq!(first.path(), "/landscape/abc123.mp4");
    assert_eq!(first.path(), second.path());
}

#[tokio::test]
async fn test_malformed_reference_reads_without_url() {
    let app = TestApp::spawn(TestOptions::default());
    let mut video = app.seed_video(app.user).await;
    video.video_url = Some("no-separator-here".to_string());
    app.state.videos.update(&video).await.unwrap();

    let response = app
        .send(authed("GET", &format!("/api/videos/{}", video.id), &app.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.get("video_url").is_none());
}

#[tokio::test]
async fn test_get_enforces_ownership() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(UserId::new()).await;
    let uri = format!("/api/videos/{}", video.id);

    let response = app.send(authed("GET", &uri, &app.token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let owner_token = app.token_for(video.user_id);
    let response = app.send(authed("GET", &uri, &owner_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_missing_and_malformed() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app
        .send(authed(
            "GET",
            "/api/videos/550e8400-e29b-41d4-a716-446655440000",
            &app.token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(authed("GET", "/api/videos/nope", &app.token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;
    let uri = format!("/api/videos/{}", video.id);

    let response = app.send(authed("DELETE", &uri, &app.token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(authed("GET", &uri, &app.token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
