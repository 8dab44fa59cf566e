//! Upload pipeline tests.

use axum::http::{header, StatusCode};
use url::Url;

use tubely_media::VideoGeometry;
use tubely_models::UserId;

use super::common::*;

/// Key of the single object in the store.
fn only_key(app: &TestApp) -> String {
    let objects = app.store.objects();
    assert_eq!(objects.len(), 1, "expected exactly one stored object");
    objects[0].key.clone()
}

#[tokio::test]
async fn test_landscape_upload_round_trip() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;
    let payload = sample_video();

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &payload),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    // Stored under the landscape prefix with a 43-character token
    let objects = app.store.objects();
    assert_eq!(objects.len(), 1);
    let object = &objects[0];
    assert_eq!(object.bucket, TEST_BUCKET);
    assert_eq!(object.content_type, "video/mp4");
    assert_eq!(object.body, payload);

    let (prefix, file) = object.key.split_once('/').unwrap();
    assert_eq!(prefix, "landscape");
    let (token, ext) = file.rsplit_once('.').unwrap();
    assert_eq!(ext, "mp4");
    assert_eq!(token.len(), 43);
    assert!(token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));

    // The record keeps the reference, the response carries a signed URL
    let stored = app.stored_video(&video).await;
    assert_eq!(
        stored.video_url.as_deref(),
        Some(format!("{TEST_BUCKET},{}", object.key).as_str())
    );

    let url = Url::parse(json["video_url"].as_str().unwrap()).unwrap();
    assert_eq!(url.path(), format!("/{}", object.key));
    assert!(url
        .query_pairs()
        .any(|(k, v)| k == "X-Amz-Expires" && v == "300"));
    assert_eq!(json["id"], video.id.to_string());

    assert_eq!(app.probe_calls(), 1);
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_aspect_prefixes() {
    let cases = [
        (VideoGeometry::new(1080, 1920), "portrait"),
        (VideoGeometry::new(1000, 1000), "other"),
        (VideoGeometry::new(1280, 720), "landscape"),
    ];

    for (geometry, expected) in cases {
        let app = TestApp::spawn(TestOptions {
            geometry,
            ..TestOptions::default()
        });
        let video = app.seed_video(app.user).await;

        let response = app
            .send(upload_request(
                &video.id.to_string(),
                &app.token,
                multipart_body("video", Some("video/mp4"), &sample_video()),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let key = only_key(&app);
        assert!(
            key.starts_with(&format!("{expected}/")),
            "{geometry:?} stored as {key}"
        );
    }
}

#[tokio::test]
async fn test_content_type_parameters_accepted() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("Video/MP4; codecs=\"avc1\""), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.objects()[0].content_type, "video/mp4");
}

#[tokio::test]
async fn test_reupload_gets_fresh_key() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    for _ in 0..2 {
        let response = app
            .send(upload_request(
                &video.id.to_string(),
                &app.token,
                multipart_body("video", Some("video/mp4"), &sample_video()),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let objects = app.store.objects();
    assert_eq!(objects.len(), 2);
    assert_ne!(objects[0].key, objects[1].key);

    let stored = app.stored_video(&video).await;
    assert_eq!(
        stored.video_url.as_deref(),
        Some(format!("{TEST_BUCKET},{}", objects[1].key).as_str())
    );
}

#[tokio::test]
async fn test_transcode_failure_skips_upload_and_metadata() {
    let app = TestApp::spawn(TestOptions {
        fail_faststart: true,
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "transcode_failed");
    assert_eq!(json["detail"], "Error processing video");

    assert!(app.store.objects().is_empty());
    assert!(app.stored_video(&video).await.video_url.is_none());
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_store_failure_leaves_record_untouched() {
    let app = TestApp::spawn(TestOptions {
        fail_put: true,
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "store_failed");

    assert_eq!(app.stored_video(&video).await, video);
    assert!(app.staging_is_empty());
    // Both the staged input and the remuxed output were created, then removed
    let seen = app.media.seen_paths.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|p| !p.exists()));
}

#[tokio::test]
async fn test_probe_failure_stops_before_remux() {
    let app = TestApp::spawn(TestOptions {
        fail_probe: true,
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "probe_failed");
    assert_eq!(json["detail"], "Error reading video dimensions");

    assert_eq!(app.probe_calls(), 1);
    assert_eq!(app.faststart_calls(), 0);
    assert!(app.store.objects().is_empty());
    assert_eq!(app.stored_video(&video).await, video);
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_persist_failure_orphans_object_and_cleans_up() {
    let app = TestApp::spawn(TestOptions {
        fail_update: true,
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "persist_failed");
    assert_eq!(json["detail"], "Couldn't update video");

    // The object was written before the record update failed
    only_key(&app);
    assert_eq!(app.stored_video(&video).await, video);
    assert!(app.staging_is_empty());
    let seen = app.media.seen_paths.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|p| !p.exists()));
}

#[tokio::test]
async fn test_non_owner_rejected_before_reading_body() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(UserId::new()).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "not_owner");

    assert_eq!(app.probe_calls(), 0);
    assert!(app.staging_is_empty());
    assert!(app.store.objects().is_empty());
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app
        .send(upload_request(
            "550e8400-e29b-41d4-a716-446655440000",
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_video_id_is_bad_request() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app
        .send(upload_request(
            "not-a-uuid",
            &app.token,
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            "not-a-jwt",
            multipart_body("video", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = upload_request(
        &video.id.to_string(),
        &app.token,
        multipart_body("video", Some("video/mp4"), &sample_video()),
    );
    request.headers_mut().remove(header::AUTHORIZATION);
    assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.probe_calls(), 0);
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", Some("video/quicktime"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "unsupported_media_type");
    assert_eq!(app.probe_calls(), 0);
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_missing_part_content_type() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("video", None, &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_content_type");
}

#[tokio::test]
async fn test_missing_video_field() {
    let app = TestApp::spawn(TestOptions::default());
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(
            &video.id.to_string(),
            &app.token,
            multipart_body("thumbnail", Some("video/mp4"), &sample_video()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "missing_field");
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_body_at_limit_is_accepted() {
    let body = multipart_body("video", Some("video/mp4"), &sample_video());
    let app = TestApp::spawn(TestOptions {
        max_upload_bytes: Some(body.len()),
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(&video.id.to_string(), &app.token, body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.objects().len(), 1);
}

#[tokio::test]
async fn test_body_over_limit_rejected_before_probe() {
    let body = multipart_body("video", Some("video/mp4"), &sample_video());
    let app = TestApp::spawn(TestOptions {
        max_upload_bytes: Some(body.len() - 1),
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let response = app
        .send(upload_request(&video.id.to_string(), &app.token, body))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "payload_too_large");

    assert_eq!(app.probe_calls(), 0);
    assert!(app.staging_is_empty());
    assert!(app.stored_video(&video).await.video_url.is_none());
}

#[tokio::test]
async fn test_declared_length_over_limit_rejected() {
    let body = multipart_body("video", Some("video/mp4"), &sample_video());
    let app = TestApp::spawn(TestOptions {
        max_upload_bytes: Some(1024),
        ..TestOptions::default()
    });
    let video = app.seed_video(app.user).await;

    let len = body.len();
    let mut request = upload_request(&video.id.to_string(), &app.token, body);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, len.to_string().parse().unwrap());

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.probe_calls(), 0);
}
