mod common;

use auth::TokenSigner;
use chirpy_service::config::Platform;
use chirpy_service::session::models::RotationPolicy;
use chrono::Duration;
use chrono::Utc;
use common::test_config;
use common::TestApp;
use common::JWT_SECRET;
use common::PASSWORD;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_login_returns_user_and_tokens() {
    let app = TestApp::spawn().await;
    app.create_user("walt@breaking.bad", PASSWORD).await;

    let response = app.login("Walt@Breaking.Bad", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["data"]["email"], "walt@breaking.bad");
    assert_eq!(body["data"]["is_chirpy_red"], false);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"]["updated_at"].is_string());
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["refresh_token"].as_str().unwrap().len(), 64);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_failures_look_identical() {
    let app = TestApp::spawn().await;
    app.create_user("walt@breaking.bad", PASSWORD).await;

    let wrong_password = app.login("walt@breaking.bad", "wrong").await;
    let unknown_email = app.login("jesse@breaking.bad", PASSWORD).await;
    let empty_password = app.login("walt@breaking.bad", "").await;

    let mut bodies = Vec::new();
    for response in [wrong_password, unknown_email, empty_password] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await.expect("Failed to parse response");
        bodies.push(body);
    }

    assert_eq!(bodies[0]["data"]["message"], "Incorrect email or password");
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn test_protected_endpoint_requires_bearer_token() {
    let app = TestApp::spawn().await;

    let missing = app
        .post("/api/chirps")
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("Failed to execute request");
    let wrong_scheme = app
        .post("/api/chirps")
        .header("Authorization", "Basic d2FsdDpwYXNz")
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("Failed to execute request");
    let garbage = app
        .post("/api/chirps")
        .bearer_auth("not-a-jwt")
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    let mut bodies = Vec::new();
    for response in [missing, wrong_scheme, garbage] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await.expect("Failed to parse response");
        bodies.push(body);
    }

    assert_eq!(bodies[0]["data"]["message"], "Unauthorized");
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn test_foreign_and_expired_access_tokens_are_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register_and_login("walt@breaking.bad").await;

    let foreign = TokenSigner::new(
        b"another-secret-key-that-is-also-32-bytes-long",
        "chirpy-access",
        Duration::hours(1),
    )
    .issue(&user.id, Utc::now())
    .unwrap();

    let expired = TokenSigner::new(JWT_SECRET.as_bytes(), "chirpy-access", Duration::hours(1))
        .issue(&user.id, Utc::now() - Duration::hours(2))
        .unwrap();

    let wrong_issuer = TokenSigner::new(JWT_SECRET.as_bytes(), "someone-else", Duration::hours(1))
        .issue(&user.id, Utc::now())
        .unwrap();

    for token in [foreign, expired, wrong_issuer] {
        let response = app.create_chirp(&token, "hello").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.create_chirp(&user.token, "hello").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::spawn().await;
    let user = app.register_and_login("walt@breaking.bad").await;

    let response = app.create_chirp(&user.refresh_token, "hello").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post("/api/refresh")
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::spawn().await;
    let user = app.register_and_login("walt@breaking.bad").await;

    let response = app
        .post("/api/refresh")
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].get("refresh_token").is_none());

    let token = body["data"]["token"].as_str().unwrap();
    let response = app.create_chirp(token, "refreshed").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Reuse policy: the same refresh token keeps working.
    let again = app
        .post("/api/refresh")
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_and_missing_tokens() {
    let app = TestApp::spawn().await;

    let unknown = app
        .post("/api/refresh")
        .bearer_auth("deadbeef")
        .send()
        .await
        .expect("Failed to execute request");
    let missing = app
        .post("/api/refresh")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_then_refresh_fails() {
    let app = TestApp::spawn().await;
    let user = app.register_and_login("walt@breaking.bad").await;

    for _ in 0..2 {
        let response = app
            .post("/api/revoke")
            .bearer_auth(&user.refresh_token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .post("/api/refresh")
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Access tokens already issued stay valid until they expire.
    let response = app.create_chirp(&user.token, "still here").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_revoke_unknown_token_succeeds_but_missing_header_does_not() {
    let app = TestApp::spawn().await;

    let unknown = app
        .post("/api/revoke")
        .bearer_auth("never-issued")
        .send()
        .await
        .expect("Failed to execute request");
    let missing = app
        .post("/api/revoke")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(unknown.status(), StatusCode::NO_CONTENT);
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotation_policy_replaces_refresh_token() {
    let app = TestApp::spawn_with(test_config(Platform::Dev, RotationPolicy::Rotate)).await;
    let user = app.register_and_login("walt@breaking.bad").await;

    let response = app
        .post("/api/refresh")
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, user.refresh_token);

    let old = app
        .post("/api/refresh")
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app
        .post("/api/refresh")
        .bearer_auth(&rotated)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_rotation_grants_one_session() {
    let app = TestApp::spawn_with(test_config(Platform::Dev, RotationPolicy::Rotate)).await;
    let user = app.register_and_login("walt@breaking.bad").await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            tokio::spawn(
                app.post("/api/refresh")
                    .bearer_auth(&user.refresh_token)
                    .send(),
            )
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        let response = handle.await.unwrap().expect("Failed to execute request");
        match response.status() {
            StatusCode::OK => granted += 1,
            status => assert_eq!(status, StatusCode::UNAUTHORIZED),
        }
    }

    assert_eq!(granted, 1);
}
