//! Authentication, health and envelope tests

use reqwest::Client;
use serde_json::{json, Value};

use super::{create_user, superuser_token, url};

#[tokio::test]
#[ignore] // Run with: cargo test --test integration -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client.get(url("/ready")).send().await.expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_bearer_token() {
    let client = Client::new();
    let token = superuser_token(&client).await;

    let response = client
        .get(url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["role"], "superuser");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(url("/auth/login"))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "NOT_AUTHENTICATED");
}

#[tokio::test]
#[ignore]
async fn test_deactivated_user_cannot_log_in() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (user_id, _) = create_user(&client, &super_token, "user").await;

    let response = client
        .put(url(&format!("/users/{}", user_id)))
        .bearer_auth(&super_token)
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    let email = body["data"]["email"].as_str().unwrap().to_string();

    let response = client
        .post(url("/auth/login"))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    for path in ["/devices", "/borrow", "/renewals", "/returns", "/users"] {
        let response = client.get(url(path)).send().await.expect("Failed to send request");
        assert_eq!(response.status(), 401, "{}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_malformed_json_gets_envelope() {
    let client = Client::new();
    let token = superuser_token(&client).await;

    let response = client
        .post(url("/devices"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BAD_VALUE");
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_create_admin() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, admin_token) = create_user(&client, &super_token, "admin").await;

    let response = client
        .post(url("/users"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Second Admin",
            "email": format!("{}@example.com", super::unique("admin2")),
            "password": "secret123",
            "role": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_reset_password_is_superuser_only() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, admin_token) = create_user(&client, &super_token, "admin").await;
    let (user_id, _) = create_user(&client, &super_token, "user").await;

    let path = format!("/users/{}/reset-password", user_id);
    let response = client
        .post(url(&path))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(url(&path))
        .bearer_auth(&super_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["temporary_password"].as_str().unwrap().len(), 12);
}
