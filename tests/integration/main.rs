//! HTTP integration tests
//!
//! These need a running server with a migrated database and a bootstrap superuser.
//! Run with: cargo test --test integration -- --ignored
//!
//! `DEVICE_HUB_TEST_URL`, `DEVICE_HUB_TEST_EMAIL` and `DEVICE_HUB_TEST_PASSWORD` override the
//! defaults below.

mod api_tests;
mod lending_tests;

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

pub fn base_url() -> String {
    std::env::var("DEVICE_HUB_TEST_URL").unwrap_or_else(|_| "http://localhost:5000/api".to_string())
}

pub fn url(path: &str) -> String {
    format!("{}{}", base_url(), path)
}

/// Suffix that keeps emails and serial numbers unique between runs
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Calendar date `offset` days from today, as sent on the wire
pub fn date(offset: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset)).to_string()
}

pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(url("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success(), "login failed for {}", email);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["data"]["token"].as_str().expect("No token in response").to_string()
}

pub async fn superuser_token(client: &Client) -> String {
    let email = std::env::var("DEVICE_HUB_TEST_EMAIL").unwrap_or_else(|_| "admin@devicehub.local".to_string());
    let password = std::env::var("DEVICE_HUB_TEST_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    login(client, &email, &password).await
}

/// Create an account with the given role and return (id, token)
pub async fn create_user(client: &Client, super_token: &str, role: &str) -> (i64, String) {
    let email = format!("{}@example.com", unique(role));
    let response = client
        .post(url("/users"))
        .bearer_auth(super_token)
        .json(&json!({
            "name": format!("Test {}", role),
            "email": email,
            "password": "secret123",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse user");
    let id = body["data"]["id"].as_i64().expect("No user id");
    (id, login(client, &email, "secret123").await)
}

pub async fn create_device(client: &Client, admin_token: &str) -> i64 {
    let response = client
        .post(url("/devices"))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": "ThinkPad X1 Carbon",
            "category": "laptop",
            "serial_number": unique("SN"),
            "price": "1899.00",
            "specs": { "cpu": "i7-1365U", "ram": "32GB" }
        }))
        .send()
        .await
        .expect("Failed to create device");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse device");
    body["data"]["id"].as_i64().expect("No device id")
}

pub async fn device_status(client: &Client, token: &str, device_id: i64) -> String {
    let body: Value = client
        .get(url(&format!("/devices/{}", device_id)))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get device")
        .json()
        .await
        .expect("Failed to parse device");
    body["data"]["status"].as_str().expect("No status").to_string()
}

/// Submit a borrow request and return the raw response
pub async fn borrow(client: &Client, token: &str, device_id: i64, start: i64, end: i64) -> reqwest::Response {
    client
        .post(url("/borrow"))
        .bearer_auth(token)
        .json(&json!({
            "device_id": device_id,
            "start_date": date(start),
            "end_date": date(end),
            "reason": "Client demo"
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

pub async fn set_borrow_status(client: &Client, token: &str, id: i64, status: &str) -> reqwest::Response {
    client
        .patch(url(&format!("/borrow/{}/status", id)))
        .bearer_auth(token)
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send status change")
}

/// Create a borrow request and drive it to active; returns its id
pub async fn active_loan(client: &Client, admin_token: &str, user_token: &str, device_id: i64) -> i64 {
    let response = borrow(client, user_token, device_id, 0, 4).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse borrow request");
    let id = body["data"]["id"].as_i64().expect("No borrow id");

    for status in ["approved", "active"] {
        let response = set_borrow_status(client, admin_token, id, status).await;
        assert_eq!(response.status(), 200, "transition to {}", status);
    }
    id
}
