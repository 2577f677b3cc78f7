//! Borrow, renewal and return workflows against a live server

use reqwest::Client;
use serde_json::{json, Value};

use super::{
    active_loan, borrow, create_device, create_user, date, device_status, set_borrow_status,
    superuser_token, url,
};

async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    body["error"].as_str().unwrap_or_default().to_string()
}

async fn data_id(response: reqwest::Response) -> i64 {
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test integration -- --ignored
async fn test_borrow_lifecycle_moves_device_status() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, admin_token) = create_user(&client, &super_token, "admin").await;
    let (_, user_token) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &admin_token).await;

    let response = borrow(&client, &user_token, device_id, 1, 5).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_i64().unwrap();

    // Regular users cannot decide requests
    let response = set_borrow_status(&client, &user_token, id, "approved").await;
    assert_eq!(response.status(), 403);

    assert_eq!(set_borrow_status(&client, &admin_token, id, "approved").await.status(), 200);
    assert_eq!(device_status(&client, &admin_token, device_id).await, "available");

    assert_eq!(set_borrow_status(&client, &admin_token, id, "active").await.status(), 200);
    assert_eq!(device_status(&client, &admin_token, device_id).await, "borrowed");

    assert_eq!(set_borrow_status(&client, &admin_token, id, "returned").await.status(), 200);
    assert_eq!(device_status(&client, &admin_token, device_id).await, "available");

    // Terminal states stay put
    let response = set_borrow_status(&client, &admin_token, id, "active").await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_TRANSITION");
}

#[tokio::test]
#[ignore]
async fn test_pending_cannot_skip_approval() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let device_id = create_device(&client, &super_token).await;

    let id = data_id(borrow(&client, &super_token, device_id, 1, 3).await).await;
    let response = set_borrow_status(&client, &super_token, id, "active").await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_TRANSITION");
}

#[tokio::test]
#[ignore]
async fn test_overlapping_booking_is_rejected() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, first) = create_user(&client, &super_token, "user").await;
    let (_, second) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &super_token).await;

    assert_eq!(borrow(&client, &first, device_id, 10, 14).await.status(), 201);

    let response = borrow(&client, &second, device_id, 12, 16).await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "BOOKING_CONFLICT");

    // Sharing a boundary day is still a conflict
    let response = borrow(&client, &second, device_id, 14, 18).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_adjacent_booking_is_allowed() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let device_id = create_device(&client, &super_token).await;

    assert_eq!(borrow(&client, &super_token, device_id, 10, 14).await.status(), 201);
    assert_eq!(borrow(&client, &super_token, device_id, 15, 18).await.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_rejected_request_frees_the_dates() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let device_id = create_device(&client, &super_token).await;

    let id = data_id(borrow(&client, &super_token, device_id, 20, 22).await).await;
    assert_eq!(set_borrow_status(&client, &super_token, id, "rejected").await.status(), 200);
    assert_eq!(borrow(&client, &super_token, device_id, 20, 22).await.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_date_range_rules() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let device_id = create_device(&client, &super_token).await;

    let response = borrow(&client, &super_token, device_id, 5, 3).await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_DATE_RANGE");

    // Same-day loans are allowed
    assert_eq!(borrow(&client, &super_token, device_id, 7, 7).await.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_unknown_device_is_not_found() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;

    let response = borrow(&client, &super_token, i32::MAX as i64, 1, 2).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_users_only_see_their_own_requests() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (first_id, first) = create_user(&client, &super_token, "user").await;
    let (second_id, _) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &super_token).await;

    assert_eq!(borrow(&client, &first, device_id, 1, 2).await.status(), 201);

    let response = client
        .get(url(&format!("/borrow/user/{}", second_id)))
        .bearer_auth(&first)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let body: Value = client
        .get(url("/borrow"))
        .bearer_auth(&first)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|item| item["user_id"].as_i64() == Some(first_id)));
}

#[tokio::test]
#[ignore]
async fn test_renewal_flow() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, user_token) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &super_token).await;
    let loan_id = active_loan(&client, &super_token, &user_token, device_id).await;

    let renew = |requested: i64| {
        client
            .post(url("/renewals"))
            .bearer_auth(&user_token)
            .json(&json!({
                "borrow_request_id": loan_id,
                "requested_end_date": date(requested),
                "reason": "Project extended"
            }))
            .send()
    };

    // Loan ends at day 4; a renewal must push the end later
    let response = renew(2).await.unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_DATE_RANGE");

    let response = renew(8).await.unwrap();
    assert_eq!(response.status(), 201);
    let renewal_id = data_id(response).await;

    let response = renew(9).await.unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "DUPLICATE_PENDING");

    let response = client
        .patch(url(&format!("/renewals/{}/status", renewal_id)))
        .bearer_auth(&user_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .patch(url(&format!("/renewals/{}/status", renewal_id)))
        .bearer_auth(&super_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = client
        .get(url(&format!("/borrow/{}", loan_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["end_date"], date(8));

    // Resolved renewals no longer block a new one
    assert_eq!(renew(12).await.unwrap().status(), 201);
    assert_eq!(renew(10).await.unwrap().status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_renewal_needs_active_loan() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let device_id = create_device(&client, &super_token).await;
    let id = data_id(borrow(&client, &super_token, device_id, 1, 3).await).await;

    let response = client
        .post(url("/renewals"))
        .bearer_auth(&super_token)
        .json(&json!({ "borrow_request_id": id, "requested_end_date": date(6) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_STATE");
}

#[tokio::test]
#[ignore]
async fn test_damaged_return_sends_device_to_maintenance() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, user_token) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &super_token).await;
    let loan_id = active_loan(&client, &super_token, &user_token, device_id).await;

    let submit = || {
        client
            .post(url("/returns"))
            .bearer_auth(&user_token)
            .json(&json!({
                "borrow_request_id": loan_id,
                "device_condition": "damaged",
                "notes": "Cracked hinge"
            }))
            .send()
    };

    let response = submit().await.unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["return_date"], date(0));

    assert_eq!(device_status(&client, &super_token, device_id).await, "maintenance");

    let body: Value = client
        .get(url(&format!("/borrow/{}", loan_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "returned");

    // Second return of the same loan fails
    let response = submit().await.unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "INVALID_STATE");
}

#[tokio::test]
#[ignore]
async fn test_good_return_makes_device_available() {
    let client = Client::new();
    let super_token = superuser_token(&client).await;
    let (_, user_token) = create_user(&client, &super_token, "user").await;
    let device_id = create_device(&client, &super_token).await;
    let loan_id = active_loan(&client, &super_token, &user_token, device_id).await;

    let response = client
        .post(url("/returns"))
        .bearer_auth(&user_token)
        .json(&json!({ "borrow_request_id": loan_id, "device_condition": "good" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(device_status(&client, &super_token, device_id).await, "available");
}
