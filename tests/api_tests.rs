//! API integration tests
//!
//! These run against a live server with a fresh database:
//! `cargo run` then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

/// Helper to get an access token for the bootstrap user
async fn get_access_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/api/token", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send token request");

    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access"].as_str().expect("No access token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_token_pair_and_refresh() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/token", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());

    let response = client
        .post(format!("{}/api/token/refresh", BASE_URL))
        .json(&json!({ "refresh": body["refresh"] }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_token_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/token", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_author_crud() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    // Create
    let response = client
        .post(format!("{}/api/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Ursula K. Le Guin",
            "bio": "American author"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let author_id = body["id"].as_i64().expect("No author ID");

    // Update
    let response = client
        .put(format!("{}/api/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "bio": "American speculative fiction author" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    // Delete
    let response = client
        .delete(format!("{}/api/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/api/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

/// End-to-end borrow/return flow: create author + 1-copy book, borrow it,
/// watch the second borrow fail, return it, watch copies come back.
#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    let response = client
        .post(format!("{}/api/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "A" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "B",
            "author_id": author["id"],
            "isbn": "1111111111111",
            "available_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["author_name"], "A");
    let book_id = book["id"].as_i64().unwrap();

    // Borrow
    let response = client
        .post(format!("{}/api/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let record: Value = response.json().await.unwrap();
    assert_eq!(record["borrowed_by"], "admin");
    assert_eq!(record["book_title"], "B");
    assert!(record["return_date"].is_null());

    // Copies now 0
    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], 0);

    // Second borrow fails with 400
    let response = client
        .post(format!("{}/api/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No available copies of this book.");

    // Return
    let response = client
        .put(format!(
            "{}/api/borrow/{}/return",
            BASE_URL,
            record["id"].as_i64().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let returned: Value = response.json().await.unwrap();
    assert!(returned["return_date"].is_string());

    // Second return fails with 404
    let response = client
        .put(format!(
            "{}/api/borrow/{}/return",
            BASE_URL,
            record["id"].as_i64().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // Copies back to 1
    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available_copies"], 1);

    // Cleanup
    let _ = client
        .delete(format!("{}/api/authors/{}", BASE_URL, author["id"]))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_book() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    let response = client
        .post(format!("{}/api/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book": 999999 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_report_generation_and_latest() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    let response = client
        .post(format!("{}/api/reports/generate", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 202);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["task_id"].is_string());

    // The job runs out-of-band; give the worker a moment.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let response = client
        .get(format!("{}/api/reports/latest", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_authors"].is_number());
    assert!(body["total_books"].is_number());
    assert!(body["total_books_borrowed"].is_number());
    assert!(body["timestamp"].is_string());
}
