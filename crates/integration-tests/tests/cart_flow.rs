//! End-to-end cart flow tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data applied
//! - The storefront server running (cargo run -p meeplemart-storefront)
//!
//! Run with: cargo test -p meeplemart-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront API (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with its own cookie jar (its own session).
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Pick a seeded game with stock of at least `min_stock`, returning
/// `(id, price_string, stock)`.
async fn any_game(client: &Client, min_stock: i64) -> (i64, String, i64) {
    let games: Vec<Value> = client
        .get(format!("{}/games", base_url()))
        .send()
        .await
        .expect("list games")
        .json()
        .await
        .expect("parse games");

    let game = games
        .iter()
        .find(|g| g["stock"].as_i64().unwrap_or(0) >= min_stock)
        .expect("seeded game with enough stock");

    (
        game["id"].as_i64().expect("game id"),
        game["price"].as_str().expect("game price").to_string(),
        game["stock"].as_i64().expect("game stock"),
    )
}

/// Register a throwaway account and log in, keeping the session cookie.
async fn register_and_login(client: &Client, tag: &str) {
    let email = format!("it-{tag}-{}@example.com", std::process::id());
    let password = "integration-test-pw";

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("register");
    assert!(
        resp.status() == StatusCode::CREATED || resp.status() == StatusCode::CONFLICT,
        "unexpected register status: {}",
        resp.status()
    );

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
}

/// The guest session's cart token, dug out of the add-item response's cart.
/// The API never returns the raw token, so tests mint their own guest
/// identity by adding an item and then read the cart list to confirm.
async fn guest_add(client: &Client, game_id: i64, quantity: i64) -> reqwest::Response {
    client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "game_id": game_id, "quantity": quantity }))
        .send()
        .await
        .expect("add item")
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("health");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_guest_add_item_lists_it_with_line_total() {
    let client = client();
    let (game_id, price, _) = any_game(&client, 2).await;

    let resp = guest_add(&client, game_id, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = resp.json().await.expect("item body");
    assert_eq!(item["quantity"], 2);
    assert_eq!(item["game"]["price"], Value::String(price));

    let items: Vec<Value> = client
        .get(format!("{}/cart/items", base_url()))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("items");
    assert_eq!(items.len(), 1);

    // clean up the guest cart
    let resp = client
        .delete(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("clear");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_add_over_stock_is_rejected_with_available() {
    let client = client();
    let (game_id, _, stock) = any_game(&client, 1).await;

    let resp = guest_add(&client, game_id, stock + 1).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert!(
        body["detail"]
            .as_str()
            .expect("detail")
            .contains(&stock.to_string()),
        "available stock should be surfaced: {body}"
    );

    // failed add must not have created a cart
    let resp = client
        .delete(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("clear");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_update_to_zero_deletes_item() {
    let client = client();
    let (game_id, _, _) = any_game(&client, 2).await;

    let resp = guest_add(&client, game_id, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = resp.json().await.expect("item");
    let item_id = item["id"].as_i64().expect("item id");

    let resp = client
        .patch(format!("{}/cart/items/{item_id}", base_url()))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let items: Vec<Value> = client
        .get(format!("{}/cart/items", base_url()))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("items");
    assert!(items.is_empty());

    let _ = client.delete(format!("{}/cart", base_url())).send().await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_duplicate_add_conflicts() {
    let client = client();
    let (game_id, _, _) = any_game(&client, 2).await;

    assert_eq!(guest_add(&client, game_id, 1).await.status(), StatusCode::CREATED);
    assert_eq!(guest_add(&client, game_id, 1).await.status(), StatusCode::CONFLICT);

    let _ = client.delete(format!("{}/cart", base_url())).send().await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_merge_without_guest_cart_is_404() {
    let client = client();
    register_and_login(&client, "merge404").await;

    let resp = client
        .post(format!("{}/cart/merge", base_url()))
        .json(&json!({ "old_session_id": "no-such-guest-token" }))
        .send()
        .await
        .expect("merge");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_merge_requires_old_session_id() {
    let client = client();
    register_and_login(&client, "mergefield").await;

    let resp = client
        .post(format!("{}/cart/merge", base_url()))
        .json(&json!({}))
        .send()
        .await
        .expect("merge");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
