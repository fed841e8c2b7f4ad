// tests/api_tests.rs

use blog_api::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345"), or `None` when no
/// test database is configured, in which case the test is skipped.
async fn spawn_app() -> Option<String> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return None;
    };

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
    };

    let state = AppState { pool, config };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(address)
}

fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn root_route_is_live() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "API is running...");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "confirmPassword": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], email);
    // The password hash must never appear in any client-facing payload.
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "email": unique_email() }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "confirmPassword": "password456"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);

    // The mismatch is rejected before any write: the email must still be free,
    // so logging in with it reports invalid credentials.
    let login = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(login.status().as_u16(), 401);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": unique_email(),
            "password": "pass",
            "confirmPassword": "pass"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_duplicate_email_with_400() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    for expected_status in [201, 400] {
        let response = client
            .post(&format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "email": email,
                "password": "password123",
                "confirmPassword": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        // Duplicates map to 400 in this API, not 409.
        assert_eq!(response.status().as_u16(), expected_status);
    }
}

#[tokio::test]
async fn register_normalizes_email_case() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();
    let shouty = format!("  {} ", email.to_uppercase());

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": shouty,
            "password": "password123",
            "confirmPassword": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], email);

    // Login with the lowercase form reaches the same account.
    let login = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(login.status().as_u16(), 200);
}

#[tokio::test]
async fn login_works() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "confirmPassword": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    let response = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], email);
}

#[tokio::test]
async fn login_failure_does_not_reveal_which_field_was_wrong() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "confirmPassword": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    let wrong_password = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");

    let unknown_email = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": unique_email(), "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);

    let body_a: serde_json::Value = wrong_password.json().await.unwrap();
    let body_b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn me_requires_token() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/me", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn me_rejects_invalid_token() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/me", address))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn me_returns_current_profile() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let email = unique_email();

    let register: serde_json::Value = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "confirmPassword": "password123"
        }))
        .send()
        .await
        .expect("Register failed")
        .json()
        .await
        .unwrap();

    let token = register["token"].as_str().unwrap();

    let response = client
        .get(&format!("{}/api/auth/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], email);
    assert_eq!(body["articles_count"], 0);
    assert!(body.get("password").is_none());
}
