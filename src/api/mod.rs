//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the Furever backend:
//! - Auth endpoints (signup, login, logout)
//! - Pet endpoints (registration, listing)
//! - Comment and like endpoints
//!
//! Protected routes sit behind the bearer-token middleware; everything
//! else is public.

pub mod auth;
pub mod comments;
pub mod middleware;
pub mod pets;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthIdentity};

/// Build the API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Protected routes (require a valid bearer token)
    let protected_routes = Router::new()
        .route("/pets", get(pets::list_pets).post(pets::create_pet))
        .route("/comment", post(comments::create_comment))
        .route("/like", post(comments::like).delete(comments::unlike))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = if cors_origin == "*" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .merge(build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// End-to-end tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCommentRepository, SqlxPetRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::token::{Authenticator, JwtAuthenticator};
    use crate::services::{CommentService, PetService, UserService};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const TEST_SECRET: &str = "e2e-secret";

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let tokens = Arc::new(JwtAuthenticator::new(TEST_SECRET, 3600 * 24));
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let pet_repo = SqlxPetRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        let state = AppState {
            user_service: Arc::new(UserService::new(user_repo.clone(), tokens.clone())),
            pet_service: Arc::new(PetService::new(
                pet_repo.clone(),
                user_repo,
                comment_repo.clone(),
            )),
            comment_service: Arc::new(CommentService::new(comment_repo, pet_repo)),
            authenticator: tokens,
        };

        TestServer::new(build_router(state, "*")).expect("Failed to start test server")
    }

    async fn signup(server: &TestServer, email: &str, username: &str) -> (String, i64) {
        let response = server
            .post("/signup")
            .json(&json!({
                "email": email,
                "username": username,
                "password": "password123",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);

        let token = body["token"].as_str().expect("token missing").to_string();
        let user_id = body["user"]["id"].as_i64().expect("user id missing");
        (token, user_id)
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    async fn register_pet(server: &TestServer, token: &str, name: &str) -> i64 {
        let response = server
            .post("/pets")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({
                "name": name,
                "deathDate": "2023-05-17",
                "favorites": ["tennis ball", "naps"],
                "image": "https://img.example/pet.jpg",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        body["pet"]["id"].as_i64().expect("pet id missing")
    }

    // ========================================================================
    // Auth endpoints
    // ========================================================================

    #[tokio::test]
    async fn test_signup_returns_user_and_verifiable_token() {
        let server = test_server().await;

        let response = server
            .post("/signup")
            .json(&json!({
                "email": "momo@example.com",
                "username": "momo",
                "password": "password123",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["user"]["email"], "momo@example.com");
        // The hash never leaves the server
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["user"].get("password_hash").is_none());

        let verifier = JwtAuthenticator::new(TEST_SECRET, 3600 * 24);
        let identity = verifier
            .verify(body["token"].as_str().unwrap())
            .expect("Signup token should verify against the shared secret");
        assert_eq!(identity.username, "momo");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflict() {
        let server = test_server().await;
        signup(&server, "same@example.com", "momo").await;

        let response = server
            .post("/signup")
            .json(&json!({
                "email": "same@example.com",
                "username": "other",
                "password": "password456",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("already registered"));
    }

    #[tokio::test]
    async fn test_login_returns_scheme_prefixed_token() {
        let server = test_server().await;
        signup(&server, "momo@example.com", "momo").await;

        let response = server
            .post("/login")
            .json(&json!({
                "email": "momo@example.com",
                "password": "password123",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["username"], "momo");
        assert_eq!(body["payload"]["email"], "momo@example.com");

        let token = body["token"].as_str().unwrap();
        assert!(token.starts_with("Bearer "));

        // The part after the scheme label decodes with the shared secret
        let verifier = JwtAuthenticator::new(TEST_SECRET, 3600 * 24);
        let identity = verifier
            .verify(token.trim_start_matches("Bearer "))
            .expect("Login token should verify");
        assert_eq!(identity.username, "momo");
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let server = test_server().await;
        signup(&server, "momo@example.com", "momo").await;

        let response = server
            .post("/login")
            .json(&json!({
                "email": "momo@example.com",
                "password": "wrongpassword",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email_rejected() {
        let server = test_server().await;

        let response = server
            .post("/login")
            .json(&json!({
                "email": "nobody@example.com",
                "password": "password123",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_logout_acknowledges() {
        let server = test_server().await;

        let response = server.get("/logout").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "logout");
    }

    // ========================================================================
    // Token middleware
    // ========================================================================

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let server = test_server().await;

        let response = server.get("/pets").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = server
            .post("/comment")
            .json(&json!({"comment": "hi", "petId": 1}))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let server = test_server().await;

        let response = server
            .get("/pets")
            .add_header(header::AUTHORIZATION, bearer("not.a.token"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_rejected() {
        let server = test_server().await;

        let forged = JwtAuthenticator::new("other-secret", 3600 * 24)
            .issue(1, "momo")
            .expect("Failed to issue token");

        let response = server
            .get("/pets")
            .add_header(header::AUTHORIZATION, bearer(&forged))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    // ========================================================================
    // Pet endpoints
    // ========================================================================

    #[tokio::test]
    async fn test_create_pet_owned_by_caller() {
        let server = test_server().await;
        let (token, user_id) = signup(&server, "momo@example.com", "momo").await;

        let response = server
            .post("/pets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "name": "Mochi",
                "deathDate": "2023-05-17",
                "favorites": ["tennis ball"],
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["pet"]["name"], "Mochi");
        // Ownership comes from the token, not the request body
        assert_eq!(body["pet"]["ownerId"].as_i64().unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_create_pet_duplicate_name_conflict() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;
        register_pet(&server, &token, "Mochi").await;

        let response = server
            .post("/pets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "name": "Mochi",
                "deathDate": "2024-01-01",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);

        // The second record was not persisted
        let response = server
            .get("/pets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["pets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_pets_empty_store_not_found() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;

        let response = server
            .get("/pets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_list_pets_expands_owner_and_comment_authors() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;
        let pet_id = register_pet(&server, &token, "Mochi").await;

        // A second user comments on the profile
        let (friend_token, _) = signup(&server, "ana@example.com", "ana").await;
        let response = server
            .post("/comment")
            .add_header(header::AUTHORIZATION, bearer(&friend_token))
            .json(&json!({"comment": "run free", "petId": pet_id}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        // Single lookup via petId query
        let response = server
            .get("/pets")
            .add_query_param("petId", pet_id)
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let pet = &body["pet"];
        assert_eq!(pet["name"], "Mochi");
        assert_eq!(pet["owner"]["username"], "momo");
        assert!(pet["owner"].get("passwordHash").is_none());
        let comments = pet["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["text"], "run free");
        assert_eq!(comments[0]["owner"]["username"], "ana");

        // Full listing
        let response = server
            .get("/pets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let pets = body["pets"].as_array().unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0]["comments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_pet_unknown_id_not_found() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;

        let response = server
            .get("/pets")
            .add_query_param("petId", 999)
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    // ========================================================================
    // Comment and like endpoints
    // ========================================================================

    #[tokio::test]
    async fn test_create_comment_returns_comment_with_author() {
        let server = test_server().await;
        let (token, user_id) = signup(&server, "momo@example.com", "momo").await;
        let pet_id = register_pet(&server, &token, "Mochi").await;

        let response = server
            .post("/comment")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"comment": "sweet boy", "petId": pet_id}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["text"], "sweet boy");
        assert_eq!(body["petId"].as_i64().unwrap(), pet_id);
        assert_eq!(body["owner"]["id"].as_i64().unwrap(), user_id);
        assert_eq!(body["owner"]["username"], "momo");
    }

    #[tokio::test]
    async fn test_create_comment_nonexistent_pet_rejected() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;

        let response = server
            .post("/comment")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"comment": "hello", "petId": 999}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_like_and_unlike_flow() {
        let server = test_server().await;
        let (token, _) = signup(&server, "momo@example.com", "momo").await;
        let pet_id = register_pet(&server, &token, "Mochi").await;

        let response = server
            .post("/like")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"petId": pet_id}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["liked"], true);
        assert_eq!(body["likes"].as_i64().unwrap(), 1);

        // Liking twice keeps the count at one
        let response = server
            .post("/like")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"petId": pet_id}))
            .await;
        let body: Value = response.json();
        assert_eq!(body["likes"].as_i64().unwrap(), 1);

        // The like count shows up in the profile
        let response = server
            .get("/pets")
            .add_query_param("petId", pet_id)
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["pet"]["likes"].as_i64().unwrap(), 1);

        let response = server
            .delete("/like")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"petId": pet_id}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["liked"], false);
        assert_eq!(body["likes"].as_i64().unwrap(), 0);
    }
}
