//! Authentication API endpoints
//!
//! - POST /signup - Register an account
//! - POST /login - Log in with email and password
//! - GET /logout - Stateless acknowledgment (tokens are not revoked)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::User;
use crate::services::user::{LoginInput, SignupInput, UserServiceError};

/// Request body for signup
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Response for successful signup
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub ok: bool,
    pub user: User,
    pub token: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub payload: User,
    pub username: String,
    pub token: String,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
    pub message: String,
}

/// POST /signup - Register an account
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let input = SignupInput {
        email: body.email,
        username: body.username,
        password: body.password,
    };

    let (user, token) = state
        .user_service
        .signup(input)
        .await
        .map_err(user_error_to_api)?;

    Ok(Json(SignupResponse {
        ok: true,
        user,
        token,
    }))
}

/// POST /login - Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let input = LoginInput {
        email: body.email,
        password: body.password,
    };

    let (user, token) = state
        .user_service
        .login(input)
        .await
        .map_err(user_error_to_api)?;

    let username = user.username.clone();

    Ok(Json(LoginResponse {
        ok: true,
        payload: user,
        username,
        // Login hands the token back already carrying its scheme label
        token: format!("Bearer {}", token),
    }))
}

/// GET /logout - Acknowledge logout
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        ok: true,
        message: "logout".to_string(),
    })
}

/// Map user service errors onto the documented failure contract: every
/// business failure surfaces as 400 `{ok:false, error}`.
fn user_error_to_api(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::Validation(_)
        | UserServiceError::EmailTaken(_)
        | UserServiceError::UnknownEmail
        | UserServiceError::InvalidPassword => ApiError::bad_request(e.to_string()),
        UserServiceError::Token(err) => {
            tracing::error!("Token issuance failed: {}", err);
            ApiError::bad_request("Failed to issue token")
        }
        UserServiceError::Internal(err) => {
            tracing::error!("User service error: {:#}", err);
            ApiError::bad_request("Request failed")
        }
    }
}
