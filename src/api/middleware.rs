//! API middleware
//!
//! Contains the shared application state, the API error envelope, and the
//! bearer-token authentication middleware. Token verification goes through
//! the `Authenticator` capability, so this layer never touches the token
//! format itself.

use axum::{
    extract::{Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::services::token::{Authenticator, Identity, TokenError};
use crate::services::{CommentService, PetService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub pet_service: Arc<PetService>,
    pub comment_service: Arc<CommentService>,
    pub authenticator: Arc<dyn Authenticator>,
}

/// The verified identity attached to an authenticated request
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

/// API error response: `{ok: false, error: message}` with a status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "ok": false,
            "error": self.message,
        });

        (self.status, Json(body)).into_response()
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let auth_header = headers.get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(|t| t.to_string())
}

/// Authentication middleware
///
/// Verifies the bearer token and attaches the resolved identity to the
/// request. Rejects before the handler runs on a missing, invalid, or
/// expired token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let identity = state.authenticator.verify(&token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("Token expired"),
        _ => ApiError::unauthorized("Invalid token"),
    })?;

    request.extensions_mut().insert(AuthIdentity(identity));
    Ok(next.run(request).await)
}

// Extractor for AuthIdentity from request extensions
impl<S> axum::extract::FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
