//! Comment and like API endpoints
//!
//! - POST /comment - Post a comment on a pet profile
//! - POST /like - Like a pet profile
//! - DELETE /like - Remove a like

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthIdentity};
use crate::models::{CommentWithOwner, CreateCommentInput};
use crate::services::comment::CommentServiceError;

/// Request body for posting a comment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub comment: String,
    pub pet_id: i64,
}

/// Request body for liking/unliking a pet
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub pet_id: i64,
}

/// Response for like/unlike
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub ok: bool,
    pub liked: bool,
    pub likes: i64,
}

/// POST /comment - Post a comment as the authenticated user
///
/// Responds with the created comment, author resolved.
pub async fn create_comment(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(body): Json<CreateCommentRequest>,
) -> Result<Json<CommentWithOwner>, ApiError> {
    let input = CreateCommentInput {
        text: body.comment,
        pet_id: body.pet_id,
    };

    let comment = state
        .comment_service
        .post(input, identity.0.user_id)
        .await
        .map_err(comment_error_to_api)?;

    Ok(Json(comment))
}

/// POST /like - Like a pet as the authenticated user
pub async fn like(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(body): Json<LikeRequest>,
) -> Result<Json<LikeResponse>, ApiError> {
    state
        .comment_service
        .like(body.pet_id, identity.0.user_id)
        .await
        .map_err(comment_error_to_api)?;

    let likes = state
        .comment_service
        .like_count(body.pet_id)
        .await
        .map_err(comment_error_to_api)?;

    Ok(Json(LikeResponse {
        ok: true,
        liked: true,
        likes,
    }))
}

/// DELETE /like - Remove the authenticated user's like
pub async fn unlike(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(body): Json<LikeRequest>,
) -> Result<Json<LikeResponse>, ApiError> {
    state
        .comment_service
        .unlike(body.pet_id, identity.0.user_id)
        .await
        .map_err(comment_error_to_api)?;

    let likes = state
        .comment_service
        .like_count(body.pet_id)
        .await
        .map_err(comment_error_to_api)?;

    Ok(Json(LikeResponse {
        ok: true,
        liked: false,
        likes,
    }))
}

/// Map comment service errors onto the documented failure contract.
fn comment_error_to_api(e: CommentServiceError) -> ApiError {
    match e {
        CommentServiceError::Validation(_) | CommentServiceError::PetNotFound(_) => {
            ApiError::bad_request(e.to_string())
        }
        CommentServiceError::Internal(err) => {
            tracing::error!("Comment service error: {:#}", err);
            ApiError::bad_request("Request failed")
        }
    }
}
