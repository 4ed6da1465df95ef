//! Comment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Comment entity
///
/// Comments are append-only in this surface: they are never edited or
/// deleted once posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub pet_id: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String, pet_id: i64, owner_id: i64) -> Self {
        Self {
            id: 0, // Will be set by the database
            text,
            pet_id,
            owner_id,
            created_at: Utc::now(),
        }
    }
}

/// Comment with its author resolved for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithOwner {
    pub id: i64,
    pub text: String,
    pub pet_id: i64,
    pub owner: User,
    pub created_at: DateTime<Utc>,
}

/// Input for posting a comment (owner comes from the authenticated identity)
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub text: String,
    pub pet_id: i64,
}
