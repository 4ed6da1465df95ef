//! Comment service
//!
//! Posting comments on pet profiles, and liking/unliking pets. The
//! referenced pet is checked before any write, and a created comment is
//! returned with its author already resolved.

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{CommentRepository, PetRepository};
use crate::models::{Comment, CommentWithOwner, CreateCommentInput};

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced pet does not exist
    #[error("Pet {0} not found")]
    PetNotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    pet_repo: Arc<dyn PetRepository>,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>, pet_repo: Arc<dyn PetRepository>) -> Self {
        Self {
            comment_repo,
            pet_repo,
        }
    }

    /// Post a comment on a pet profile as the given user.
    ///
    /// # Errors
    ///
    /// - `Validation` on empty text
    /// - `PetNotFound` if the pet does not exist
    pub async fn post(
        &self,
        input: CreateCommentInput,
        owner_id: i64,
    ) -> Result<CommentWithOwner, CommentServiceError> {
        if input.text.trim().is_empty() {
            return Err(CommentServiceError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }

        self.ensure_pet_exists(input.pet_id).await?;

        let created = self
            .comment_repo
            .create(&Comment::new(input.text, input.pet_id, owner_id))
            .await
            .context("Failed to create comment")?;

        // Return the comment with its author resolved
        let with_owner = self
            .comment_repo
            .get_with_owner(created.id)
            .await
            .context("Failed to load created comment")?
            .ok_or_else(|| anyhow::anyhow!("Comment {} vanished after insert", created.id))?;

        Ok(with_owner)
    }

    /// Like a pet as the given user; returns whether a new like landed.
    pub async fn like(&self, pet_id: i64, user_id: i64) -> Result<bool, CommentServiceError> {
        self.ensure_pet_exists(pet_id).await?;

        let added = self
            .comment_repo
            .add_like(pet_id, user_id)
            .await
            .context("Failed to add like")?;

        Ok(added)
    }

    /// Remove the user's like on a pet; returns whether one was removed.
    pub async fn unlike(&self, pet_id: i64, user_id: i64) -> Result<bool, CommentServiceError> {
        self.ensure_pet_exists(pet_id).await?;

        let removed = self
            .comment_repo
            .remove_like(pet_id, user_id)
            .await
            .context("Failed to remove like")?;

        Ok(removed)
    }

    /// Count likes on a pet.
    pub async fn like_count(&self, pet_id: i64) -> Result<i64, CommentServiceError> {
        let count = self
            .comment_repo
            .count_likes(pet_id)
            .await
            .context("Failed to count likes")?;

        Ok(count)
    }

    async fn ensure_pet_exists(&self, pet_id: i64) -> Result<(), CommentServiceError> {
        self.pet_repo
            .get_by_id(pet_id)
            .await
            .context("Failed to check pet")?
            .ok_or(CommentServiceError::PetNotFound(pet_id))?;

        Ok(())
    }
}
