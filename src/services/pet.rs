//! Pet service
//!
//! Business logic for pet registration and profile reads. Profile reads
//! resolve every reference for display: the owning user, the comment
//! thread (each comment with its author), and the like count.

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{CommentRepository, PetRepository, UserRepository};
use crate::models::{CreatePetInput, Pet, PetProfile};

/// Error types for pet service operations
#[derive(Debug, thiserror::Error)]
pub enum PetServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A pet with this name is already registered
    #[error("A pet named '{0}' is already registered")]
    NameTaken(String),

    /// No pet with the given id
    #[error("Pet {0} not found")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Pet service
pub struct PetService {
    pet_repo: Arc<dyn PetRepository>,
    user_repo: Arc<dyn UserRepository>,
    comment_repo: Arc<dyn CommentRepository>,
}

impl PetService {
    pub fn new(
        pet_repo: Arc<dyn PetRepository>,
        user_repo: Arc<dyn UserRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            pet_repo,
            user_repo,
            comment_repo,
        }
    }

    /// Register a pet for the given owner.
    ///
    /// # Errors
    ///
    /// - `Validation` on an empty name
    /// - `NameTaken` if a pet with the same name already exists
    pub async fn register(
        &self,
        input: CreatePetInput,
        owner_id: i64,
    ) -> Result<Pet, PetServiceError> {
        if input.name.trim().is_empty() {
            return Err(PetServiceError::Validation(
                "Pet name cannot be empty".to_string(),
            ));
        }

        if self
            .pet_repo
            .get_by_name(&input.name)
            .await
            .context("Failed to check pet name")?
            .is_some()
        {
            return Err(PetServiceError::NameTaken(input.name));
        }

        let pet = Pet::new(
            input.name,
            input.death_date,
            input.favorites,
            input.image,
            owner_id,
        );

        let created = self
            .pet_repo
            .create(&pet)
            .await
            .context("Failed to create pet")?;

        Ok(created)
    }

    /// Get a single pet profile with all references resolved.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no pet exists with the given id
    pub async fn profile(&self, pet_id: i64) -> Result<PetProfile, PetServiceError> {
        let pet = self
            .pet_repo
            .get_by_id(pet_id)
            .await
            .context("Failed to get pet")?
            .ok_or(PetServiceError::NotFound(pet_id))?;

        self.assemble_profile(pet).await
    }

    /// List all pet profiles with references resolved.
    pub async fn list_profiles(&self) -> Result<Vec<PetProfile>, PetServiceError> {
        let pets = self.pet_repo.list().await.context("Failed to list pets")?;

        let mut profiles = Vec::with_capacity(pets.len());
        for pet in pets {
            profiles.push(self.assemble_profile(pet).await?);
        }

        Ok(profiles)
    }

    async fn assemble_profile(&self, pet: Pet) -> Result<PetProfile, PetServiceError> {
        let owner = self
            .user_repo
            .get_by_id(pet.owner_id)
            .await
            .context("Failed to get pet owner")?
            .ok_or_else(|| anyhow::anyhow!("Owner {} missing for pet {}", pet.owner_id, pet.id))?;

        let comments = self
            .comment_repo
            .list_by_pet(pet.id)
            .await
            .context("Failed to list pet comments")?;

        let likes = self
            .comment_repo
            .count_likes(pet.id)
            .await
            .context("Failed to count pet likes")?;

        Ok(PetProfile::assemble(pet, owner, comments, likes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCommentRepository, SqlxPetRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{Comment, User};
    use chrono::NaiveDate;

    struct Fixture {
        pool: DynDatabasePool,
        service: PetService,
        owner_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let owner = user_repo
            .create(&User::new(
                "momo".to_string(),
                "momo@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create owner");

        let service = PetService::new(
            SqlxPetRepository::boxed(pool.clone()),
            user_repo,
            SqlxCommentRepository::boxed(pool.clone()),
        );

        Fixture {
            pool,
            service,
            owner_id: owner.id,
        }
    }

    fn pet_input(name: &str) -> CreatePetInput {
        CreatePetInput {
            name: name.to_string(),
            death_date: NaiveDate::from_ymd_opt(2023, 5, 17).unwrap(),
            favorites: vec!["tennis ball".to_string()],
            image: None,
        }
    }

    #[tokio::test]
    async fn test_register_pet() {
        let fx = setup().await;

        let pet = fx
            .service
            .register(pet_input("Mochi"), fx.owner_id)
            .await
            .expect("Failed to register pet");

        assert!(pet.id > 0);
        assert_eq!(pet.name, "Mochi");
        assert_eq!(pet.owner_id, fx.owner_id);
    }

    #[tokio::test]
    async fn test_register_duplicate_name_fails() {
        let fx = setup().await;

        fx.service
            .register(pet_input("Mochi"), fx.owner_id)
            .await
            .expect("First registration should succeed");

        let result = fx.service.register(pet_input("Mochi"), fx.owner_id).await;
        assert!(matches!(result, Err(PetServiceError::NameTaken(_))));

        // Only one record persisted
        let profiles = fx
            .service
            .list_profiles()
            .await
            .expect("Failed to list profiles");
        assert_eq!(profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_register_empty_name_fails() {
        let fx = setup().await;

        let result = fx.service.register(pet_input("   "), fx.owner_id).await;
        assert!(matches!(result, Err(PetServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let fx = setup().await;

        let result = fx.service.profile(999).await;
        assert!(matches!(result, Err(PetServiceError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_profile_resolves_owner_comments_and_likes() {
        let fx = setup().await;

        let pet = fx
            .service
            .register(pet_input("Mochi"), fx.owner_id)
            .await
            .expect("Failed to register pet");

        // Another user comments and likes
        let user_repo = SqlxUserRepository::new(fx.pool.clone());
        let friend = user_repo
            .create(&User::new(
                "ana".to_string(),
                "ana@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create friend");

        let comment_repo = SqlxCommentRepository::new(fx.pool.clone());
        comment_repo
            .create(&Comment::new("run free".to_string(), pet.id, friend.id))
            .await
            .expect("Failed to create comment");
        comment_repo
            .add_like(pet.id, friend.id)
            .await
            .expect("Failed to like");

        let profile = fx
            .service
            .profile(pet.id)
            .await
            .expect("Failed to get profile");

        assert_eq!(profile.name, "Mochi");
        assert_eq!(profile.owner.username, "momo");
        assert_eq!(profile.comments.len(), 1);
        assert_eq!(profile.comments[0].text, "run free");
        assert_eq!(profile.comments[0].owner.username, "ana");
        assert_eq!(profile.likes, 1);
    }

    #[tokio::test]
    async fn test_list_profiles_empty() {
        let fx = setup().await;

        let profiles = fx
            .service
            .list_profiles()
            .await
            .expect("Failed to list profiles");
        assert!(profiles.is_empty());
    }

    #[tokio::test]
    async fn test_list_profiles_resolves_each() {
        let fx = setup().await;

        fx.service
            .register(pet_input("Mochi"), fx.owner_id)
            .await
            .expect("Failed to register pet");
        fx.service
            .register(pet_input("Whiskers"), fx.owner_id)
            .await
            .expect("Failed to register pet");

        let profiles = fx
            .service
            .list_profiles()
            .await
            .expect("Failed to list profiles");

        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().all(|p| p.owner.username == "momo"));
    }
}
