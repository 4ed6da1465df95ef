//! Pet model
//!
//! A pet profile commemorates a deceased pet. The profile carries the
//! pet's name (unique across the system), the date it passed away, a list
//! of its favorite things, and an optional picture.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CommentWithOwner, User};

/// Pet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    /// Pet name (unique)
    pub name: String,
    /// Date the pet passed away
    pub death_date: NaiveDate,
    /// Favorite things (toys, snacks, spots)
    pub favorites: Vec<String>,
    /// Optional picture URL
    pub image: Option<String>,
    /// Owning user
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Create a new Pet owned by the given user.
    pub fn new(
        name: String,
        death_date: NaiveDate,
        favorites: Vec<String>,
        image: Option<String>,
        owner_id: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            name,
            death_date,
            favorites,
            image,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for registering a pet (owner comes from the authenticated identity)
#[derive(Debug, Clone)]
pub struct CreatePetInput {
    pub name: String,
    pub death_date: NaiveDate,
    pub favorites: Vec<String>,
    pub image: Option<String>,
}

/// Pet profile with references resolved for display: the owning user and
/// the comment thread, each comment carrying its own author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetProfile {
    pub id: i64,
    pub name: String,
    pub death_date: NaiveDate,
    pub favorites: Vec<String>,
    pub image: Option<String>,
    pub owner: User,
    pub comments: Vec<CommentWithOwner>,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

impl PetProfile {
    /// Assemble a profile from a pet and its resolved references.
    pub fn assemble(pet: Pet, owner: User, comments: Vec<CommentWithOwner>, likes: i64) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            death_date: pet.death_date,
            favorites: pet.favorites,
            image: pet.image,
            owner,
            comments,
            likes,
            created_at: pet.created_at,
        }
    }
}
