//! Pet repository
//!
//! Database operations for pet profiles. The favorites list is persisted
//! as a JSON array in a text column; decoding failures surface as errors
//! rather than silently dropping entries.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Pet;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Pet repository trait
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Create a new pet
    async fn create(&self, pet: &Pet) -> Result<Pet>;

    /// Get pet by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Pet>>;

    /// Get pet by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Pet>>;

    /// List all pets, oldest registration first
    async fn list(&self) -> Result<Vec<Pet>>;
}

/// SQLx-based pet repository supporting SQLite and MySQL
pub struct SqlxPetRepository {
    pool: DynDatabasePool,
}

impl SqlxPetRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PetRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PetRepository for SqlxPetRepository {
    async fn create(&self, pet: &Pet) -> Result<Pet> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), pet).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), pet).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Pet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Pet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_name_sqlite(self.pool.as_sqlite().unwrap(), name).await
            }
            DatabaseDriver::Mysql => get_by_name_mysql(self.pool.as_mysql().unwrap(), name).await,
        }
    }

    async fn list(&self) -> Result<Vec<Pet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

/// Encode the favorites list for storage
fn encode_favorites(favorites: &[String]) -> Result<String> {
    serde_json::to_string(favorites).context("Failed to encode favorites")
}

/// Decode the favorites column back into a list
fn decode_favorites(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("Invalid favorites column: {}", raw))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, pet: &Pet) -> Result<Pet> {
    let now = Utc::now();
    let favorites = encode_favorites(&pet.favorites)?;

    let result = sqlx::query(
        r#"
        INSERT INTO pets (name, death_date, favorites, image, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pet.name)
    .bind(pet.death_date)
    .bind(&favorites)
    .bind(&pet.image)
    .bind(pet.owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create pet")?;

    let id = result.last_insert_rowid();

    Ok(Pet {
        id,
        name: pet.name.clone(),
        death_date: pet.death_date,
        favorites: pet.favorites.clone(),
        image: pet.image.clone(),
        owner_id: pet.owner_id,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Pet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get pet by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_pet_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<Option<Pet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get pet by name")?;

    match row {
        Some(row) => Ok(Some(row_to_pet_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Pet>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list pets")?;

    let mut pets = Vec::new();
    for row in rows {
        pets.push(row_to_pet_sqlite(&row)?);
    }

    Ok(pets)
}

fn row_to_pet_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Pet> {
    let favorites: String = row.get("favorites");

    Ok(Pet {
        id: row.get("id"),
        name: row.get("name"),
        death_date: row.get("death_date"),
        favorites: decode_favorites(&favorites)?,
        image: row.get("image"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, pet: &Pet) -> Result<Pet> {
    let now = Utc::now();
    let favorites = encode_favorites(&pet.favorites)?;

    let result = sqlx::query(
        r#"
        INSERT INTO pets (name, death_date, favorites, image, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pet.name)
    .bind(pet.death_date)
    .bind(&favorites)
    .bind(&pet.image)
    .bind(pet.owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create pet")?;

    let id = result.last_insert_id() as i64;

    Ok(Pet {
        id,
        name: pet.name.clone(),
        death_date: pet.death_date,
        favorites: pet.favorites.clone(),
        image: pet.image.clone(),
        owner_id: pet.owner_id,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Pet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get pet by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_pet_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_by_name_mysql(pool: &MySqlPool, name: &str) -> Result<Option<Pet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get pet by name")?;

    match row {
        Some(row) => Ok(Some(row_to_pet_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Pet>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, death_date, favorites, image, owner_id, created_at, updated_at
        FROM pets
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list pets")?;

    let mut pets = Vec::new();
    for row in rows {
        pets.push(row_to_pet_mysql(&row)?);
    }

    Ok(pets)
}

fn row_to_pet_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Pet> {
    let favorites: String = row.get("favorites");

    Ok(Pet {
        id: row.get("id"),
        name: row.get("name"),
        death_date: row.get("death_date"),
        favorites: decode_favorites(&favorites)?,
        image: row.get("image"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
