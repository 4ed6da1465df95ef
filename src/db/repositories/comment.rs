//! Comment and like repository
//!
//! Comments are stored with their pet and owner references; reads join the
//! owning user so profiles come back with authors already resolved. Likes
//! live here too, one row per (pet, user).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithOwner, User};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get a comment with its author resolved
    async fn get_with_owner(&self, id: i64) -> Result<Option<CommentWithOwner>>;

    /// Get a pet's comments with authors resolved, in posting order
    async fn list_by_pet(&self, pet_id: i64) -> Result<Vec<CommentWithOwner>>;

    /// Add a like; returns false if the user already liked the pet
    async fn add_like(&self, pet_id: i64, user_id: i64) -> Result<bool>;

    /// Remove a like; returns false if there was none
    async fn remove_like(&self, pet_id: i64, user_id: i64) -> Result<bool>;

    /// Check whether the user has liked the pet
    async fn is_liked(&self, pet_id: i64, user_id: i64) -> Result<bool>;

    /// Count likes on a pet
    async fn count_likes(&self, pet_id: i64) -> Result<i64>;
}

/// SQLx-based comment repository supporting SQLite and MySQL
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), comment).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), comment).await,
        }
    }

    async fn get_with_owner(&self, id: i64) -> Result<Option<CommentWithOwner>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_with_owner_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_with_owner_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_pet(&self, pet_id: i64) -> Result<Vec<CommentWithOwner>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_pet_sqlite(self.pool.as_sqlite().unwrap(), pet_id).await
            }
            DatabaseDriver::Mysql => list_by_pet_mysql(self.pool.as_mysql().unwrap(), pet_id).await,
        }
    }

    async fn add_like(&self, pet_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_like_sqlite(self.pool.as_sqlite().unwrap(), pet_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                add_like_mysql(self.pool.as_mysql().unwrap(), pet_id, user_id).await
            }
        }
    }

    async fn remove_like(&self, pet_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_like_sqlite(self.pool.as_sqlite().unwrap(), pet_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                remove_like_mysql(self.pool.as_mysql().unwrap(), pet_id, user_id).await
            }
        }
    }

    async fn is_liked(&self, pet_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                is_liked_sqlite(self.pool.as_sqlite().unwrap(), pet_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                is_liked_mysql(self.pool.as_mysql().unwrap(), pet_id, user_id).await
            }
        }
    }

    async fn count_likes(&self, pet_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_likes_sqlite(self.pool.as_sqlite().unwrap(), pet_id).await
            }
            DatabaseDriver::Mysql => count_likes_mysql(self.pool.as_mysql().unwrap(), pet_id).await,
        }
    }
}

const COMMENT_WITH_OWNER_SELECT: &str = r#"
    SELECT c.id, c.text, c.pet_id, c.created_at,
           u.id as owner_id, u.username, u.email,
           u.created_at as owner_created_at, u.updated_at as owner_updated_at
    FROM comments c
    JOIN users u ON u.id = c.owner_id
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (text, pet_id, owner_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&comment.text)
    .bind(comment.pet_id)
    .bind(comment.owner_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        text: comment.text.clone(),
        pet_id: comment.pet_id,
        owner_id: comment.owner_id,
        created_at: now,
    })
}

async fn get_with_owner_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<CommentWithOwner>> {
    let sql = format!("{} WHERE c.id = ?", COMMENT_WITH_OWNER_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    Ok(row.map(|r| row_to_comment_with_owner_sqlite(&r)))
}

async fn list_by_pet_sqlite(pool: &SqlitePool, pet_id: i64) -> Result<Vec<CommentWithOwner>> {
    let sql = format!(
        "{} WHERE c.pet_id = ? ORDER BY c.created_at ASC, c.id ASC",
        COMMENT_WITH_OWNER_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(pet_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(row_to_comment_with_owner_sqlite)
        .collect())
}

fn row_to_comment_with_owner_sqlite(row: &sqlx::sqlite::SqliteRow) -> CommentWithOwner {
    CommentWithOwner {
        id: row.get("id"),
        text: row.get("text"),
        pet_id: row.get("pet_id"),
        owner: User {
            id: row.get("owner_id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: String::new(), // never read back alongside comments
            created_at: row.get("owner_created_at"),
            updated_at: row.get("owner_updated_at"),
        },
        created_at: row.get("created_at"),
    }
}

async fn add_like_sqlite(pool: &SqlitePool, pet_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO likes (pet_id, user_id) VALUES (?, ?)")
        .bind(pet_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to add like")?;

    Ok(result.rows_affected() > 0)
}

async fn remove_like_sqlite(pool: &SqlitePool, pet_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM likes WHERE pet_id = ? AND user_id = ?")
        .bind(pet_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to remove like")?;

    Ok(result.rows_affected() > 0)
}

async fn is_liked_sqlite(pool: &SqlitePool, pet_id: i64, user_id: i64) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE pet_id = ? AND user_id = ?")
            .bind(pet_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
            .context("Failed to check like")?;

    Ok(count > 0)
}

async fn count_likes_sqlite(pool: &SqlitePool, pet_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE pet_id = ?")
        .bind(pet_id)
        .fetch_one(pool)
        .await
        .context("Failed to count likes")?;

    Ok(count)
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (text, pet_id, owner_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&comment.text)
    .bind(comment.pet_id)
    .bind(comment.owner_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        text: comment.text.clone(),
        pet_id: comment.pet_id,
        owner_id: comment.owner_id,
        created_at: now,
    })
}

async fn get_with_owner_mysql(pool: &MySqlPool, id: i64) -> Result<Option<CommentWithOwner>> {
    let sql = format!("{} WHERE c.id = ?", COMMENT_WITH_OWNER_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    Ok(row.map(|r| row_to_comment_with_owner_mysql(&r)))
}

async fn list_by_pet_mysql(pool: &MySqlPool, pet_id: i64) -> Result<Vec<CommentWithOwner>> {
    let sql = format!(
        "{} WHERE c.pet_id = ? ORDER BY c.created_at ASC, c.id ASC",
        COMMENT_WITH_OWNER_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(pet_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_with_owner_mysql).collect())
}

fn row_to_comment_with_owner_mysql(row: &sqlx::mysql::MySqlRow) -> CommentWithOwner {
    CommentWithOwner {
        id: row.get("id"),
        text: row.get("text"),
        pet_id: row.get("pet_id"),
        owner: User {
            id: row.get("owner_id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: String::new(), // never read back alongside comments
            created_at: row.get("owner_created_at"),
            updated_at: row.get("owner_updated_at"),
        },
        created_at: row.get("created_at"),
    }
}

async fn add_like_mysql(pool: &MySqlPool, pet_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("INSERT IGNORE INTO likes (pet_id, user_id) VALUES (?, ?)")
        .bind(pet_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to add like")?;

    Ok(result.rows_affected() > 0)
}

async fn remove_like_mysql(pool: &MySqlPool, pet_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM likes WHERE pet_id = ? AND user_id = ?")
        .bind(pet_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to remove like")?;

    Ok(result.rows_affected() > 0)
}

async fn is_liked_mysql(pool: &MySqlPool, pet_id: i64, user_id: i64) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE pet_id = ? AND user_id = ?")
            .bind(pet_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
            .context("Failed to check like")?;

    Ok(count > 0)
}

async fn count_likes_mysql(pool: &MySqlPool, pet_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE pet_id = ?")
        .bind(pet_id)
        .fetch_one(pool)
        .await
        .context("Failed to count likes")?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PetRepository, SqlxPetRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Pet, User};
    use chrono::NaiveDate;

    struct Fixture {
        _pool: DynDatabasePool,
        repo: SqlxCommentRepository,
        user_id: i64,
        pet_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "momo".to_string(),
                "momo@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create user");

        let pets = SqlxPetRepository::new(pool.clone());
        let pet = pets
            .create(&Pet::new(
                "Mochi".to_string(),
                NaiveDate::from_ymd_opt(2023, 5, 17).unwrap(),
                vec![],
                None,
                user.id,
            ))
            .await
            .expect("Failed to create pet");

        Fixture {
            repo: SqlxCommentRepository::new(pool.clone()),
            _pool: pool,
            user_id: user.id,
            pet_id: pet.id,
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let fx = setup().await;

        let created = fx
            .repo
            .create(&Comment::new("run free".to_string(), fx.pet_id, fx.user_id))
            .await
            .expect("Failed to create comment");

        assert!(created.id > 0);
        assert_eq!(created.text, "run free");
        assert_eq!(created.pet_id, fx.pet_id);
    }

    #[tokio::test]
    async fn test_create_comment_unknown_pet_rejected() {
        let fx = setup().await;

        let result = fx
            .repo
            .create(&Comment::new("hello".to_string(), 999, fx.user_id))
            .await;

        assert!(result.is_err(), "FK to pets must be enforced");
    }

    #[tokio::test]
    async fn test_get_with_owner() {
        let fx = setup().await;
        let created = fx
            .repo
            .create(&Comment::new("sweet boy".to_string(), fx.pet_id, fx.user_id))
            .await
            .expect("Failed to create comment");

        let found = fx
            .repo
            .get_with_owner(created.id)
            .await
            .expect("Failed to get comment")
            .expect("Comment not found");

        assert_eq!(found.text, "sweet boy");
        assert_eq!(found.owner.id, fx.user_id);
        assert_eq!(found.owner.username, "momo");
        assert!(found.owner.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_get_with_owner_not_found() {
        let fx = setup().await;

        let found = fx
            .repo
            .get_with_owner(999)
            .await
            .expect("Failed to get comment");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_by_pet_in_posting_order() {
        let fx = setup().await;

        for text in ["first", "second", "third"] {
            fx.repo
                .create(&Comment::new(text.to_string(), fx.pet_id, fx.user_id))
                .await
                .expect("Failed to create comment");
        }

        let comments = fx
            .repo
            .list_by_pet(fx.pet_id)
            .await
            .expect("Failed to list comments");

        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(comments.iter().all(|c| c.owner.username == "momo"));
    }

    #[tokio::test]
    async fn test_list_by_pet_empty() {
        let fx = setup().await;

        let comments = fx
            .repo
            .list_by_pet(fx.pet_id)
            .await
            .expect("Failed to list comments");
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_like_lifecycle() {
        let fx = setup().await;

        assert!(!fx.repo.is_liked(fx.pet_id, fx.user_id).await.unwrap());
        assert_eq!(fx.repo.count_likes(fx.pet_id).await.unwrap(), 0);

        // First like lands
        assert!(fx.repo.add_like(fx.pet_id, fx.user_id).await.unwrap());
        assert!(fx.repo.is_liked(fx.pet_id, fx.user_id).await.unwrap());
        assert_eq!(fx.repo.count_likes(fx.pet_id).await.unwrap(), 1);

        // Second like from the same user is a no-op
        assert!(!fx.repo.add_like(fx.pet_id, fx.user_id).await.unwrap());
        assert_eq!(fx.repo.count_likes(fx.pet_id).await.unwrap(), 1);

        // Unlike removes it; a second unlike reports nothing removed
        assert!(fx.repo.remove_like(fx.pet_id, fx.user_id).await.unwrap());
        assert!(!fx.repo.remove_like(fx.pet_id, fx.user_id).await.unwrap());
        assert_eq!(fx.repo.count_likes(fx.pet_id).await.unwrap(), 0);
    }
}
