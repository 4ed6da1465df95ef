//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity and is
//! injected into the services as an `Arc<dyn …Repository>`.

pub mod comment;
pub mod pet;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use pet::{PetRepository, SqlxPetRepository};
pub use user::{SqlxUserRepository, UserRepository};
