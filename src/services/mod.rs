//! Services layer - Business logic
//!
//! This module contains all business logic services for the Furever
//! backend. Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod comment;
pub mod password;
pub mod pet;
pub mod token;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use password::{hash_password, verify_password};
pub use pet::{PetService, PetServiceError};
pub use token::{Authenticator, Identity, JwtAuthenticator, TokenError};
pub use user::{LoginInput, SignupInput, UserService, UserServiceError};
