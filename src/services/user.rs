//! User service
//!
//! Implements business logic for accounts:
//! - Signup: email uniqueness, password hashing, token issuance
//! - Login: credential verification and token issuance
//!
//! Logout is intentionally absent: tokens are stateless and are not
//! invalidated server-side, so the API layer only acknowledges it.

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{JwtAuthenticator, TokenError};

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Email already registered
    #[error("Email '{0}' is already registered")]
    EmailTaken(String),

    /// No account with the given email
    #[error("No account for this email, sign up first")]
    UnknownEmail,

    /// Password hash mismatch
    #[error("Password does not match")]
    InvalidPassword,

    /// Token issuance failure
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Input for signup
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// User service for account management and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    tokens: Arc<JwtAuthenticator>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: Arc<JwtAuthenticator>) -> Self {
        Self { user_repo, tokens }
    }

    /// Register a new account and issue a token for it.
    ///
    /// # Errors
    ///
    /// - `Validation` on empty fields or a malformed email
    /// - `EmailTaken` if the email is already registered
    pub async fn signup(&self, input: SignupInput) -> Result<(User, String), UserServiceError> {
        self.validate_signup_input(&input)?;

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::EmailTaken(input.email));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(input.username, input.email, password_hash);
        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        let token = self.tokens.issue(created.id, &created.username)?;

        Ok((created, token))
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// - `UnknownEmail` if no account exists for the email
    /// - `InvalidPassword` on a hash mismatch
    pub async fn login(&self, input: LoginInput) -> Result<(User, String), UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to get user by email")?
            .ok_or(UserServiceError::UnknownEmail)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::InvalidPassword);
        }

        let token = self.tokens.issue(user.id, &user.username)?;

        Ok((user, token))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Validate signup input
    fn validate_signup_input(&self, input: &SignupInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() {
            return Err(UserServiceError::Validation(
                "Email cannot be empty".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(UserServiceError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }

        // Basic email format validation
        if !input.email.contains('@') {
            return Err(UserServiceError::Validation(
                "Invalid email format".to_string(),
            ));
        }

        Ok(())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
