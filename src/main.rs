//! Furever - a pet memorial social backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use furever::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxCommentRepository, SqlxPetRepository, SqlxUserRepository},
    },
    services::{
        comment::CommentService, pet::PetService, token::JwtAuthenticator, user::UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "furever=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Furever backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.auth.is_default_secret() {
        tracing::warn!("Using the development signing secret; set FUREVER_AUTH_SECRET in production");
    }

    // Initialize database; a connect failure here is fatal
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let pet_repo = SqlxPetRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Token authenticator shared by the user service and the middleware
    let tokens = Arc::new(JwtAuthenticator::from_config(&config.auth));

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo.clone(), tokens.clone()));
    let pet_service = Arc::new(PetService::new(
        pet_repo.clone(),
        user_repo.clone(),
        comment_repo.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo, pet_repo));

    // Build application state
    let state = AppState {
        user_service,
        pet_service,
        comment_service,
        authenticator: tokens,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
