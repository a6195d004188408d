//! Reelgraph - social graph and feed core for a short-video platform
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /douyin client endpoints, /health, /metrics              │
//! │  - Viewer identity from the x-user-id header                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Relation / user / video / favorite / comment services    │
//! │  - FeedAssembler (batch joins in application code)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx), transactional edge transitions            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and response envelopes
//! - `auth`: Viewer extraction at the identity boundary
//! - `service`: Business logic layer
//! - `view`: Viewer-relative view objects and packing
//! - `data`: Database layer
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod view;

use std::sync::Arc;

use service::{
    CommentService, CreateVideoService, FeedAssembler, QueryFavoriteService, QueryVideoService,
    RelationService, SqlCommentService, SqlFavoriteService, SqlRelationService, SqlUserService,
    SqlVideoService, UserService,
};

/// Application state shared across all handlers
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    pub users: Arc<dyn UserService>,
    pub relations: Arc<dyn RelationService>,
    pub videos: Arc<dyn QueryVideoService>,
    pub publisher: Arc<dyn CreateVideoService>,
    pub favorites: Arc<dyn QueryFavoriteService>,
    pub comments: Arc<dyn CommentService>,

    /// Composes the services into view objects
    pub assembler: Arc<FeedAssembler>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Wire services
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect_with(&config.database).await?;
        tracing::info!(path = %config.database.path.display(), "Database connected");

        let state = Self::with_database(config, Arc::new(db));
        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire services around an already connected database
    pub fn with_database(config: config::AppConfig, db: Arc<data::Database>) -> Self {
        let users: Arc<dyn UserService> = Arc::new(SqlUserService::new(db.clone()));
        let relations: Arc<dyn RelationService> = Arc::new(SqlRelationService::new(db.clone()));
        let video_service = Arc::new(SqlVideoService::new(db.clone(), config.feed.page_size));
        let videos: Arc<dyn QueryVideoService> = video_service.clone();
        let publisher: Arc<dyn CreateVideoService> = video_service;
        let favorites: Arc<dyn QueryFavoriteService> = Arc::new(SqlFavoriteService::new(db.clone()));
        let comments: Arc<dyn CommentService> = Arc::new(SqlCommentService::new(db.clone()));

        let assembler = Arc::new(FeedAssembler::new(
            users.clone(),
            relations.clone(),
            videos.clone(),
            favorites.clone(),
            comments.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            users,
            relations,
            videos,
            publisher,
            favorites,
            comments,
            assembler,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{
        compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
        trace::TraceLayer,
    };

    // Parameters travel in the query string; bodies are never needed
    const MAX_BODY_BYTES: usize = 16 * 1024;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/douyin", api::douyin_router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
