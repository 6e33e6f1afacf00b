//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication middleware and the admin guard
//! - The `RentalBackend` seam over the in-memory engine and the database
//! - JSON error responses

pub mod backend;
pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use rentdesk_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use backend::{DatabaseBackend, MemoryBackend, RentalBackend};
pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where rental records live.
    pub backend: Arc<dyn RentalBackend>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(backend: impl RentalBackend + 'static, jwt_service: JwtService) -> Self {
        Self {
            backend: Arc::new(backend),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
