//! Shared types, errors, and configuration for RentDesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and the operator role model

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, LoginRequest, Role};
pub use config::{
    AdminConfig, AppConfig, CatalogConfig, DatabaseConfig, JwtConfig, ServerConfig,
};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
