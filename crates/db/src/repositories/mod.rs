//! Repository abstractions for data access.
//!
//! `RentalRepository` is the durable counterpart of the in-memory booking
//! engine. Every write runs in one database transaction and applies the same
//! core rules before touching a row; a failure drops the transaction, which
//! rolls everything back.

mod bookings;
mod inventory;
mod ledger;
mod parties;
mod settings;
mod store;
mod users;

use chrono::{NaiveDate, Utc};
use rentdesk_core::RentalError;
use rentdesk_shared::AppError;
use sea_orm::{DatabaseConnection, DbErr};

/// Result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Rental(#[from] RentalError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the rule violation, if that is what this error is.
    #[must_use]
    pub const fn as_rental(&self) -> Option<&RentalError> {
        match self {
            Self::Rental(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Rental(err) => err.into(),
            RepositoryError::Database(err) => Self::OperationFailed(err.to_string()),
        }
    }
}

/// Rental repository: items, parties, bookings, ledger, settings and users.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    db: DatabaseConnection,
}

impl RentalRepository {
    /// Creates a new rental repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}
