//! `SeaORM` entity definitions for the rental schema.
//!
//! Status-like columns are stored as lowercase strings and decoded through
//! the core enums' `parse`.

pub mod booking_lines;
pub mod bookings;
pub mod catalog_settings;
pub mod items;
pub mod ledger_entries;
pub mod parties;
pub mod users;

use sea_orm::DbErr;

/// Decodes a stored enum value, naming the column on failure.
pub(crate) fn decode<T>(parsed: Option<T>, column: &str, raw: &str) -> Result<T, DbErr> {
    parsed.ok_or_else(|| DbErr::Type(format!("invalid {column} value: {raw}")))
}
