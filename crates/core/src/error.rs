//! Rental error types.
//!
//! Every error carries the ids, amounts and statuses involved rather than a
//! preformatted sentence, so callers decide how to present it. Each variant
//! belongs to one [`ErrorKind`], which fixes its HTTP status.

use chrono::NaiveDate;
use rentdesk_shared::AppError;
use rentdesk_shared::types::{BookingId, ItemId, LedgerEntryId, PartyId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::booking::types::{BookingAction, BookingStatus};
use crate::inventory::types::ItemStatus;

/// Result type alias using `RentalError`.
pub type RentalResult<T> = Result<T, RentalError>;

/// Broad classification of a rental error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input, rejected before any mutation.
    Validation,
    /// A referenced party, item, booking or entry does not resolve.
    NotFound,
    /// The request is well formed but the current state forbids it.
    StateConflict,
    /// Sign-in was refused.
    Unauthenticated,
    /// The operation could not complete and nothing was changed.
    OperationFailed,
}

/// Errors that can occur during rental operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentalError {
    // ========== Validation Errors ==========
    /// A required text field is blank.
    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    /// Daily rate cannot be negative.
    #[error("Daily rate cannot be negative: {0}")]
    NegativeDailyRate(Decimal),

    /// Supplier cost cannot be negative.
    #[error("Supplier cost cannot be negative: {0}")]
    NegativeSupplierCost(Decimal),

    /// Credit limit cannot be negative.
    #[error("Credit limit cannot be negative: {0}")]
    NegativeCreditLimit(Decimal),

    /// Monetary amount must be strictly positive.
    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(Decimal),

    /// End date precedes start date.
    #[error("End date {end} is before start date {start}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// No items were selected.
    #[error("At least one item must be selected")]
    EmptySelection,

    /// No party was selected in the cart.
    #[error("A party must be selected")]
    NoPartySelected,

    /// No rental dates were selected in the cart.
    #[error("Rental dates must be selected")]
    NoDatesSelected,

    /// `Rented` is only ever set by booking operations.
    #[error("Item status 'rented' cannot be set directly")]
    RentedStatusNotSettable,

    /// Password is shorter than the minimum length.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length in characters.
        min: usize,
    },

    /// Amount is above the largest accepted value.
    #[error("Amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge {
        /// The rejected amount.
        amount: Decimal,
        /// Largest accepted amount.
        max: Decimal,
    },

    /// A total or balance would leave the decimal range.
    #[error("Amount is out of range")]
    AmountOverflow,

    /// Unknown catalog preset name.
    #[error("Unknown catalog preset: {0}")]
    UnknownPreset(String),

    // ========== Not Found Errors ==========
    /// Item not found.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// Booking not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(LedgerEntryId),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // ========== State Conflict Errors ==========
    /// Item is not available for booking.
    #[error("Item {item_id} is not available (status: {status})")]
    ItemUnavailable {
        /// The item.
        item_id: ItemId,
        /// Its current status.
        status: ItemStatus,
    },

    /// Item has been deleted.
    #[error("Item {0} has been deleted")]
    ItemDeleted(ItemId),

    /// Item is held by a live booking.
    #[error("Item {item_id} is held by booking {booking_id}")]
    ItemInUse {
        /// The item.
        item_id: ItemId,
        /// The booking holding it.
        booking_id: BookingId,
    },

    /// Party has been deleted.
    #[error("Party {0} has been deleted")]
    PartyDeleted(PartyId),

    /// Party is blacklisted and cannot book.
    #[error("Party {0} is blacklisted")]
    PartyBlacklisted(PartyId),

    /// Booking would push the party past its credit limit.
    #[error(
        "Credit limit exceeded for party {party_id}: balance {balance} + {requested} > limit {limit}"
    )]
    CreditLimitExceeded {
        /// The party.
        party_id: PartyId,
        /// Configured credit limit.
        limit: Decimal,
        /// Balance before the operation.
        balance: Decimal,
        /// Amount the operation would add.
        requested: Decimal,
    },

    /// The booking's status does not allow the action.
    #[error("Cannot {action} a booking that is {from}")]
    InvalidTransition {
        /// Current status.
        from: BookingStatus,
        /// Attempted action.
        action: BookingAction,
    },

    /// Invoice belongs to a live booking and can only go with it.
    #[error("Invoice {entry_id} belongs to booking {booking_id}")]
    InvoiceLocked {
        /// The invoice entry.
        entry_id: LedgerEntryId,
        /// The booking it belongs to.
        booking_id: BookingId,
    },

    /// An active booking has no invoice in the log.
    #[error("Booking {0} has no invoice")]
    MissingInvoice(BookingId),

    /// A refund names a booking that belongs to another party.
    #[error("Booking {booking_id} does not belong to party {party_id}")]
    RefundPartyMismatch {
        /// The booking named on the refund.
        booking_id: BookingId,
        /// The party being refunded.
        party_id: PartyId,
    },

    /// Username is already held by another user.
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// User has been deleted.
    #[error("User {0} has been deleted")]
    UserDeleted(UserId),

    /// The change would leave no active administrator.
    #[error("At least one active administrator must remain")]
    LastAdmin,

    // ========== Sign-in ==========
    /// Unknown username or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// User exists but is switched off.
    #[error("Account is disabled")]
    AccountDisabled,

    // ========== Operation Failures ==========
    /// Shared state is unavailable (a previous writer panicked).
    #[error("Rental state is unavailable")]
    StateUnavailable,

    /// Underlying storage failed; the operation was rolled back.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Password hashing or verification failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl RentalError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::NegativeDailyRate(_)
            | Self::NegativeSupplierCost(_)
            | Self::NegativeCreditLimit(_)
            | Self::NonPositiveAmount(_)
            | Self::InvalidDateRange { .. }
            | Self::EmptySelection
            | Self::NoPartySelected
            | Self::NoDatesSelected
            | Self::RentedStatusNotSettable
            | Self::AmountTooLarge { .. }
            | Self::AmountOverflow
            | Self::PasswordTooShort { .. }
            | Self::UnknownPreset(_) => ErrorKind::Validation,

            Self::ItemNotFound(_)
            | Self::PartyNotFound(_)
            | Self::BookingNotFound(_)
            | Self::EntryNotFound(_)
            | Self::UserNotFound(_) => ErrorKind::NotFound,

            Self::ItemUnavailable { .. }
            | Self::ItemDeleted(_)
            | Self::ItemInUse { .. }
            | Self::PartyDeleted(_)
            | Self::PartyBlacklisted(_)
            | Self::CreditLimitExceeded { .. }
            | Self::InvalidTransition { .. }
            | Self::InvoiceLocked { .. }
            | Self::MissingInvoice(_)
            | Self::RefundPartyMismatch { .. }
            | Self::UsernameTaken(_)
            | Self::UserDeleted(_)
            | Self::LastAdmin => ErrorKind::StateConflict,

            Self::InvalidCredentials | Self::AccountDisabled => ErrorKind::Unauthenticated,

            Self::StateUnavailable | Self::Storage(_) | Self::PasswordHash(_) => {
                ErrorKind::OperationFailed
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::NegativeDailyRate(_) => "NEGATIVE_DAILY_RATE",
            Self::NegativeSupplierCost(_) => "NEGATIVE_SUPPLIER_COST",
            Self::NegativeCreditLimit(_) => "NEGATIVE_CREDIT_LIMIT",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::NoPartySelected => "NO_PARTY_SELECTED",
            Self::NoDatesSelected => "NO_DATES_SELECTED",
            Self::RentedStatusNotSettable => "RENTED_STATUS_NOT_SETTABLE",
            Self::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::PasswordTooShort { .. } => "PASSWORD_TOO_SHORT",
            Self::UnknownPreset(_) => "UNKNOWN_PRESET",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ItemUnavailable { .. } => "ITEM_UNAVAILABLE",
            Self::ItemDeleted(_) => "ITEM_DELETED",
            Self::ItemInUse { .. } => "ITEM_IN_USE",
            Self::PartyDeleted(_) => "PARTY_DELETED",
            Self::PartyBlacklisted(_) => "PARTY_BLACKLISTED",
            Self::CreditLimitExceeded { .. } => "CREDIT_LIMIT_EXCEEDED",
            Self::InvalidTransition { .. } => "INVALID_BOOKING_TRANSITION",
            Self::InvoiceLocked { .. } => "INVOICE_LOCKED",
            Self::MissingInvoice(_) => "MISSING_INVOICE",
            Self::RefundPartyMismatch { .. } => "REFUND_PARTY_MISMATCH",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::UserDeleted(_) => "USER_DELETED",
            Self::LastAdmin => "LAST_ADMIN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::StateUnavailable => "STATE_UNAVAILABLE",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::PasswordHash(_) => "PASSWORD_HASH_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::StateConflict => 409,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::OperationFailed => 500,
        }
    }
}

impl From<RentalError> for AppError {
    fn from(err: RentalError) -> Self {
        Self::Domain {
            status: err.http_status_code(),
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RentalError::EmptySelection.kind(), ErrorKind::Validation);
        assert_eq!(
            RentalError::PartyNotFound(PartyId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RentalError::InvalidTransition {
                from: BookingStatus::Completed,
                action: BookingAction::Edit,
            }
            .kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            RentalError::StateUnavailable.kind(),
            ErrorKind::OperationFailed
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            RentalError::NonPositiveAmount(dec!(0)).http_status_code(),
            400
        );
        assert_eq!(
            RentalError::BookingNotFound(BookingId::new()).http_status_code(),
            404
        );
        assert_eq!(
            RentalError::PartyBlacklisted(PartyId::new()).http_status_code(),
            409
        );
        assert_eq!(
            RentalError::Storage("disk".to_string()).http_status_code(),
            500
        );
        assert_eq!(RentalError::InvalidCredentials.http_status_code(), 401);
        assert_eq!(RentalError::AccountDisabled.http_status_code(), 401);
        assert_eq!(RentalError::AmountOverflow.http_status_code(), 400);
    }

    #[test]
    fn test_error_display() {
        let err = RentalError::InvalidTransition {
            from: BookingStatus::Completed,
            action: BookingAction::Edit,
        };
        assert_eq!(err.to_string(), "Cannot edit a booking that is completed");

        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = RentalError::InvalidDateRange { start, end };
        assert_eq!(
            err.to_string(),
            "End date 2024-01-01 is before start date 2024-01-03"
        );
    }

    #[test]
    fn test_into_app_error() {
        let item_id = ItemId::new();
        let app: AppError = RentalError::ItemUnavailable {
            item_id,
            status: ItemStatus::Rented,
        }
        .into();
        assert_eq!(app.status_code(), 409);
        assert_eq!(app.error_code(), "ITEM_UNAVAILABLE");
        assert_eq!(
            app.to_string(),
            format!("Item {item_id} is not available (status: rented)")
        );
    }
}
