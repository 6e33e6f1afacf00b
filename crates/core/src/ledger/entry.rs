//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RentalError, RentalResult};
use crate::ledger::balance::ensure_within_max;

/// Side of the party's account an entry lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Increases what the party owes.
    Debit,
    /// Decreases what the party owes.
    Credit,
}

impl Direction {
    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a direction from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// What kind of financial movement an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Charge for a booking.
    Invoice,
    /// Money received from the party.
    Payment,
    /// Money credited back to the party.
    Refund,
}

impl EntryKind {
    /// Invoices are debits; payments and refunds are credits.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Invoice => Direction::Debit,
            Self::Payment | Self::Refund => Direction::Credit,
        }
    }

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Refund => "refund",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "invoice" => Some(Self::Invoice),
            "payment" => Some(Self::Payment),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the desk.
    #[default]
    Cash,
    /// Bank transfer.
    Transfer,
    /// Deferred, on account.
    Credit,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Credit => "credit",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// A single financial movement on a party's account.
///
/// `amount` is always positive; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// The party whose balance the entry affects.
    pub party_id: PartyId,
    /// The booking the entry belongs to, if any.
    pub booking_id: Option<BookingId>,
    /// Business date.
    pub date: NaiveDate,
    /// Invoice, payment or refund.
    pub kind: EntryKind,
    /// Debit or credit.
    pub direction: Direction,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Payment method for payments.
    pub method: Option<PaymentMethod>,
    /// Human-readable description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an entry whose direction follows its kind.
    ///
    /// # Errors
    ///
    /// Returns `RentalError::NonPositiveAmount` if `amount` is not above zero
    /// and `RentalError::AmountTooLarge` past [`MAX_AMOUNT`](crate::ledger::balance::MAX_AMOUNT).
    pub fn new(
        party_id: PartyId,
        kind: EntryKind,
        amount: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> RentalResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(RentalError::NonPositiveAmount(amount));
        }
        ensure_within_max(amount)?;
        Ok(Self {
            id: LedgerEntryId::new(),
            party_id,
            booking_id: None,
            date,
            kind,
            direction: kind.direction(),
            amount,
            method: None,
            description: description.into(),
            created_at: Utc::now(),
        })
    }

    /// Ties the entry to a booking.
    #[must_use]
    pub const fn with_booking(mut self, booking_id: BookingId) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    /// Records the payment method.
    #[must_use]
    pub const fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => -self.amount,
        }
    }

    /// Returns true if this is the invoice of the given booking.
    #[must_use]
    pub fn is_invoice_of(&self, booking_id: BookingId) -> bool {
        self.kind == EntryKind::Invoice && self.booking_id == Some(booking_id)
    }
}

/// A payment received from a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount received; must be positive.
    pub amount: Decimal,
    /// How it was paid.
    #[serde(default)]
    pub method: PaymentMethod,
    /// Business date; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Description; a default is written when absent.
    #[serde(default)]
    pub description: Option<String>,
}

/// Money credited back to a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Amount refunded; must be positive.
    pub amount: Decimal,
    /// Business date; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Description; a default is written when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Booking the refund relates to.
    #[serde(default)]
    pub booking_id: Option<BookingId>,
}
