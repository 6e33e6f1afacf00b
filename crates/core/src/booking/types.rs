//! Booking domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rentdesk_shared::types::{BookingId, ItemId, PartyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RentalResult;
use crate::ledger::balance::checked_add;

/// Booking status in the rental lifecycle.
///
/// Valid transitions:
/// - Pending → Active (activate)
/// - Pending | Active → Cancelled (cancel)
/// - Active → Completed (return)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Held without reserving inventory or invoicing.
    Pending,
    /// Items are out and the invoice is posted.
    Active,
    /// Items came back.
    Completed,
    /// Called off; history is kept.
    Cancelled,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the booking still holds or may hold its items.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator action on an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    /// Change party, items, dates or notes.
    Edit,
    /// Turn a held booking into an active one.
    Activate,
    /// Take the items back.
    Return,
    /// Call the booking off.
    Cancel,
    /// Remove the booking and its entries.
    Delete,
}

impl BookingAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Activate => "activate",
            Self::Return => "return",
            Self::Cancel => "cancel",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item on a booking, priced at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLine {
    /// The item.
    pub item_id: ItemId,
    /// Item name when the line was priced.
    pub item_name: String,
    /// Daily rate when the line was priced.
    pub daily_rate: Decimal,
    /// Rental days.
    pub days: u32,
    /// `daily_rate × days`.
    pub line_total: Decimal,
}

/// A rental of one or more items to a party over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// The renting party.
    pub party_id: PartyId,
    /// Party name when the booking was last written.
    pub party_name: String,
    /// Priced lines, in selection order.
    pub lines: Vec<BookingLine>,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Sum of line totals.
    pub total_amount: Decimal,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Item ids in line order.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }

    /// Returns true if the booking lists the item.
    #[must_use]
    pub fn holds(&self, item_id: ItemId) -> bool {
        self.lines.iter().any(|line| line.item_id == item_id)
    }
}

/// What the operator asks for when creating, reserving or editing a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// The renting party.
    pub party_id: PartyId,
    /// Selected items; duplicates are collapsed.
    pub item_ids: Vec<ItemId>,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Filter for booking listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingFilter {
    /// Only bookings with this status.
    pub status: Option<BookingStatus>,
    /// Only bookings of this party.
    pub party_id: Option<PartyId>,
}

impl BookingFilter {
    /// Returns true if the booking passes the filter.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.is_none_or(|status| booking.status == status)
            && self.party_id.is_none_or(|party| booking.party_id == party)
    }
}

/// Booking value per lifecycle stage.
///
/// Revenue counts active and completed bookings, the ones whose invoice is
/// posted. Pending holds are reported apart; cancelled bookings count nowhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Active and completed bookings.
    pub invoiced_bookings: usize,
    /// Sum of their totals.
    pub revenue: Decimal,
    /// Pending bookings.
    pub pending_bookings: usize,
    /// Sum of pending totals.
    pub pending_value: Decimal,
}

impl RevenueSummary {
    /// Adds up booking totals by status.
    pub fn tally<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> RentalResult<Self> {
        let mut summary = Self::default();
        for booking in bookings {
            summary.record(booking.status, booking.total_amount)?;
        }
        Ok(summary)
    }

    /// Counts one booking total under its status.
    pub fn record(&mut self, status: BookingStatus, total: Decimal) -> RentalResult<()> {
        match status {
            BookingStatus::Active | BookingStatus::Completed => {
                self.invoiced_bookings += 1;
                self.revenue = checked_add(self.revenue, total)?;
            }
            BookingStatus::Pending => {
                self.pending_bookings += 1;
                self.pending_value = checked_add(self.pending_value, total)?;
            }
            BookingStatus::Cancelled => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RentalError;
    use rust_decimal_macros::dec;

    fn booking(status: BookingStatus, total: Decimal) -> Booking {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Booking {
            id: BookingId::new(),
            party_id: PartyId::new(),
            party_name: "Acme".to_string(),
            lines: Vec::new(),
            start_date: date,
            end_date: date,
            total_amount: total,
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_revenue_counts_invoiced_bookings() {
        let bookings = [
            booking(BookingStatus::Active, dec!(600)),
            booking(BookingStatus::Completed, dec!(250.50)),
            booking(BookingStatus::Pending, dec!(100)),
            booking(BookingStatus::Cancelled, dec!(900)),
        ];

        let summary = RevenueSummary::tally(&bookings).unwrap();

        assert_eq!(summary.invoiced_bookings, 2);
        assert_eq!(summary.revenue, dec!(850.50));
        assert_eq!(summary.pending_bookings, 1);
        assert_eq!(summary.pending_value, dec!(100));
    }

    #[test]
    fn test_revenue_overflow_is_an_error() {
        let bookings = [
            booking(BookingStatus::Active, Decimal::MAX),
            booking(BookingStatus::Completed, Decimal::MAX),
        ];
        assert_eq!(
            RevenueSummary::tally(&bookings),
            Err(RentalError::AmountOverflow)
        );
    }
}
