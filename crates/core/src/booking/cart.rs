//! Selection staging for a booking before it is submitted.

use chrono::NaiveDate;
use rentdesk_shared::types::{ItemId, PartyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::pricing::rental_days;
use crate::booking::types::{Booking, BookingRequest};
use crate::error::{RentalError, RentalResult};
use crate::inventory::InventoryItem;
use crate::ledger::balance::checked_add;

/// An item staged in the cart with the rate shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Item id.
    pub item_id: ItemId,
    /// Item name.
    pub name: String,
    /// Daily rate at staging time.
    pub daily_rate: Decimal,
}

/// Party, dates and items being assembled into a booking request.
///
/// The cart only previews totals. The engine reprices at current rates when
/// the request is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCart {
    party_id: Option<PartyId>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    items: Vec<CartItem>,
    notes: Option<String>,
}

impl BookingCart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an existing booking for editing.
    #[must_use]
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            party_id: Some(booking.party_id),
            start_date: Some(booking.start_date),
            end_date: Some(booking.end_date),
            items: booking
                .lines
                .iter()
                .map(|line| CartItem {
                    item_id: line.item_id,
                    name: line.item_name.clone(),
                    daily_rate: line.daily_rate,
                })
                .collect(),
            notes: booking.notes.clone(),
        }
    }

    /// Selects the renting party.
    pub fn set_party(&mut self, party_id: PartyId) {
        self.party_id = Some(party_id);
    }

    /// Sets the rental period.
    ///
    /// # Errors
    ///
    /// Returns `RentalError::InvalidDateRange` if `end` is before `start`.
    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) -> RentalResult<()> {
        rental_days(start, end)?;
        self.start_date = Some(start);
        self.end_date = Some(end);
        Ok(())
    }

    /// Sets the notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    /// Stages an item. Adding an item twice does nothing.
    pub fn add_item(&mut self, item: &InventoryItem) {
        if self.contains(item.id) {
            return;
        }
        self.items.push(CartItem {
            item_id: item.id,
            name: item.name.clone(),
            daily_rate: item.daily_rate,
        });
    }

    /// Unstages an item. Returns true if it was in the cart.
    pub fn remove_item(&mut self, item_id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|staged| staged.item_id != item_id);
        self.items.len() != before
    }

    /// Returns true if the item is staged.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.items.iter().any(|staged| staged.item_id == item_id)
    }

    /// Staged items in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Billable days for the staged dates, if both are set.
    #[must_use]
    pub fn day_count(&self) -> Option<u32> {
        let (start, end) = self.start_date.zip(self.end_date)?;
        rental_days(start, end).ok()
    }

    /// Preview of the booking total. Zero until dates are set.
    pub fn running_total(&self) -> RentalResult<Decimal> {
        let Some(days) = self.day_count() else {
            return Ok(Decimal::ZERO);
        };
        let days = Decimal::from(days);
        self.items.iter().try_fold(Decimal::ZERO, |total, staged| {
            let line = staged
                .daily_rate
                .checked_mul(days)
                .ok_or(RentalError::AmountOverflow)?;
            checked_add(total, line)
        })
    }

    /// Turns the cart into a request for the booking engine.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing piece.
    pub fn to_request(&self) -> RentalResult<BookingRequest> {
        let party_id = self.party_id.ok_or(RentalError::NoPartySelected)?;
        let (start_date, end_date) = self
            .start_date
            .zip(self.end_date)
            .ok_or(RentalError::NoDatesSelected)?;
        if self.items.is_empty() {
            return Err(RentalError::EmptySelection);
        }
        Ok(BookingRequest {
            party_id,
            item_ids: self.items.iter().map(|staged| staged.item_id).collect(),
            start_date,
            end_date,
            notes: self.notes.clone(),
        })
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
