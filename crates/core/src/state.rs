//! The explicit container for all rental records.

use std::collections::BTreeMap;

use rentdesk_shared::types::BookingId;

use crate::booking::types::Booking;
use crate::error::{RentalError, RentalResult};
use crate::inventory::InventoryRegistry;
use crate::ledger::{ReconciliationReport, TransactionLog, reconcile};
use crate::party::PartyLedger;
use crate::user::UserDirectory;

/// Inventory, parties, bookings and the transaction log, kept together so
/// an operation can be applied to a copy and swapped in whole.
#[derive(Debug, Clone, Default)]
pub struct RentalState {
    /// Rentable items.
    pub inventory: InventoryRegistry,
    /// Customers and suppliers.
    pub parties: PartyLedger,
    /// Bookings by id (creation order).
    pub bookings: BTreeMap<BookingId, Booking>,
    /// Ledger entries.
    pub log: TransactionLog,
    /// Operator accounts.
    pub users: UserDirectory,
}

impl RentalState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a booking.
    pub fn booking(&self, id: BookingId) -> RentalResult<&Booking> {
        self.bookings.get(&id).ok_or(RentalError::BookingNotFound(id))
    }

    /// Looks up a booking for modification.
    pub fn booking_mut(&mut self, id: BookingId) -> RentalResult<&mut Booking> {
        self.bookings
            .get_mut(&id)
            .ok_or(RentalError::BookingNotFound(id))
    }

    /// Compares every stored party balance with the transaction log.
    pub fn verify_balances(&self) -> RentalResult<ReconciliationReport> {
        reconcile(self.parties.iter(), self.log.entries())
    }
}
