//! Transaction log: the append-style record of ledger entries.

use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;

use crate::error::{RentalError, RentalResult};
use crate::ledger::balance::{checked_sum, ensure_within_max};
use crate::ledger::entry::LedgerEntry;

/// Ledger entries in insertion order.
///
/// Appending and deleting never touch party balances. Every append is paired
/// by the engine with one balance adjustment of the entry's signed amount, and
/// every delete with the opposite adjustment.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<LedgerEntry>,
}

impl TransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns a copy of it.
    pub fn append(&mut self, entry: LedgerEntry) -> LedgerEntry {
        self.entries.push(entry.clone());
        entry
    }

    /// Looks up an entry.
    pub fn get(&self, id: LedgerEntryId) -> RentalResult<&LedgerEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(RentalError::EntryNotFound(id))
    }

    /// All entries by date, ties in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<LedgerEntry> {
        by_date(self.entries.iter())
    }

    /// A party's entries by date, ties in insertion order.
    #[must_use]
    pub fn list_by_party(&self, party_id: PartyId) -> Vec<LedgerEntry> {
        by_date(self.entries.iter().filter(|entry| entry.party_id == party_id))
    }

    /// A booking's entries by date, ties in insertion order.
    #[must_use]
    pub fn list_by_booking(&self, booking_id: BookingId) -> Vec<LedgerEntry> {
        by_date(
            self.entries
                .iter()
                .filter(|entry| entry.booking_id == Some(booking_id)),
        )
    }

    /// The invoice of a booking, if it has one.
    #[must_use]
    pub fn invoice_for(&self, booking_id: BookingId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|entry| entry.is_invoice_of(booking_id))
    }

    /// Removes an entry and returns it.
    pub fn delete(&mut self, id: LedgerEntryId) -> RentalResult<LedgerEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(RentalError::EntryNotFound(id))?;
        Ok(self.entries.remove(index))
    }

    /// Removes every entry tied to a booking and returns them.
    pub fn remove_by_booking(&mut self, booking_id: BookingId) -> Vec<LedgerEntry> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.booking_id == Some(booking_id));
        self.entries = kept;
        removed
    }

    /// Overwrites a booking's invoice with a new party and amount.
    ///
    /// Returns the invoice as it was before the rewrite.
    pub fn rewrite_invoice(
        &mut self,
        booking_id: BookingId,
        party_id: PartyId,
        amount: Decimal,
    ) -> RentalResult<LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(RentalError::NonPositiveAmount(amount));
        }
        ensure_within_max(amount)?;
        let invoice = self
            .entries
            .iter_mut()
            .find(|entry| entry.is_invoice_of(booking_id))
            .ok_or(RentalError::MissingInvoice(booking_id))?;
        let previous = invoice.clone();
        invoice.party_id = party_id;
        invoice.amount = amount;
        Ok(previous)
    }

    /// Sum of a party's signed amounts.
    pub fn recompute_balance(&self, party_id: PartyId) -> RentalResult<Decimal> {
        checked_sum(
            self.entries
                .iter()
                .filter(|entry| entry.party_id == party_id)
                .map(LedgerEntry::signed_amount),
        )
    }

    /// Raw entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn by_date<'a>(entries: impl Iterator<Item = &'a LedgerEntry>) -> Vec<LedgerEntry> {
    let mut sorted: Vec<LedgerEntry> = entries.cloned().collect();
    sorted.sort_by_key(|entry| entry.date);
    sorted
}
