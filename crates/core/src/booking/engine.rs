//! In-memory booking engine.
//!
//! The engine owns the whole [`RentalState`] behind one mutex. Each write
//! runs against a cloned draft and the draft replaces the state only when
//! every step succeeded, so a failing operation leaves nothing behind.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rentdesk_shared::types::{BookingId, ItemId, LedgerEntryId, PartyId, UserId};
use rust_decimal::Decimal;

use crate::booking::pricing::{price_line, total_of};
use crate::booking::rules;
use crate::booking::types::{
    Booking, BookingAction, BookingFilter, BookingLine, BookingRequest, BookingStatus,
    RevenueSummary,
};
use crate::booking::workflow::BookingWorkflow;
use crate::error::{RentalError, RentalResult};
use crate::inventory::{InventoryItem, InventoryStats, ItemFilter, ItemPatch, ItemStatus, NewItem};
use crate::ledger::{
    EntryKind, LedgerEntry, PaymentRequest, ReconciliationReport, RefundRequest, Statement,
};
use crate::party::{NewParty, Party, PartyFilter, PartyPatch};
use crate::state::RentalState;
use crate::user::{NewUser, User, UserFilter, UserPatch, check_sign_in};

/// Serialized, all-or-nothing access to the rental records.
#[derive(Debug, Default)]
pub struct BookingEngine {
    state: Mutex<RentalState>,
}

impl BookingEngine {
    /// Creates an engine with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine over existing records.
    #[must_use]
    pub fn with_state(state: RentalState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Returns a copy of the current records.
    pub fn snapshot(&self) -> RentalResult<RentalState> {
        self.read(|state| Ok(state.clone()))
    }

    // ========== Inventory ==========

    /// Registers a new item.
    pub fn create_item(&self, input: NewItem) -> RentalResult<InventoryItem> {
        self.transact(|state| state.inventory.create(input))
    }

    /// Updates an item's descriptive fields and rate.
    pub fn update_item(&self, id: ItemId, patch: ItemPatch) -> RentalResult<InventoryItem> {
        self.transact(|state| state.inventory.update(id, patch))
    }

    /// Looks up an item.
    pub fn get_item(&self, id: ItemId) -> RentalResult<InventoryItem> {
        self.read(|state| state.inventory.get(id).cloned())
    }

    /// Lists items.
    pub fn list_items(&self, filter: &ItemFilter) -> RentalResult<Vec<InventoryItem>> {
        self.read(|state| Ok(state.inventory.list(filter)))
    }

    /// Operator status change: `Available`, `Maintenance` or `Retired`.
    ///
    /// Rejected for `Rented` and for items out on an active booking.
    pub fn set_item_status(&self, id: ItemId, status: ItemStatus) -> RentalResult<InventoryItem> {
        self.transact(|state| {
            let item = state.inventory.get(id)?;
            let holder =
                rules::find_holder(state.bookings.values(), id, &[BookingStatus::Active], None);
            rules::ensure_status_settable(item, status, holder)?;
            state.inventory.set_status(id, status)?;
            state.inventory.get(id).cloned()
        })
    }

    /// Soft-deletes an item that no pending or active booking lists.
    pub fn delete_item(&self, id: ItemId) -> RentalResult<()> {
        self.transact(|state| {
            state.inventory.get(id)?;
            let live = [BookingStatus::Pending, BookingStatus::Active];
            if let Some(booking_id) = rules::find_holder(state.bookings.values(), id, &live, None)
            {
                return Err(RentalError::ItemInUse {
                    item_id: id,
                    booking_id,
                });
            }
            state.inventory.delete(id)
        })
    }

    /// Counts live items per status.
    pub fn inventory_stats(&self) -> RentalResult<InventoryStats> {
        self.read(|state| Ok(state.inventory.stats()))
    }

    // ========== Parties ==========

    /// Registers a new party.
    pub fn create_party(&self, input: NewParty) -> RentalResult<Party> {
        self.transact(|state| state.parties.create(input))
    }

    /// Updates a party's details. The balance is untouched.
    pub fn update_party(&self, id: PartyId, patch: PartyPatch) -> RentalResult<Party> {
        self.transact(|state| state.parties.update(id, patch))
    }

    /// Looks up a party.
    pub fn get_party(&self, id: PartyId) -> RentalResult<Party> {
        self.read(|state| state.parties.get(id).cloned())
    }

    /// Lists parties.
    pub fn list_parties(&self, filter: &PartyFilter) -> RentalResult<Vec<Party>> {
        self.read(|state| Ok(state.parties.list(filter)))
    }

    /// Soft-deletes a party, keeping its bookings and entries.
    pub fn delete_party(&self, id: PartyId) -> RentalResult<()> {
        self.transact(|state| state.parties.soft_delete(id))
    }

    // ========== Bookings ==========

    /// Creates an active booking: items become rented, an invoice is
    /// posted and the party's balance grows by the total.
    pub fn create_booking(&self, request: BookingRequest) -> RentalResult<Booking> {
        self.transact(|state| {
            let id = open_booking(state, request)?;
            activate(state, id)
        })
    }

    /// Holds a booking as pending, with no inventory or ledger effect.
    pub fn reserve_booking(&self, request: BookingRequest) -> RentalResult<Booking> {
        self.transact(|state| {
            let id = open_booking(state, request)?;
            state.booking(id).cloned()
        })
    }

    /// Turns a pending booking into an active one.
    pub fn activate_booking(&self, id: BookingId) -> RentalResult<Booking> {
        self.transact(|state| {
            let status = state.booking(id)?.status;
            BookingWorkflow::next_status(status, BookingAction::Activate)?;
            activate(state, id)
        })
    }

    /// Replaces a booking's party, items, dates and notes, repricing at
    /// current rates.
    pub fn edit_booking(&self, id: BookingId, request: BookingRequest) -> RentalResult<Booking> {
        self.transact(|state| edit(state, id, request))
    }

    /// Marks an active booking completed and releases its items.
    ///
    /// Returning a completed booking again only re-releases items.
    pub fn return_booking(&self, id: BookingId) -> RentalResult<Booking> {
        self.transact(|state| {
            let current = state.booking(id)?.clone();
            let status = BookingWorkflow::next_status(current.status, BookingAction::Return)?;
            release_items(state, id, &current.item_ids())?;
            finish(state, id, status)
        })
    }

    /// Cancels a pending or active booking.
    ///
    /// An active booking releases its items and its invoice is offset by a
    /// refund of the same amount.
    pub fn cancel_booking(&self, id: BookingId) -> RentalResult<Booking> {
        self.transact(|state| {
            let current = state.booking(id)?.clone();
            let status = BookingWorkflow::next_status(current.status, BookingAction::Cancel)?;
            if current.status == BookingStatus::Active {
                release_items(state, id, &current.item_ids())?;
                if let Some(invoice) = state.log.invoice_for(id).cloned() {
                    let refund = LedgerEntry::new(
                        invoice.party_id,
                        EntryKind::Refund,
                        invoice.amount,
                        today(),
                        format!("Cancellation of booking {id}"),
                    )?
                    .with_booking(id);
                    post(state, refund)?;
                }
            }
            finish(state, id, status)
        })
    }

    /// Removes a booking: items are released and every entry tied to the
    /// booking is removed with its balance effect reversed.
    pub fn delete_booking(&self, id: BookingId) -> RentalResult<Booking> {
        self.transact(|state| {
            let current = state.booking(id)?.clone();
            BookingWorkflow::next_status(current.status, BookingAction::Delete)?;
            release_items(state, id, &current.item_ids())?;
            for entry in state.log.remove_by_booking(id) {
                unpost(state, &entry)?;
            }
            state.bookings.remove(&id);
            Ok(current)
        })
    }

    /// Looks up a booking.
    pub fn get_booking(&self, id: BookingId) -> RentalResult<Booking> {
        self.read(|state| state.booking(id).cloned())
    }

    /// Lists bookings, newest first.
    pub fn list_bookings(&self, filter: &BookingFilter) -> RentalResult<Vec<Booking>> {
        self.read(|state| {
            let mut bookings: Vec<Booking> = state
                .bookings
                .values()
                .filter(|booking| filter.matches(booking))
                .cloned()
                .collect();
            bookings.sort_by_key(|booking| Reverse((booking.created_at, booking.id)));
            Ok(bookings)
        })
    }

    /// Booking value per lifecycle stage.
    pub fn revenue(&self) -> RentalResult<RevenueSummary> {
        self.read(|state| RevenueSummary::tally(state.bookings.values()))
    }

    // ========== Ledger ==========

    /// Records a payment and lowers the party's balance by its amount.
    pub fn add_payment(&self, party_id: PartyId, request: PaymentRequest) -> RentalResult<LedgerEntry> {
        self.transact(|state| {
            rules::ensure_party_live(state.parties.get(party_id)?)?;
            let description = non_blank(request.description)
                .unwrap_or_else(|| "Payment on account".to_string());
            let entry = LedgerEntry::new(
                party_id,
                EntryKind::Payment,
                request.amount,
                request.date.unwrap_or_else(today),
                description,
            )?
            .with_method(request.method);
            post(state, entry)
        })
    }

    /// Records a refund and lowers the party's balance by its amount.
    pub fn add_refund(&self, party_id: PartyId, request: RefundRequest) -> RentalResult<LedgerEntry> {
        self.transact(|state| {
            rules::ensure_party_live(state.parties.get(party_id)?)?;
            if let Some(booking_id) = request.booking_id {
                rules::ensure_refund_matches(state.booking(booking_id)?, party_id)?;
            }
            let description =
                non_blank(request.description).unwrap_or_else(|| "Refund".to_string());
            let mut entry = LedgerEntry::new(
                party_id,
                EntryKind::Refund,
                request.amount,
                request.date.unwrap_or_else(today),
                description,
            )?;
            if let Some(booking_id) = request.booking_id {
                entry = entry.with_booking(booking_id);
            }
            post(state, entry)
        })
    }

    /// Deletes an entry and reverses its balance effect.
    ///
    /// A booking's invoice goes only with its booking.
    pub fn delete_entry(&self, id: LedgerEntryId) -> RentalResult<LedgerEntry> {
        self.transact(|state| {
            let entry = state.log.get(id)?;
            if entry.kind == EntryKind::Invoice {
                if let Some(booking_id) = entry.booking_id {
                    if state.bookings.contains_key(&booking_id) {
                        return Err(RentalError::InvoiceLocked {
                            entry_id: id,
                            booking_id,
                        });
                    }
                }
            }
            let removed = state.log.delete(id)?;
            unpost(state, &removed)?;
            Ok(removed)
        })
    }

    /// A party's entries by date.
    pub fn entries_for_party(&self, party_id: PartyId) -> RentalResult<Vec<LedgerEntry>> {
        self.read(|state| {
            state.parties.get(party_id)?;
            Ok(state.log.list_by_party(party_id))
        })
    }

    /// A booking's entries by date.
    pub fn entries_for_booking(&self, booking_id: BookingId) -> RentalResult<Vec<LedgerEntry>> {
        self.read(|state| {
            state.booking(booking_id)?;
            Ok(state.log.list_by_booking(booking_id))
        })
    }

    /// Builds a party statement over an optional date range.
    pub fn statement(
        &self,
        party_id: PartyId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RentalResult<Statement> {
        if let (Some(start), Some(end)) = (from, to) {
            if end < start {
                return Err(RentalError::InvalidDateRange { start, end });
            }
        }
        self.read(|state| {
            state.parties.get(party_id)?;
            let entries = state.log.list_by_party(party_id);
            Statement::build(party_id, &entries, from, to)
        })
    }

    /// Sums a party's entries.
    pub fn recompute_balance(&self, party_id: PartyId) -> RentalResult<Decimal> {
        self.read(|state| {
            state.parties.get(party_id)?;
            state.log.recompute_balance(party_id)
        })
    }

    /// Compares every stored balance with the log.
    pub fn verify_balances(&self) -> RentalResult<ReconciliationReport> {
        self.read(RentalState::verify_balances)
    }

    // ========== Users ==========

    /// Creates an operator account. The password is hashed before the lock is taken.
    pub fn create_user(&self, input: NewUser) -> RentalResult<User> {
        let user = input.into_user()?;
        self.transact(|state| state.users.create(user))
    }

    /// Looks up a user, including soft-deleted ones.
    pub fn get_user(&self, id: UserId) -> RentalResult<User> {
        self.read(|state| state.users.get(id).cloned())
    }

    /// Lists users, newest first.
    pub fn list_users(&self, filter: &UserFilter) -> RentalResult<Vec<User>> {
        self.read(|state| Ok(state.users.list(filter)))
    }

    /// Updates a live user.
    pub fn update_user(&self, id: UserId, patch: UserPatch) -> RentalResult<User> {
        let password_hash = patch.hash_new_password()?;
        self.transact(|state| state.users.update(id, patch, password_hash))
    }

    /// Enables or disables a live user.
    pub fn set_user_active(&self, id: UserId, active: bool) -> RentalResult<User> {
        self.transact(|state| state.users.set_active(id, active))
    }

    /// Soft-deletes a user.
    pub fn delete_user(&self, id: UserId) -> RentalResult<()> {
        self.transact(|state| state.users.soft_delete(id))
    }

    /// Checks a username and password and returns the account.
    pub fn authenticate(&self, username: &str, password: &str) -> RentalResult<User> {
        let user = self.read(|state| Ok(state.users.find_by_username(username).cloned()))?;
        check_sign_in(user.as_ref(), password)?;
        user.ok_or(RentalError::InvalidCredentials)
    }

    // ========== Plumbing ==========

    fn lock(&self) -> RentalResult<MutexGuard<'_, RentalState>> {
        self.state.lock().map_err(|_| RentalError::StateUnavailable)
    }

    fn read<T>(&self, op: impl FnOnce(&RentalState) -> RentalResult<T>) -> RentalResult<T> {
        let guard = self.lock()?;
        op(&guard)
    }

    fn transact<T>(&self, op: impl FnOnce(&mut RentalState) -> RentalResult<T>) -> RentalResult<T> {
        let mut guard = self.lock()?;
        let mut draft = guard.clone();
        let value = op(&mut draft)?;
        *guard = draft;
        Ok(value)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}

/// Validates a request against the current records and prices its lines.
fn price_request(
    state: &RentalState,
    request: &BookingRequest,
    editing: Option<&Booking>,
) -> RentalResult<(Vec<BookingLine>, Decimal)> {
    let validated = rules::validate_request(request)?;
    let mut lines = Vec::with_capacity(validated.item_ids.len());
    for item_id in validated.item_ids {
        let item = state.inventory.get(item_id)?;
        let on_booking = editing.is_some_and(|booking| booking.holds(item_id));
        rules::ensure_item_bookable(item, on_booking)?;
        lines.push(price_line(item, validated.days)?);
    }
    let total = total_of(&lines)?;
    Ok((lines, total))
}

/// Inserts a pending booking for a validated request.
fn open_booking(state: &mut RentalState, request: BookingRequest) -> RentalResult<BookingId> {
    let party = state.parties.get(request.party_id)?;
    rules::ensure_party_can_book(party)?;
    let party_name = party.name.clone();
    let (lines, total_amount) = price_request(state, &request, None)?;

    let now = Utc::now();
    let booking = Booking {
        id: BookingId::new(),
        party_id: request.party_id,
        party_name,
        lines,
        start_date: request.start_date,
        end_date: request.end_date,
        total_amount,
        status: BookingStatus::Pending,
        notes: non_blank(request.notes),
        created_at: now,
        updated_at: now,
    };
    let id = booking.id;
    state.bookings.insert(id, booking);
    Ok(id)
}

/// Applies a booking's inventory and ledger effects and marks it active.
fn activate(state: &mut RentalState, id: BookingId) -> RentalResult<Booking> {
    let booking = state.booking(id)?.clone();
    let party = state.parties.get(booking.party_id)?;
    rules::ensure_party_can_book(party)?;
    rules::ensure_credit(party, booking.total_amount)?;
    for line in &booking.lines {
        rules::ensure_item_bookable(state.inventory.get(line.item_id)?, false)?;
    }

    state
        .inventory
        .bulk_set_status(&booking.item_ids(), ItemStatus::Rented)?;
    post_invoice(state, id, booking.party_id, booking.total_amount)?;
    finish(state, id, BookingStatus::Active)
}

fn edit(state: &mut RentalState, id: BookingId, request: BookingRequest) -> RentalResult<Booking> {
    let current = state.booking(id)?.clone();
    let status = BookingWorkflow::next_status(current.status, BookingAction::Edit)?;

    let party = state.parties.get(request.party_id)?;
    rules::ensure_party_can_book(party)?;
    let party_name = party.name.clone();
    let (lines, total_amount) = price_request(state, &request, Some(&current))?;

    if status == BookingStatus::Active {
        let increase = if request.party_id == current.party_id {
            total_amount - current.total_amount
        } else {
            total_amount
        };
        rules::ensure_credit(state.parties.get(request.party_id)?, increase)?;

        let new_ids: Vec<ItemId> = lines.iter().map(|line| line.item_id).collect();
        let dropped = rules::dropped_items(&current.item_ids(), &new_ids);
        release_items(state, id, &dropped)?;
        state.inventory.bulk_set_status(&new_ids, ItemStatus::Rented)?;
        resync_invoice(state, id, request.party_id, total_amount)?;
    }

    let booking = state.booking_mut(id)?;
    booking.party_id = request.party_id;
    booking.party_name = party_name;
    booking.lines = lines;
    booking.start_date = request.start_date;
    booking.end_date = request.end_date;
    booking.total_amount = total_amount;
    booking.notes = non_blank(request.notes);
    booking.updated_at = Utc::now();
    Ok(booking.clone())
}

/// Sets the final status of a booking and returns it.
fn finish(state: &mut RentalState, id: BookingId, status: BookingStatus) -> RentalResult<Booking> {
    let booking = state.booking_mut(id)?;
    if booking.status != status {
        booking.status = status;
        booking.updated_at = Utc::now();
    }
    Ok(booking.clone())
}

/// Flips rented candidates back to available unless another active booking
/// still holds them.
fn release_items(
    state: &mut RentalState,
    booking_id: BookingId,
    candidates: &[ItemId],
) -> RentalResult<()> {
    let free: Vec<ItemId> = rules::releasable(candidates, state.bookings.values(), booking_id)
        .into_iter()
        .filter(|id| {
            state
                .inventory
                .get(*id)
                .is_ok_and(|item| item.status == ItemStatus::Rented)
        })
        .collect();
    state.inventory.bulk_set_status(&free, ItemStatus::Available)
}

/// Appends an entry and applies its signed amount to the party.
fn post(state: &mut RentalState, entry: LedgerEntry) -> RentalResult<LedgerEntry> {
    state
        .parties
        .adjust_balance(entry.party_id, entry.signed_amount())?;
    Ok(state.log.append(entry))
}

/// Reverses the balance effect of an entry already taken out of the log.
fn unpost(state: &mut RentalState, entry: &LedgerEntry) -> RentalResult<()> {
    state
        .parties
        .adjust_balance(entry.party_id, -entry.signed_amount())?;
    Ok(())
}

/// Posts a booking invoice. Zero-value bookings carry none.
fn post_invoice(
    state: &mut RentalState,
    booking_id: BookingId,
    party_id: PartyId,
    total: Decimal,
) -> RentalResult<()> {
    if total <= Decimal::ZERO {
        return Ok(());
    }
    let invoice = LedgerEntry::new(
        party_id,
        EntryKind::Invoice,
        total,
        today(),
        format!("Booking {booking_id}"),
    )?
    .with_booking(booking_id);
    post(state, invoice)?;
    Ok(())
}

/// Brings a booking's invoice in line with a new party and total.
fn resync_invoice(
    state: &mut RentalState,
    booking_id: BookingId,
    party_id: PartyId,
    total: Decimal,
) -> RentalResult<()> {
    match state.log.invoice_for(booking_id).cloned() {
        Some(_) if total > Decimal::ZERO => {
            let previous = state.log.rewrite_invoice(booking_id, party_id, total)?;
            state
                .parties
                .adjust_balance(previous.party_id, -previous.amount)?;
            state.parties.adjust_balance(party_id, total)?;
            Ok(())
        }
        Some(invoice) => {
            let removed = state.log.delete(invoice.id)?;
            unpost(state, &removed)
        }
        None => post_invoice(state, booking_id, party_id, total),
    }
}
