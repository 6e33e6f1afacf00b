//! Booking operations of the rental repository.
//!
//! Each write loads the rows it touches with an exclusive lock, runs the
//! shared booking rules against them and writes inventory, ledger and
//! balance changes inside the same transaction.

use chrono::Utc;
use rentdesk_core::booking::{
    Booking, BookingAction, BookingFilter, BookingLine, BookingRequest, BookingStatus,
    BookingWorkflow, RevenueSummary, price_line, rules, total_of,
};
use rentdesk_core::inventory::ItemStatus;
use rentdesk_core::ledger::{EntryKind, LedgerEntry, ensure_within_max};
use rentdesk_shared::types::{BookingId, ItemId, PartyId};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::info;

use super::store::{
    adjust_balance, delete_booking_row, insert_booking, invoice_for, load_booking, load_entries,
    load_item, load_party, post, release_items, replace_booking, save_booking_header, save_entry,
    set_items_status, unpost,
};
use super::{RentalRepository, RepositoryResult, non_blank, today};
use crate::entities::{booking_lines, bookings, decode, ledger_entries};

impl RentalRepository {
    /// Creates an active booking: items become rented, an invoice is
    /// posted and the party's balance grows by the total.
    ///
    /// # Errors
    ///
    /// Returns an error if any precondition fails or the database operation
    /// fails. Nothing is written in either case.
    pub async fn create_booking(&self, request: BookingRequest) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let pending = open_booking(&txn, request).await?;
        let booking = activate(&txn, pending).await?;
        txn.commit().await?;

        info!(
            booking_id = %booking.id,
            party_id = %booking.party_id,
            total = %booking.total_amount,
            "Booking created"
        );
        Ok(booking)
    }

    /// Holds a booking as pending, with no inventory or ledger effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or the insert fails.
    pub async fn reserve_booking(&self, request: BookingRequest) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let booking = open_booking(&txn, request).await?;
        txn.commit().await?;

        info!(booking_id = %booking.id, party_id = %booking.party_id, "Booking reserved");
        Ok(booking)
    }

    /// Turns a pending booking into an active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is not pending, an item is no longer
    /// available, the party cannot book, or the database operation fails.
    pub async fn activate_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let current = load_booking(&txn, id, true).await?;
        BookingWorkflow::next_status(current.status, BookingAction::Activate)?;
        let booking = activate(&txn, current).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Booking activated");
        Ok(booking)
    }

    /// Replaces a booking's party, items, dates and notes, repricing at
    /// current rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is closed, the request is invalid, or
    /// the database operation fails.
    pub async fn edit_booking(
        &self,
        id: BookingId,
        request: BookingRequest,
    ) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let booking = edit(&txn, id, request).await?;
        txn.commit().await?;

        info!(booking_id = %id, total = %booking.total_amount, "Booking edited");
        Ok(booking)
    }

    /// Marks an active booking completed and releases its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is pending or cancelled, or the
    /// database operation fails.
    pub async fn return_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let current = load_booking(&txn, id, true).await?;
        let status = BookingWorkflow::next_status(current.status, BookingAction::Return)?;
        release_items(&txn, id, &current.item_ids()).await?;
        let booking = finish(&txn, current, status).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Booking returned");
        Ok(booking)
    }

    /// Cancels a pending or active booking.
    ///
    /// An active booking releases its items and its invoice is offset by a
    /// refund of the same amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is already closed or the database
    /// operation fails.
    pub async fn cancel_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let current = load_booking(&txn, id, true).await?;
        let status = BookingWorkflow::next_status(current.status, BookingAction::Cancel)?;
        if current.status == BookingStatus::Active {
            release_items(&txn, id, &current.item_ids()).await?;
            if let Some(invoice) = invoice_for(&txn, id).await? {
                let refund = LedgerEntry::new(
                    invoice.party_id,
                    EntryKind::Refund,
                    invoice.amount,
                    today(),
                    format!("Cancellation of booking {id}"),
                )?
                .with_booking(id);
                post(&txn, refund).await?;
            }
        }
        let booking = finish(&txn, current, status).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Booking cancelled");
        Ok(booking)
    }

    /// Removes a booking: items are released and every entry tied to the
    /// booking is removed with its balance effect reversed.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing or the database operation
    /// fails.
    pub async fn delete_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        let txn = self.db.begin().await?;
        let current = load_booking(&txn, id, true).await?;
        BookingWorkflow::next_status(current.status, BookingAction::Delete)?;

        release_items(&txn, id, &current.item_ids()).await?;
        let condition = Condition::all().add(ledger_entries::Column::BookingId.eq(id.into_inner()));
        for entry in load_entries(&txn, condition).await? {
            unpost(&txn, &entry).await?;
        }
        delete_booking_row(&txn, id).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Booking deleted");
        Ok(current)
    }

    /// Looks up a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing or the query fails.
    pub async fn get_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        load_booking(&self.db, id, false).await
    }

    /// Lists bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_bookings(&self, filter: &BookingFilter) -> RepositoryResult<Vec<Booking>> {
        let mut query = bookings::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(bookings::Column::Status.eq(status.as_str()));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(bookings::Column::PartyId.eq(party_id.into_inner()));
        }
        let models = query
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await?;

        let ids: Vec<_> = models.iter().map(|model| model.id).collect();
        let mut lines = booking_lines::Entity::find()
            .filter(booking_lines::Column::BookingId.is_in(ids))
            .order_by_asc(booking_lines::Column::Position)
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(models.len());
        for model in models {
            let (own, rest): (Vec<_>, Vec<_>) =
                lines.into_iter().partition(|line| line.booking_id == model.id);
            lines = rest;
            result.push(model.into_domain(own)?);
        }
        Ok(result)
    }

    /// Booking value per lifecycle stage, read from the booking headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails, a stored status is unknown, or a
    /// sum leaves the decimal range.
    pub async fn revenue(&self) -> RepositoryResult<RevenueSummary> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
            .all(&self.db)
            .await?;

        let mut summary = RevenueSummary::default();
        for model in models {
            let status = decode(BookingStatus::parse(&model.status), "status", &model.status)?;
            summary.record(status, model.total_amount)?;
        }
        Ok(summary)
    }
}

/// Validates a request against the current rows and prices its lines.
async fn price_request(
    txn: &DatabaseTransaction,
    request: &BookingRequest,
    editing: Option<&Booking>,
) -> RepositoryResult<(Vec<BookingLine>, Decimal)> {
    let validated = rules::validate_request(request)?;
    let mut lines = Vec::with_capacity(validated.item_ids.len());
    for item_id in validated.item_ids {
        let item = load_item(txn, item_id, true).await?;
        let on_booking = editing.is_some_and(|booking| booking.holds(item_id));
        rules::ensure_item_bookable(&item, on_booking)?;
        lines.push(price_line(&item, validated.days)?);
    }
    let total = total_of(&lines)?;
    Ok((lines, total))
}

/// Inserts a pending booking for a validated request.
async fn open_booking(
    txn: &DatabaseTransaction,
    request: BookingRequest,
) -> RepositoryResult<Booking> {
    let party = load_party(txn, request.party_id, false).await?;
    rules::ensure_party_can_book(&party)?;
    let (lines, total_amount) = price_request(txn, &request, None).await?;

    let now = Utc::now();
    let booking = Booking {
        id: BookingId::new(),
        party_id: request.party_id,
        party_name: party.name,
        lines,
        start_date: request.start_date,
        end_date: request.end_date,
        total_amount,
        status: BookingStatus::Pending,
        notes: non_blank(request.notes),
        created_at: now,
        updated_at: now,
    };
    insert_booking(txn, &booking).await?;
    Ok(booking)
}

/// Applies a booking's inventory and ledger effects and marks it active.
async fn activate(txn: &DatabaseTransaction, booking: Booking) -> RepositoryResult<Booking> {
    let party = load_party(txn, booking.party_id, true).await?;
    rules::ensure_party_can_book(&party)?;
    rules::ensure_credit(&party, booking.total_amount)?;
    for line in &booking.lines {
        let item = load_item(txn, line.item_id, true).await?;
        rules::ensure_item_bookable(&item, false)?;
    }

    set_items_status(txn, &booking.item_ids(), ItemStatus::Rented).await?;
    post_invoice(txn, booking.id, booking.party_id, booking.total_amount).await?;
    finish(txn, booking, BookingStatus::Active).await
}

async fn edit(
    txn: &DatabaseTransaction,
    id: BookingId,
    request: BookingRequest,
) -> RepositoryResult<Booking> {
    let current = load_booking(txn, id, true).await?;
    let status = BookingWorkflow::next_status(current.status, BookingAction::Edit)?;

    let party = load_party(txn, request.party_id, true).await?;
    rules::ensure_party_can_book(&party)?;
    let (lines, total_amount) = price_request(txn, &request, Some(&current)).await?;

    if status == BookingStatus::Active {
        let increase = if request.party_id == current.party_id {
            total_amount - current.total_amount
        } else {
            total_amount
        };
        rules::ensure_credit(&party, increase)?;

        let new_ids: Vec<ItemId> = lines.iter().map(|line| line.item_id).collect();
        let dropped = rules::dropped_items(&current.item_ids(), &new_ids);
        release_items(txn, id, &dropped).await?;
        set_items_status(txn, &new_ids, ItemStatus::Rented).await?;
        resync_invoice(txn, id, request.party_id, total_amount).await?;
    }

    let booking = Booking {
        party_id: request.party_id,
        party_name: party.name,
        lines,
        start_date: request.start_date,
        end_date: request.end_date,
        total_amount,
        notes: non_blank(request.notes),
        updated_at: Utc::now(),
        ..current
    };
    replace_booking(txn, &booking).await?;
    Ok(booking)
}

/// Writes the final status of a booking and returns it.
async fn finish(
    txn: &DatabaseTransaction,
    mut booking: Booking,
    status: BookingStatus,
) -> RepositoryResult<Booking> {
    if booking.status != status {
        booking.status = status;
        booking.updated_at = Utc::now();
        save_booking_header(txn, &booking).await?;
    }
    Ok(booking)
}

/// Posts a booking invoice. Zero-value bookings carry none.
async fn post_invoice(
    txn: &DatabaseTransaction,
    booking_id: BookingId,
    party_id: PartyId,
    total: Decimal,
) -> RepositoryResult<()> {
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
    post(txn, invoice).await?;
    Ok(())
}

/// Brings a booking's invoice in line with a new party and total.
async fn resync_invoice(
    txn: &DatabaseTransaction,
    booking_id: BookingId,
    party_id: PartyId,
    total: Decimal,
) -> RepositoryResult<()> {
    match invoice_for(txn, booking_id).await? {
        Some(mut invoice) if total > Decimal::ZERO => {
            ensure_within_max(total)?;
            adjust_balance(txn, invoice.party_id, -invoice.amount).await?;
            adjust_balance(txn, party_id, total).await?;
            invoice.party_id = party_id;
            invoice.amount = total;
            save_entry(txn, &invoice).await
        }
        Some(invoice) => unpost(txn, &invoice).await,
        None => post_invoice(txn, booking_id, party_id, total).await,
    }
}
