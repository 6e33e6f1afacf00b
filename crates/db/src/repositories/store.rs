//! Row-level building blocks shared by the rental repository operations.
//!
//! Every function takes a connection so the same code runs against a pool
//! for reads and inside a `DatabaseTransaction` for writes.

use chrono::Utc;
use rentdesk_core::booking::{Booking, BookingStatus, rules};
use rentdesk_core::inventory::{InventoryItem, ItemStatus};
use rentdesk_core::ledger::{EntryKind, LedgerEntry, checked_add};
use rentdesk_core::party::Party;
use rentdesk_core::RentalError;
use rentdesk_shared::types::{BookingId, ItemId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use super::RepositoryResult;
use crate::entities::{booking_lines, bookings, items, ledger_entries, parties};

// ========== Items ==========

/// Loads an item, optionally locking its row for the rest of the transaction.
pub(super) async fn load_item<C: ConnectionTrait>(
    conn: &C,
    id: ItemId,
    lock: bool,
) -> RepositoryResult<InventoryItem> {
    let mut query = items::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let model = query.one(conn).await?.ok_or(RentalError::ItemNotFound(id))?;
    Ok(model.into_domain()?)
}

pub(super) async fn save_item<C: ConnectionTrait>(
    conn: &C,
    item: &InventoryItem,
) -> RepositoryResult<()> {
    items::ActiveModel::from(item).update(conn).await?;
    Ok(())
}

/// Writes one status to several items.
pub(super) async fn set_items_status<C: ConnectionTrait>(
    conn: &C,
    ids: &[ItemId],
    status: ItemStatus,
) -> RepositoryResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    items::Entity::update_many()
        .col_expr(items::Column::Status, Expr::value(status.as_str()))
        .col_expr(items::Column::UpdatedAt, Expr::value(now))
        .filter(items::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .exec(conn)
        .await?;
    Ok(())
}

// ========== Parties ==========

/// Loads a party, optionally locking its row for the rest of the transaction.
pub(super) async fn load_party<C: ConnectionTrait>(
    conn: &C,
    id: PartyId,
    lock: bool,
) -> RepositoryResult<Party> {
    let mut query = parties::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let model = query.one(conn).await?.ok_or(RentalError::PartyNotFound(id))?;
    Ok(model.into_domain()?)
}

pub(super) async fn save_party<C: ConnectionTrait>(conn: &C, party: &Party) -> RepositoryResult<()> {
    parties::ActiveModel::from(party).update(conn).await?;
    Ok(())
}

/// Adds `delta` to a party's stored balance and returns the new balance.
pub(super) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    id: PartyId,
    delta: Decimal,
) -> RepositoryResult<Decimal> {
    let mut party = load_party(conn, id, true).await?;
    party.balance = checked_add(party.balance, delta)?;
    party.updated_at = Utc::now();
    save_party(conn, &party).await?;
    Ok(party.balance)
}

// ========== Bookings ==========

/// Loads a booking with its lines in position order.
pub(super) async fn load_booking<C: ConnectionTrait>(
    conn: &C,
    id: BookingId,
    lock: bool,
) -> RepositoryResult<Booking> {
    let mut query = bookings::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let model = query
        .one(conn)
        .await?
        .ok_or(RentalError::BookingNotFound(id))?;
    let lines = booking_lines::Entity::find()
        .filter(booking_lines::Column::BookingId.eq(model.id))
        .order_by_asc(booking_lines::Column::Position)
        .all(conn)
        .await?;
    Ok(model.into_domain(lines)?)
}

pub(super) async fn booking_exists<C: ConnectionTrait>(
    conn: &C,
    id: BookingId,
) -> RepositoryResult<bool> {
    Ok(bookings::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .is_some())
}

async fn insert_lines<C: ConnectionTrait>(conn: &C, booking: &Booking) -> RepositoryResult<()> {
    for (position, line) in booking.lines.iter().enumerate() {
        booking_lines::active_model(booking.id, position, line)
            .insert(conn)
            .await?;
    }
    Ok(())
}

async fn delete_lines<C: ConnectionTrait>(conn: &C, id: BookingId) -> RepositoryResult<()> {
    booking_lines::Entity::delete_many()
        .filter(booking_lines::Column::BookingId.eq(id.into_inner()))
        .exec(conn)
        .await?;
    Ok(())
}

pub(super) async fn insert_booking<C: ConnectionTrait>(
    conn: &C,
    booking: &Booking,
) -> RepositoryResult<()> {
    bookings::ActiveModel::from(booking).insert(conn).await?;
    insert_lines(conn, booking).await
}

/// Overwrites a booking row and replaces its lines.
pub(super) async fn replace_booking<C: ConnectionTrait>(
    conn: &C,
    booking: &Booking,
) -> RepositoryResult<()> {
    bookings::ActiveModel::from(booking).update(conn).await?;
    delete_lines(conn, booking.id).await?;
    insert_lines(conn, booking).await
}

/// Overwrites a booking row, leaving its lines alone.
pub(super) async fn save_booking_header<C: ConnectionTrait>(
    conn: &C,
    booking: &Booking,
) -> RepositoryResult<()> {
    bookings::ActiveModel::from(booking).update(conn).await?;
    Ok(())
}

pub(super) async fn delete_booking_row<C: ConnectionTrait>(
    conn: &C,
    id: BookingId,
) -> RepositoryResult<()> {
    delete_lines(conn, id).await?;
    bookings::Entity::delete_by_id(id.into_inner())
        .exec(conn)
        .await?;
    Ok(())
}

/// Bookings other than `exclude` with one of `statuses` that list any of the items.
pub(super) async fn bookings_holding<C: ConnectionTrait>(
    conn: &C,
    item_ids: &[ItemId],
    statuses: &[BookingStatus],
    exclude: Option<BookingId>,
) -> RepositoryResult<Vec<Booking>> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let lines = booking_lines::Entity::find()
        .join(JoinType::InnerJoin, booking_lines::Relation::Bookings.def())
        .filter(booking_lines::Column::ItemId.is_in(item_ids.iter().map(|id| id.into_inner())))
        .filter(bookings::Column::Status.is_in(statuses.iter().map(BookingStatus::as_str)))
        .all(conn)
        .await?;

    let mut booking_ids: Vec<Uuid> = lines.into_iter().map(|line| line.booking_id).collect();
    booking_ids.sort_unstable();
    booking_ids.dedup();

    let mut holders = Vec::with_capacity(booking_ids.len());
    for id in booking_ids.into_iter().map(BookingId::from_uuid) {
        if Some(id) != exclude {
            holders.push(load_booking(conn, id, false).await?);
        }
    }
    Ok(holders)
}

/// First booking other than `exclude` with one of `statuses` listing the item.
pub(super) async fn find_holder<C: ConnectionTrait>(
    conn: &C,
    item_id: ItemId,
    statuses: &[BookingStatus],
    exclude: Option<BookingId>,
) -> RepositoryResult<Option<BookingId>> {
    let holders = bookings_holding(conn, &[item_id], statuses, exclude).await?;
    Ok(rules::find_holder(&holders, item_id, statuses, exclude))
}

/// Flips rented candidates back to available unless another active booking
/// still holds them.
pub(super) async fn release_items<C: ConnectionTrait>(
    conn: &C,
    booking_id: BookingId,
    candidates: &[ItemId],
) -> RepositoryResult<()> {
    let holders =
        bookings_holding(conn, candidates, &[BookingStatus::Active], Some(booking_id)).await?;
    let mut free = Vec::new();
    for id in rules::releasable(candidates, &holders, booking_id) {
        if load_item(conn, id, true).await?.status == ItemStatus::Rented {
            free.push(id);
        }
    }
    set_items_status(conn, &free, ItemStatus::Available).await
}

// ========== Ledger ==========

fn by_date(query: sea_orm::Select<ledger_entries::Entity>) -> sea_orm::Select<ledger_entries::Entity> {
    query
        .order_by_asc(ledger_entries::Column::EntryDate)
        .order_by_asc(ledger_entries::Column::CreatedAt)
        .order_by_asc(ledger_entries::Column::Id)
}

/// Entries matching `condition`, by date with ties in insertion order.
pub(super) async fn load_entries<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> RepositoryResult<Vec<LedgerEntry>> {
    let models = by_date(ledger_entries::Entity::find().filter(condition))
        .all(conn)
        .await?;
    let entries = models
        .into_iter()
        .map(ledger_entries::Model::into_domain)
        .collect::<Result<_, _>>()?;
    Ok(entries)
}

pub(super) async fn load_entry<C: ConnectionTrait>(
    conn: &C,
    id: LedgerEntryId,
) -> RepositoryResult<LedgerEntry> {
    let model = ledger_entries::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(RentalError::EntryNotFound(id))?;
    Ok(model.into_domain()?)
}

pub(super) async fn invoice_for<C: ConnectionTrait>(
    conn: &C,
    booking_id: BookingId,
) -> RepositoryResult<Option<LedgerEntry>> {
    let model = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::BookingId.eq(booking_id.into_inner()))
        .filter(ledger_entries::Column::Kind.eq(EntryKind::Invoice.as_str()))
        .one(conn)
        .await?;
    Ok(model.map(ledger_entries::Model::into_domain).transpose()?)
}

/// Appends an entry and applies its signed amount to the party.
pub(super) async fn post<C: ConnectionTrait>(
    conn: &C,
    entry: LedgerEntry,
) -> RepositoryResult<LedgerEntry> {
    adjust_balance(conn, entry.party_id, entry.signed_amount()).await?;
    ledger_entries::ActiveModel::from(&entry).insert(conn).await?;
    Ok(entry)
}

/// Deletes an entry and reverses its balance effect.
pub(super) async fn unpost<C: ConnectionTrait>(conn: &C, entry: &LedgerEntry) -> RepositoryResult<()> {
    ledger_entries::Entity::delete_by_id(entry.id.into_inner())
        .exec(conn)
        .await?;
    adjust_balance(conn, entry.party_id, -entry.signed_amount()).await?;
    Ok(())
}

/// Overwrites an entry's party and amount in place.
pub(super) async fn save_entry<C: ConnectionTrait>(
    conn: &C,
    entry: &LedgerEntry,
) -> RepositoryResult<()> {
    ledger_entries::ActiveModel::from(entry).update(conn).await?;
    Ok(())
}
