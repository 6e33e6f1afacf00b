//! Ledger routes: entry listings, deletion and balance reconciliation.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use rentdesk_core::ledger::{LedgerEntry, ReconciliationReport};
use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the ledger routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/parties/{party_id}", get(party_entries))
        .route("/ledger/bookings/{booking_id}", get(booking_entries))
        .route("/ledger/reconciliation", get(reconciliation))
        .route("/ledger/{entry_id}", delete(delete_entry))
}

/// A party's entries together with both views of its balance.
#[derive(Debug, Serialize)]
pub struct PartyEntriesResponse {
    /// Party ID.
    pub party_id: PartyId,
    /// Balance stored on the party.
    pub balance: Decimal,
    /// Sum of the entries below.
    pub computed_balance: Decimal,
    /// Entries by date.
    pub entries: Vec<LedgerEntry>,
}

/// GET `/ledger/parties/{party_id}` - A party's entries by date.
async fn party_entries(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
) -> ApiResult<Json<PartyEntriesResponse>> {
    let party_id = PartyId::from_uuid(party_id);
    let party = state.backend.get_party(party_id).await?;
    let entries = state.backend.entries_for_party(party_id).await?;
    let computed_balance = state.backend.recompute_balance(party_id).await?;
    Ok(Json(PartyEntriesResponse {
        party_id,
        balance: party.balance,
        computed_balance,
        entries,
    }))
}

/// GET `/ledger/bookings/{booking_id}` - A booking's entries by date.
async fn booking_entries(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    let entries = state
        .backend
        .entries_for_booking(BookingId::from_uuid(booking_id))
        .await?;
    Ok(Json(entries))
}

/// GET `/ledger/reconciliation` - Stored balances compared with the ledger.
async fn reconciliation(State(state): State<AppState>) -> ApiResult<Json<ReconciliationReport>> {
    Ok(Json(state.backend.verify_balances().await?))
}

/// DELETE `/ledger/{entry_id}` - Delete an entry and reverse its effect (admin).
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<Json<LedgerEntry>> {
    auth.require_admin()?;
    let entry = state
        .backend
        .delete_entry(LedgerEntryId::from_uuid(entry_id))
        .await?;
    info!(
        operator = %auth.name(),
        entry_id = %entry.id,
        party_id = %entry.party_id,
        "Ledger entry deleted"
    );
    Ok(Json(entry))
}
