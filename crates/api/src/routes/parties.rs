//! Party routes: customers, suppliers, their statements and payments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rentdesk_core::ledger::{LedgerEntry, PaymentRequest, RefundRequest, Statement};
use rentdesk_core::party::{NewParty, Party, PartyFilter, PartyKind, PartyPatch, PartyStatus};
use rentdesk_shared::types::{PageResponse, PartyId};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::items::page_request;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the party routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", get(list_parties).post(create_party))
        .route(
            "/parties/{party_id}",
            get(get_party).patch(update_party).delete(delete_party),
        )
        .route("/parties/{party_id}/statement", get(get_statement))
        .route("/parties/{party_id}/payments", post(add_payment))
        .route("/parties/{party_id}/refunds", post(add_refund))
}

/// Query parameters for listing parties.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    /// Filter by kind.
    pub kind: Option<PartyKind>,
    /// Filter by standing.
    pub status: Option<PartyStatus>,
    /// Include soft-deleted parties.
    #[serde(default)]
    pub include_deleted: bool,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Parties per page (default: 50).
    pub per_page: Option<u32>,
}

/// Query parameters for a statement.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Start date (inclusive, YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// End date (inclusive, YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// GET `/parties` - List parties in creation order.
async fn list_parties(
    State(state): State<AppState>,
    Query(query): Query<ListPartiesQuery>,
) -> ApiResult<Json<PageResponse<Party>>> {
    let filter = PartyFilter {
        kind: query.kind,
        status: query.status,
        include_deleted: query.include_deleted,
    };
    let parties = state.backend.list_parties(&filter).await?;
    Ok(Json(page_request(query.page, query.per_page).paginate(parties)))
}

/// POST `/parties` - Register a customer or supplier.
async fn create_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewParty>,
) -> ApiResult<(StatusCode, Json<Party>)> {
    let party = state.backend.create_party(body).await?;
    info!(operator = %auth.name(), party_id = %party.id, "Party registered");
    Ok((StatusCode::CREATED, Json(party)))
}

/// GET `/parties/{party_id}` - Party details with its balance.
async fn get_party(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
) -> ApiResult<Json<Party>> {
    Ok(Json(state.backend.get_party(PartyId::from_uuid(party_id)).await?))
}

/// PATCH `/parties/{party_id}` - Update contact details, standing or credit limit.
async fn update_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
    Json(body): Json<PartyPatch>,
) -> ApiResult<Json<Party>> {
    let party = state
        .backend
        .update_party(PartyId::from_uuid(party_id), body)
        .await?;
    info!(operator = %auth.name(), party_id = %party.id, "Party updated");
    Ok(Json(party))
}

/// DELETE `/parties/{party_id}` - Soft-delete a party (admin).
async fn delete_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    state
        .backend
        .delete_party(PartyId::from_uuid(party_id))
        .await?;
    info!(operator = %auth.name(), party_id = %party_id, "Party deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/parties/{party_id}/statement` - Running-balance statement.
async fn get_statement(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> ApiResult<Json<Statement>> {
    let statement = state
        .backend
        .statement(PartyId::from_uuid(party_id), query.from, query.to)
        .await?;
    Ok(Json(statement))
}

/// POST `/parties/{party_id}/payments` - Record a payment.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
    Json(body): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<LedgerEntry>)> {
    let entry = state
        .backend
        .add_payment(PartyId::from_uuid(party_id), body)
        .await?;
    info!(
        operator = %auth.name(),
        party_id = %party_id,
        entry_id = %entry.id,
        amount = %entry.amount,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/parties/{party_id}/refunds` - Record a refund.
async fn add_refund(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
    Json(body): Json<RefundRequest>,
) -> ApiResult<(StatusCode, Json<LedgerEntry>)> {
    let entry = state
        .backend
        .add_refund(PartyId::from_uuid(party_id), body)
        .await?;
    info!(
        operator = %auth.name(),
        party_id = %party_id,
        entry_id = %entry.id,
        amount = %entry.amount,
        "Refund recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}
