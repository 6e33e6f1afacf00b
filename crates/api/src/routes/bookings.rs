//! Booking routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rentdesk_core::booking::{
    Booking, BookingFilter, BookingRequest, BookingStatus, RevenueSummary,
};
use rentdesk_shared::types::{BookingId, PageResponse, PartyId};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::items::page_request;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the booking routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/revenue", get(revenue))
        .route(
            "/bookings/{booking_id}",
            get(get_booking).put(edit_booking).delete(delete_booking),
        )
        .route("/bookings/{booking_id}/activate", post(activate_booking))
        .route("/bookings/{booking_id}/return", post(return_booking))
        .route("/bookings/{booking_id}/cancel", post(cancel_booking))
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// Filter by status.
    pub status: Option<BookingStatus>,
    /// Filter by party.
    pub party_id: Option<Uuid>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Bookings per page (default: 50).
    pub per_page: Option<u32>,
}

/// Query parameters for creating a booking.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingQuery {
    /// Hold the booking as pending instead of activating it.
    #[serde(default)]
    pub hold: bool,
}

/// GET `/bookings` - List bookings, newest first.
async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<PageResponse<Booking>>> {
    let filter = BookingFilter {
        status: query.status,
        party_id: query.party_id.map(PartyId::from_uuid),
    };
    let bookings = state.backend.list_bookings(&filter).await?;
    Ok(Json(page_request(query.page, query.per_page).paginate(bookings)))
}

/// POST `/bookings` - Create an active booking, or a pending one with `?hold=true`.
async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CreateBookingQuery>,
    Json(body): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let booking = if query.hold {
        state.backend.reserve_booking(body).await?
    } else {
        state.backend.create_booking(body).await?
    };
    info!(
        operator = %auth.name(),
        booking_id = %booking.id,
        party_id = %booking.party_id,
        status = %booking.status,
        total = %booking.total_amount,
        "Booking created"
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET `/bookings/revenue` - Invoiced and pending booking value.
async fn revenue(State(state): State<AppState>) -> ApiResult<Json<RevenueSummary>> {
    Ok(Json(state.backend.revenue().await?))
}

/// GET `/bookings/{booking_id}` - Booking details.
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    Ok(Json(
        state
            .backend
            .get_booking(BookingId::from_uuid(booking_id))
            .await?,
    ))
}

/// PUT `/bookings/{booking_id}` - Replace party, items, dates and notes.
async fn edit_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<BookingRequest>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .backend
        .edit_booking(BookingId::from_uuid(booking_id), body)
        .await?;
    info!(
        operator = %auth.name(),
        booking_id = %booking.id,
        total = %booking.total_amount,
        "Booking edited"
    );
    Ok(Json(booking))
}

/// DELETE `/bookings/{booking_id}` - Remove a booking and reverse its effects (admin).
async fn delete_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    auth.require_admin()?;
    let booking = state
        .backend
        .delete_booking(BookingId::from_uuid(booking_id))
        .await?;
    info!(operator = %auth.name(), booking_id = %booking.id, "Booking deleted");
    Ok(Json(booking))
}

/// POST `/bookings/{booking_id}/activate` - Activate a pending booking.
async fn activate_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .backend
        .activate_booking(BookingId::from_uuid(booking_id))
        .await?;
    info!(operator = %auth.name(), booking_id = %booking.id, "Booking activated");
    Ok(Json(booking))
}

/// POST `/bookings/{booking_id}/return` - Complete a booking and free its items.
async fn return_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .backend
        .return_booking(BookingId::from_uuid(booking_id))
        .await?;
    info!(operator = %auth.name(), booking_id = %booking.id, "Booking returned");
    Ok(Json(booking))
}

/// POST `/bookings/{booking_id}/cancel` - Cancel a pending or active booking.
async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .backend
        .cancel_booking(BookingId::from_uuid(booking_id))
        .await?;
    info!(operator = %auth.name(), booking_id = %booking.id, "Booking cancelled");
    Ok(Json(booking))
}
