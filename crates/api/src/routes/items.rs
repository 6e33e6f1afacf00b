//! Inventory routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use rentdesk_core::inventory::{
    InventoryItem, InventoryStats, ItemFilter, ItemPatch, ItemStatus, NewItem,
};
use rentdesk_shared::types::{ItemId, PageRequest, PageResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the inventory routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/stats", get(inventory_stats))
        .route(
            "/items/{item_id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/items/{item_id}/status", put(set_item_status))
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by status.
    pub status: Option<ItemStatus>,
    /// Include soft-deleted items.
    #[serde(default)]
    pub include_deleted: bool,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 50).
    pub per_page: Option<u32>,
}

/// Request body for an operator status change.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target status: `available`, `maintenance` or `retired`.
    pub status: ItemStatus,
}

/// GET `/items` - List items in creation order.
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> ApiResult<Json<PageResponse<InventoryItem>>> {
    let filter = ItemFilter {
        category: query.category,
        status: query.status,
        include_deleted: query.include_deleted,
    };
    let items = state.backend.list_items(&filter).await?;
    let page = page_request(query.page, query.per_page);
    Ok(Json(page.paginate(items)))
}

/// POST `/items` - Register an item.
async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let item = state.backend.create_item(body).await?;
    info!(operator = %auth.name(), item_id = %item.id, "Item registered");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET `/items/stats` - Counts per status.
async fn inventory_stats(State(state): State<AppState>) -> ApiResult<Json<InventoryStats>> {
    Ok(Json(state.backend.inventory_stats().await?))
}

/// GET `/items/{item_id}` - Item details.
async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<InventoryItem>> {
    Ok(Json(state.backend.get_item(ItemId::from_uuid(item_id)).await?))
}

/// PATCH `/items/{item_id}` - Update descriptive fields and rate.
async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(body): Json<ItemPatch>,
) -> ApiResult<Json<InventoryItem>> {
    let item = state
        .backend
        .update_item(ItemId::from_uuid(item_id), body)
        .await?;
    info!(operator = %auth.name(), item_id = %item.id, "Item updated");
    Ok(Json(item))
}

/// PUT `/items/{item_id}/status` - Operator status change.
async fn set_item_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> ApiResult<Json<InventoryItem>> {
    let item = state
        .backend
        .set_item_status(ItemId::from_uuid(item_id), body.status)
        .await?;
    info!(operator = %auth.name(), item_id = %item.id, status = %item.status, "Item status set");
    Ok(Json(item))
}

/// DELETE `/items/{item_id}` - Soft-delete an item (admin).
async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    state.backend.delete_item(ItemId::from_uuid(item_id)).await?;
    info!(operator = %auth.name(), item_id = %item_id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Builds a page request from optional query values.
pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
}
