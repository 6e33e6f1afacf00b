//! Operator account routes. Every route here is admin-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use rentdesk_core::user::{NewUser, User, UserFilter, UserPatch};
use rentdesk_shared::{
    Role,
    types::{PageResponse, UserId},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::items::page_request;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{user_id}/status", put(set_user_status))
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Filter by role.
    pub role: Option<Role>,
    /// Filter by enabled flag.
    pub active: Option<bool>,
    /// Include soft-deleted users.
    #[serde(default)]
    pub include_deleted: bool,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Users per page (default: 50).
    pub per_page: Option<u32>,
}

/// Request body for enabling or disabling an account.
#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    /// Whether the account may sign in.
    pub active: bool,
}

/// GET `/users` - List accounts, newest first.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<PageResponse<User>>> {
    auth.require_admin()?;
    let filter = UserFilter {
        role: query.role,
        active: query.active,
        include_deleted: query.include_deleted,
    };
    let users = state.backend.list_users(&filter).await?;
    let page = page_request(query.page, query.per_page);
    Ok(Json(page.paginate(users)))
}

/// POST `/users` - Create an account.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    auth.require_admin()?;
    let user = state.backend.create_user(body).await?;
    info!(operator = %auth.name(), user_id = %user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users/{user_id}` - Account details.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    auth.require_admin()?;
    Ok(Json(state.backend.get_user(UserId::from_uuid(user_id)).await?))
}

/// PATCH `/users/{user_id}` - Update name, username, password, role or phone.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    auth.require_admin()?;
    let user = state
        .backend
        .update_user(UserId::from_uuid(user_id), body)
        .await?;
    info!(operator = %auth.name(), user_id = %user.id, "User updated");
    Ok(Json(user))
}

/// PUT `/users/{user_id}/status` - Enable or disable an account.
async fn set_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SetUserStatusRequest>,
) -> ApiResult<Json<User>> {
    auth.require_admin()?;
    let user = state
        .backend
        .set_user_active(UserId::from_uuid(user_id), body.active)
        .await?;
    info!(operator = %auth.name(), user_id = %user.id, active = user.active, "User status set");
    Ok(Json(user))
}

/// DELETE `/users/{user_id}` - Soft-delete an account.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    state.backend.delete_user(UserId::from_uuid(user_id)).await?;
    info!(operator = %auth.name(), user_id = %user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
