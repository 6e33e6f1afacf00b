//! Sign-in routes.

use axum::{Json, Router, extract::State, routing::{get, post}};
use rentdesk_core::user::User;
use rentdesk_shared::{AppError, LoginRequest, types::UserId};
use serde::Serialize;
use tracing::{error, info};

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the public sign-in route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Creates the routes that need a token (requires auth middleware to be applied externally).
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Response of a successful sign-in.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for the API.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// The signed-in account.
    pub user: User,
}

/// POST `/auth/login` - Check credentials and issue an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = match state
        .backend
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            info!(username = %payload.username, code = e.error_code(), "Login refused");
            return Err(e.into());
        }
    };

    let access_token = state
        .jwt_service
        .generate_access_token(user.id.into_inner(), &user.name, user.role)
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            AppError::Internal("An error occurred during login".into())
        })?;

    info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expires_in(),
        user,
    }))
}

/// GET `/auth/me` - The signed-in account.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(
        state
            .backend
            .get_user(UserId::from_uuid(auth.user_id()))
            .await?,
    ))
}
