//! Authentication middleware and the operator extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rentdesk_core::RentalError;
use rentdesk_shared::{AppError, Claims, JwtError, Role, types::UserId};
use tracing::warn;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// The token must name a live, enabled account. Its claims are stored in the
/// request extensions for [`AuthUser`], with the role and name taken from the
/// stored account.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".into(),
        ))
        .into_response();
    };

    let mut claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            let message = match e {
                JwtError::Expired => "Token has expired",
                _ => "Invalid or malformed token",
            };
            return ApiError(AppError::Unauthorized(message.into())).into_response();
        }
    };

    let user = match state.backend.get_user(UserId::from_uuid(claims.sub)).await {
        Ok(user) => user,
        Err(AppError::Domain { status: 404, .. }) => {
            return ApiError(AppError::Unauthorized("Account no longer exists".into()))
                .into_response();
        }
        Err(e) => return ApiError(e).into_response(),
    };
    if user.is_deleted() || !user.active {
        warn!(user_id = %user.id, "Token presented for a disabled account");
        return ApiError(RentalError::AccountDisabled.into()).into_response();
    }

    claims.role = user.role;
    claims.name = user.name;
    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// The authenticated operator.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the operator ID.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the operator's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the operator's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }

    /// Rejects operators without the admin role.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.0.role.is_admin() {
            return Ok(());
        }
        warn!(user_id = %self.user_id(), role = %self.role(), "Admin-only operation refused");
        Err(ApiError(AppError::Forbidden(
            "This operation requires the admin role".into(),
        )))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".into())))
    }
}
