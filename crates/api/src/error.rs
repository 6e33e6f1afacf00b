//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rentdesk_core::RentalError;
use rentdesk_shared::AppError;
use serde_json::json;
use tracing::error;

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// An [`AppError`] on its way out as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RentalError> for ApiError {
    fn from(err: RentalError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }
        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentdesk_shared::types::ItemId;

    #[test]
    fn test_rental_error_keeps_status_and_code() {
        let response = ApiError::from(RentalError::ItemNotFound(ItemId::new())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(RentalError::EmptySelection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let response = ApiError(AppError::Forbidden("admin only".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
