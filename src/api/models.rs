use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::{ErrorKind, RoomsplitError};

#[derive(Deserialize, ToSchema)]
pub struct SaveProfileRequest {
    pub name: String,
    pub upi_id: Option<String>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

// Newtype wrapper for RoomsplitError to implement IntoResponse
pub struct ApiError(pub RoomsplitError);

impl From<RoomsplitError> for ApiError {
    fn from(err: RoomsplitError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Consistency => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match &self.0 {
            RoomsplitError::InvalidInput(_, field) => format!("{}: {}", field.title, field.description),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error,
                kind: format!("{:?}", kind).to_lowercase(),
            }),
        )
            .into_response()
    }
}
