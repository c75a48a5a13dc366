use crate::api::types::ErrorResponse;
use crate::utils::error::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation { .. } | ServiceError::DocumentFormat { .. } => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::Provider { .. }
        | ServiceError::ProviderTimeout { .. }
        | ServiceError::ProviderRateLimit { .. }
        | ServiceError::Parse { .. } => StatusCode::BAD_GATEWAY,
        ServiceError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_client_error() {
            tracing::warn!("Request rejected ({}): {}", self.kind(), self);
        } else {
            tracing::error!("Request failed ({}): {}", self.kind(), self);
        }

        let body = ErrorResponse {
            kind: self.kind().to_string(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
