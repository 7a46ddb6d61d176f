use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::services::freshdesk::FreshdeskError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Freshdesk error: {0}")]
    Freshdesk(#[from] FreshdeskError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Freshdesk(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Downstream failures keep their diagnostic context out of the response
    /// body; it only goes to the log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Freshdesk(_) => "internal error".to_string(),
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_every_variant() {
        assert_eq!(
            ApiError::Unauthorized("bad secret".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("missing ticket_id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        let downstream = ApiError::Freshdesk(FreshdeskError::Api {
            method: "POST",
            url: "https://acme.freshdesk.com/api/v2/tickets/1/notes".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        });
        assert_eq!(downstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn downstream_detail_stays_out_of_public_message() {
        let downstream = ApiError::Freshdesk(FreshdeskError::Api {
            method: "PUT",
            url: "https://acme.freshdesk.com/api/v2/tickets/1".into(),
            status: StatusCode::BAD_GATEWAY,
            body: "tenant suspended".into(),
        });
        assert_eq!(downstream.public_message(), "internal error");
        assert_eq!(
            ApiError::BadRequest("missing ticket_id".into()).public_message(),
            "missing ticket_id"
        );
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();

        self.log_error(&request_id);

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.public_message(),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
