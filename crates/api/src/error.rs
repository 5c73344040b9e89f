//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use rental::RentalError;
use reservation::ReservationError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Reservation-side error.
    Reservation(ReservationError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Reservation(err) => reservation_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn reservation_error_to_response(err: ReservationError) -> (StatusCode, String) {
    match &err {
        ReservationError::Domain(domain_err) => match domain_err {
            DomainError::Validation { .. }
            | DomainError::InvalidStateTransition { .. }
            | DomainError::AlreadyCancelled
            | DomainError::CannotCancelFinished
            | DomainError::ExtendExpired => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        ReservationError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ReservationError::CarUnavailable { .. } => (StatusCode::CONFLICT, err.to_string()),
        ReservationError::Store(_)
        | ReservationError::Messaging(_)
        | ReservationError::Inventory(_)
        | ReservationError::RetriesExhausted { .. } => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl From<RentalError> for ApiError {
    fn from(err: RentalError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
