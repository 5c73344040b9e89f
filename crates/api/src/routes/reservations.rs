//! Reservation lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chrono::NaiveDate;
use common::ReservationId;
use domain::{Invoice, Reservation};
use messaging::InMemoryPublisher;
use rental::{InMemoryRentalStore, RentalService};
use reservation::{
    Car, InMemoryInventoryClient, MakeReservation, ReservationService, ReservationStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: ReservationStore + Clone> {
    pub reservations:
        ReservationService<S, InMemoryInventoryClient, InMemoryPublisher<Invoice>>,
    pub rentals: RentalService<InMemoryRentalStore>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct MakeReservationRequest {
    pub car_id: i64,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub car_id: i64,
    pub user_id: String,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub state: String,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id.to_string(),
            car_id: reservation.car_id,
            user_id: reservation.user_id,
            start_day: reservation.start_day,
            end_day: reservation.end_day,
            state: reservation.state.to_string(),
        }
    }
}

// -- Handlers --

/// POST /reservation — admit a reservation and emit its invoice.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<MakeReservationRequest>,
) -> Result<(axum::http::StatusCode, Json<ReservationResponse>), ApiError> {
    let reservation = state
        .reservations
        .make_reservation(MakeReservation {
            car_id: req.car_id,
            user_id: user_from_headers(&headers),
            start_day: req.start_day,
            end_day: req.end_day,
        })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ReservationResponse::from(reservation)),
    ))
}

/// GET /reservation/availability — list cars free over the interval.
#[tracing::instrument(skip(state))]
pub async fn availability<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<Car>>, ApiError> {
    if params.end_day < params.start_day {
        return Err(ApiError::BadRequest(
            "end_day cannot be before start_day".to_string(),
        ));
    }
    let cars = state
        .reservations
        .availability(params.start_day, params.end_day)
        .await?;
    Ok(Json(cars))
}

/// GET /reservation/all — list the caller's reservations, or every
/// reservation when no identity header is present.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let user = user_from_headers(&headers);
    let reservations = state.reservations.list_reservations(user.as_deref()).await?;
    Ok(Json(
        reservations.into_iter().map(ReservationResponse::from).collect(),
    ))
}

/// PUT /reservation/:id — extend the reservation by one day.
#[tracing::instrument(skip(state, headers))]
pub async fn extend<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ReservationResponse>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let user = user_from_headers(&headers).unwrap_or_else(|| reservation::ANONYMOUS_USER.to_string());
    let reservation = state.reservations.extend_reservation(id, &user).await?;
    Ok(Json(ReservationResponse::from(reservation)))
}

/// DELETE /reservation/:id — cancel the reservation.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ReservationResponse>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let user = user_from_headers(&headers).unwrap_or_else(|| reservation::ANONYMOUS_USER.to_string());
    let reservation = state.reservations.cancel_reservation(id, &user).await?;
    Ok(Json(ReservationResponse::from(reservation)))
}

/// Reads the caller's identity from the `x-user-id` header.
fn user_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn parse_reservation_id(id: &str) -> Result<ReservationId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid reservation id: {e}")))?;
    Ok(ReservationId::from_uuid(uuid))
}
