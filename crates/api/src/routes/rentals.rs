//! Rental query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::NaiveDate;
use domain::Rental;
use reservation::ReservationStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::reservations::AppState;

#[derive(Serialize)]
pub struct RentalResponse {
    pub id: String,
    pub user_id: String,
    pub reservation_id: String,
    pub car_id: i64,
    pub start_date: NaiveDate,
    pub active: bool,
}

impl From<Rental> for RentalResponse {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.id.to_string(),
            user_id: rental.user_id,
            reservation_id: rental.reservation_id.to_string(),
            car_id: rental.car_id,
            start_date: rental.start_date,
            active: rental.active,
        }
    }
}

/// GET /rental/active — list rentals that have already begun.
#[tracing::instrument(skip(state))]
pub async fn active<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<RentalResponse>>, ApiError> {
    let rentals = state.rentals.list_active().await?;
    Ok(Json(rentals.into_iter().map(RentalResponse::from).collect()))
}
