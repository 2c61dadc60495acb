//! Booking Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::{ClientBookingsResponse, ReceiptView};
use crate::domain::{BookingId, ClientId};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Get a booking receipt by reference
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<ReceiptView>, AppError> {
    let booking_id: BookingId = booking_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid booking ID".into()))?;

    let booking = state.bookings.get_booking(booking_id).await?;

    Ok(Json(ReceiptView::from(booking)))
}

/// List the receipts of one client identity
pub async fn get_client_bookings(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientBookingsResponse>, AppError> {
    let client = ClientId::new(&client_id)?;

    let bookings = state
        .bookings
        .bookings_for(&client)
        .await?
        .iter()
        .map(ReceiptView::from)
        .collect();

    Ok(Json(ClientBookingsResponse {
        client_id: client.to_string(),
        bookings,
    }))
}
