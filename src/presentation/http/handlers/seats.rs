//! Seat Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::{SeatListResponse, SeatView};
use crate::domain::SeatId;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List every seat in inventory order
pub async fn list_seats(State(state): State<AppState>) -> Json<SeatListResponse> {
    let seq = state.registry.last_sequence();
    let seats: Vec<SeatView> = state.registry.snapshot().iter().map(SeatView::from).collect();

    Json(SeatListResponse {
        counts: state.registry.counts(),
        seats,
        seq,
    })
}

/// Get one seat by its `C<coach>-S<seat>` id
pub async fn get_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<String>,
) -> Result<Json<SeatView>, AppError> {
    let seat_id: SeatId = seat_id.parse()?;
    let seat = state.registry.get(&seat_id)?;

    Ok(Json(SeatView::from(&seat)))
}
