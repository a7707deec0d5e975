//! Room availability and reservation routes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use database::{reservation, room, DatabaseError, NewReservation, ReservationSummary, Room};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, WebError};
use crate::session::MaybeSession;
use crate::state::AppState;

/// Requested stay.
#[derive(Deserialize)]
pub struct StayRequest {
    pub check_in_date: String,
    pub check_out_date: String,
}

/// Booking form.
#[derive(Deserialize)]
pub struct BookingRequest {
    pub room_id: i64,
    pub check_in_date: String,
    pub check_out_date: String,
}

/// A bookable room as shown to guests.
#[derive(Debug, Serialize)]
pub struct AvailableRoom {
    pub id: i64,
    pub room_type: String,
    pub description: String,
    pub price_per_night: f64,
    pub max_guests: i64,
    pub amenities: String,
}

impl From<Room> for AvailableRoom {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            room_type: room.room_type,
            description: room.description,
            price_per_night: room.price_per_night,
            max_guests: room.max_guests,
            amenities: room.amenities,
        }
    }
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available_rooms: Vec<AvailableRoom>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub message: &'static str,
    pub reservation_id: i64,
    pub total_price: f64,
}

#[derive(Serialize)]
pub struct ReservationsResponse {
    pub reservations: Vec<ReservationSummary>,
}

fn parse_stay(check_in: &str, check_out: &str) -> Result<(NaiveDate, NaiveDate)> {
    let parse = |value: &str| {
        nlp::parse_date(value)
            .map_err(|_| WebError::BadRequest(format!("Invalid date '{value}', expected YYYY-MM-DD")))
    };
    let (check_in, check_out) = (parse(check_in)?, parse(check_out)?);
    if check_out <= check_in {
        return Err(WebError::BadRequest(
            "Check-out must be after check-in".to_string(),
        ));
    }
    Ok((check_in, check_out))
}

/// Rooms free for the whole stay.
pub async fn check_availability(
    State(state): State<AppState>,
    Json(req): Json<StayRequest>,
) -> Result<Json<AvailabilityResponse>> {
    let (check_in, check_out) = parse_stay(&req.check_in_date, &req.check_out_date)?;

    let rooms = room::list_available_rooms(state.db.pool(), check_in, check_out).await?;

    Ok(Json(AvailabilityResponse {
        available_rooms: rooms.into_iter().map(AvailableRoom::from).collect(),
    }))
}

/// Book a room for the current user.
pub async fn book_room(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(req): Json<BookingRequest>,
) -> Result<Json<BookingResponse>> {
    let session = session.require("You must be logged in to book a room.")?;
    let (check_in_date, check_out_date) = parse_stay(&req.check_in_date, &req.check_out_date)?;

    let request = NewReservation {
        user_id: session.user_id,
        room_id: req.room_id,
        check_in_date,
        check_out_date,
    };

    let booked = match reservation::book_room(state.db.pool(), &request).await {
        Ok(booked) => booked,
        Err(DatabaseError::NotFound { .. }) | Err(DatabaseError::Conflict(_)) => {
            return Err(WebError::BadRequest("Room not available.".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(BookingResponse {
        message: "Room booked successfully!",
        reservation_id: booked.id,
        total_price: booked.total_price,
    }))
}

/// The current user's reservations.
pub async fn view_reservations(
    State(state): State<AppState>,
    session: MaybeSession,
) -> Result<Json<ReservationsResponse>> {
    let session = session.require("You must be logged in to view reservations.")?;

    let reservations =
        reservation::list_reservations_for_user(state.db.pool(), session.user_id).await?;

    Ok(Json(ReservationsResponse { reservations }))
}

/// Cancel one of the current user's reservations.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    session: MaybeSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let session = session.require("You must be logged in to cancel a reservation.")?;
    let today = Utc::now().date_naive();

    let cancelled =
        reservation::cancel_reservation(state.db.pool(), session.user_id, id, today).await?;

    Ok(Json(json!({
        "message": "Reservation cancelled successfully!",
        "reservation_id": cancelled.id,
        "status": cancelled.status,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stay() {
        let (check_in, check_out) = parse_stay("2024-01-01", "2024-01-05").unwrap();
        assert_eq!((check_out - check_in).num_days(), 4);

        assert!(matches!(
            parse_stay("2024-01-05", "2024-01-05"),
            Err(WebError::BadRequest(_))
        ));
        assert!(matches!(
            parse_stay("01/05/2024", "2024-01-07"),
            Err(WebError::BadRequest(_))
        ));
    }
}
