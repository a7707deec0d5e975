//! Reservation operations.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DatabaseError, Result};
use crate::models::{reservation_status, NewReservation, Reservation, ReservationSummary, Room};
use crate::validation::ValidationError;

const RESERVATION_COLUMNS: &str = "id, user_id, room_id, check_in_date, check_out_date, \
                                   total_price, status, created_at";

/// Price of a stay: nights × the room's nightly rate.
///
/// Fails with [`ValidationError::InvalidStay`] unless check-out is strictly
/// after check-in.
pub fn calculate_total_price(
    room: &Room,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<f64> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(ValidationError::InvalidStay.into());
    }

    Ok(room.price_per_night * nights as f64)
}

/// Book a room for `[check_in, check_out)`.
///
/// Runs in a single transaction: the room must exist, be bookable, and have
/// no confirmed reservation overlapping the requested nights.
pub async fn book_room(pool: &SqlitePool, request: &NewReservation) -> Result<Reservation> {
    let mut tx = pool.begin().await?;

    let room = sqlx::query_as::<_, Room>(
        r#"
        SELECT id, room_type, description, price_per_night, availability, max_guests, amenities
        FROM rooms
        WHERE id = ?
        "#,
    )
    .bind(request.room_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Room",
        id: request.room_id.to_string(),
    })?;

    let total_price =
        calculate_total_price(&room, request.check_in_date, request.check_out_date)?;

    if !room.availability {
        return Err(DatabaseError::Conflict(
            "Room is not available for the selected dates".to_string(),
        ));
    }

    let overlapping = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE room_id = ?
        AND status = 'confirmed'
        AND check_in_date < ?
        AND check_out_date > ?
        "#,
    )
    .bind(request.room_id)
    .bind(request.check_out_date)
    .bind(request.check_in_date)
    .fetch_one(&mut *tx)
    .await?;

    if overlapping > 0 {
        return Err(DatabaseError::Conflict(
            "Room is not available for the selected dates".to_string(),
        ));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO reservations (user_id, room_id, check_in_date, check_out_date, total_price, status)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(request.user_id)
    .bind(request.room_id)
    .bind(request.check_in_date)
    .bind(request.check_out_date)
    .bind(total_price)
    .bind(reservation_status::CONFIRMED)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        reservation_id = id,
        user_id = request.user_id,
        room_id = request.room_id,
        total_price,
        "Room booked"
    );

    get_reservation(pool, id).await
}

/// Get a reservation by ID.
pub async fn get_reservation(pool: &SqlitePool, id: i64) -> Result<Reservation> {
    sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Reservation",
        id: id.to_string(),
    })
}

/// List a user's reservations with their room type, earliest stay first.
pub async fn list_reservations_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ReservationSummary>> {
    let reservations = sqlx::query_as::<_, ReservationSummary>(
        r#"
        SELECT r.id, m.room_type, r.check_in_date, r.check_out_date, r.total_price, r.status
        FROM reservations r
        JOIN rooms m ON m.id = r.room_id
        WHERE r.user_id = ?
        ORDER BY r.check_in_date, r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

/// Cancel one of the user's reservations.
///
/// Someone else's reservation reads as not found. Cancelling is refused on
/// or after the check-in date and for stays that are already cancelled.
pub async fn cancel_reservation(
    pool: &SqlitePool,
    user_id: i64,
    reservation_id: i64,
    today: NaiveDate,
) -> Result<Reservation> {
    let mut tx = pool.begin().await?;

    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ? AND user_id = ?"
    ))
    .bind(reservation_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Reservation",
        id: reservation_id.to_string(),
    })?;

    if reservation.status == reservation_status::CANCELLED {
        return Err(DatabaseError::Conflict(
            "Reservation is already cancelled".to_string(),
        ));
    }

    if reservation.check_in_date <= today {
        return Err(DatabaseError::Conflict(
            "Cannot cancel a reservation on or after the check-in date".to_string(),
        ));
    }

    sqlx::query("UPDATE reservations SET status = ? WHERE id = ?")
        .bind(reservation_status::CANCELLED)
        .bind(reservation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(reservation_id, user_id, "Reservation cancelled");

    Ok(Reservation {
        status: reservation_status::CANCELLED.to_string(),
        ..reservation
    })
}
