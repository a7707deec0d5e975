//! Room catalog operations.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewRoom, Room};

/// Add a room to the catalog.
pub async fn create_room(pool: &SqlitePool, room: &NewRoom) -> Result<Room> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO rooms (room_type, description, price_per_night, max_guests, amenities)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&room.room_type)
    .bind(&room.description)
    .bind(room.price_per_night)
    .bind(room.max_guests)
    .bind(&room.amenities)
    .fetch_one(pool)
    .await?;

    get_room(pool, id).await
}

/// Get a room by ID.
pub async fn get_room(pool: &SqlitePool, id: i64) -> Result<Room> {
    sqlx::query_as::<_, Room>(
        r#"
        SELECT id, room_type, description, price_per_night, availability, max_guests, amenities
        FROM rooms
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Room",
        id: id.to_string(),
    })
}

/// List the whole catalog.
pub async fn list_rooms(pool: &SqlitePool) -> Result<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(
        r#"
        SELECT id, room_type, description, price_per_night, availability, max_guests, amenities
        FROM rooms
        ORDER BY price_per_night, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rooms)
}

/// Count rooms in the catalog.
pub async fn count_rooms(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Toggle whether a room can be booked.
pub async fn set_availability(pool: &SqlitePool, id: i64, available: bool) -> Result<()> {
    let result = sqlx::query("UPDATE rooms SET availability = ? WHERE id = ?")
        .bind(available)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Room",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List rooms that can be booked for the stay `[check_in, check_out)`.
///
/// A room qualifies when its availability flag is set and no confirmed
/// reservation overlaps the requested nights.
pub async fn list_available_rooms(
    pool: &SqlitePool,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(
        r#"
        SELECT id, room_type, description, price_per_night, availability, max_guests, amenities
        FROM rooms r
        WHERE r.availability = 1
        AND NOT EXISTS (
            SELECT 1 FROM reservations b
            WHERE b.room_id = r.id
            AND b.status = 'confirmed'
            AND b.check_in_date < ?
            AND b.check_out_date > ?
        )
        ORDER BY r.price_per_night, r.id
        "#,
    )
    .bind(check_out)
    .bind(check_in)
    .fetch_all(pool)
    .await?;

    Ok(rooms)
}

/// List bookable rooms priced at or under `budget` per night.
pub async fn list_rooms_within_budget(pool: &SqlitePool, budget: f64) -> Result<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(
        r#"
        SELECT id, room_type, description, price_per_night, availability, max_guests, amenities
        FROM rooms
        WHERE availability = 1 AND price_per_night <= ?
        ORDER BY price_per_night, id
        "#,
    )
    .bind(budget)
    .fetch_all(pool)
    .await?;

    Ok(rooms)
}
