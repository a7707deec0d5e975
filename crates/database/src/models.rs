//! Database models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique login name (at least 3 characters).
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// bcrypt hash of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Preferred hotel chain, if the guest told us one.
    pub preferred_hotel_chain: Option<String>,
    /// Accumulated loyalty points.
    pub loyalty_points: i64,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
    /// Last update timestamp.
    pub updated_at: NaiveDateTime,
}

/// Fields required to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A room in the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: i64,
    /// e.g. "Single Room", "Suite".
    pub room_type: String,
    pub description: String,
    pub price_per_night: f64,
    /// Whether the room can be booked at all.
    pub availability: bool,
    pub max_guests: i64,
    /// Comma separated list, e.g. "WiFi, AC, TV".
    pub amenities: String,
}

/// Fields required to add a room to the catalog.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub room_type: String,
    pub description: String,
    pub price_per_night: f64,
    pub max_guests: i64,
    pub amenities: String,
}

/// Reservation status values.
pub mod reservation_status {
    pub const CONFIRMED: &str = "confirmed";
    pub const CANCELLED: &str = "cancelled";
}

/// A booked stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// nights × price per night, fixed at booking time.
    pub total_price: f64,
    /// `confirmed` or `cancelled`.
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Fields required to book a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewReservation {
    pub user_id: i64,
    pub room_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

/// A reservation joined with its room type, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReservationSummary {
    pub id: i64,
    pub room_type: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
    pub status: String,
}

/// One chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    /// Normalized user input.
    pub message: String,
    /// Assistant reply text.
    pub response: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// When set, the follow-up timer checks in with the user at or after this time.
    pub follow_up_date: Option<NaiveDateTime>,
}

/// Fields required to log a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub follow_up_date: Option<NaiveDateTime>,
}

/// A remembered fact about a user (e.g. `room_type` = `suite`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Memory {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub value: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Follow-up status values.
pub mod follow_up_status {
    pub const SCHEDULED: &str = "scheduled";
    pub const SENT: &str = "sent";
    pub const FAILED: &str = "failed";
}

/// A check-in message sent (or attempted) by the follow-up timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FollowUp {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub scheduled_at: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
    /// `scheduled`, `sent` or `failed`.
    pub status: String,
}
