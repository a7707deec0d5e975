//! Shared fixtures for unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use database::{room, user, Database, NewRoom, NewUser, Room, User};

pub async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

pub async fn test_user(db: &Database, username: &str) -> User {
    user::create_user(
        db.pool(),
        &NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_room(db: &Database, room_type: &str, price: f64) -> Room {
    room::create_room(
        db.pool(),
        &NewRoom {
            room_type: room_type.to_string(),
            description: format!("A comfortable {}", room_type.to_lowercase()),
            price_per_night: price,
            max_guests: 2,
            amenities: "WiFi, AC, TV".to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}
