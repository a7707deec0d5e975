//! Starter room catalog.

use database::{room, Database, NewRoom};
use tracing::info;

/// The three rooms every new hotel starts with.
pub fn default_rooms() -> Vec<NewRoom> {
    vec![
        NewRoom {
            room_type: "Single Room".to_string(),
            description: "A cozy single room with a queen-sized bed.".to_string(),
            price_per_night: 100.0,
            max_guests: 1,
            amenities: "WiFi, AC, TV".to_string(),
        },
        NewRoom {
            room_type: "Double Room".to_string(),
            description: "A spacious double room with two queen-sized beds.".to_string(),
            price_per_night: 150.0,
            max_guests: 2,
            amenities: "WiFi, AC, TV, Mini Fridge".to_string(),
        },
        NewRoom {
            room_type: "Suite".to_string(),
            description: "A luxurious suite with a king-sized bed and a living area.".to_string(),
            price_per_night: 250.0,
            max_guests: 4,
            amenities: "WiFi, AC, TV, Mini Bar, Jacuzzi".to_string(),
        },
    ]
}

/// Insert [`default_rooms`] when the catalog is empty.
///
/// Returns how many rooms were added.
pub async fn seed_rooms(db: &Database) -> database::Result<usize> {
    if room::count_rooms(db.pool()).await? > 0 {
        info!("Rooms already exist in the database");
        return Ok(0);
    }

    let rooms = default_rooms();
    for new_room in &rooms {
        room::create_room(db.pool(), new_room).await?;
    }

    info!(count = rooms.len(), "Rooms populated");
    Ok(rooms.len())
}
