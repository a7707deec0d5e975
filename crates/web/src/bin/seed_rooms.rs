//! Populate the room catalog with the starter rooms.

use concierge_web::seed::seed_rooms;
use concierge_web::Config;
use database::Database;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let added = seed_rooms(&db).await?;
    info!(added, "Seeding finished");

    db.close().await;
    Ok(())
}
