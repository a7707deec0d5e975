//! Concierge web server.
//!
//! Wires the database, chat backend and background tasks together, then
//! serves the router until Ctrl-C.

use std::sync::Arc;

use concierge::{Concierge, ConversationWriter, FollowUpScheduler, LoggingNotifier};
use concierge_web::{app, AppState, Config, SessionStore};
use database::Database;
use llm_client::LlmClient;
use nlp::SpellChecker;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting concierge web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let spelling = match &config.spelling_dictionary {
        Some(path) => SpellChecker::from_path(path)?,
        None => SpellChecker::bundled(),
    };
    let model = LlmClient::from_env()?;

    // Background tasks
    let writer = ConversationWriter::start(db.clone(), config.conversation_queue_capacity);
    let follow_ups = FollowUpScheduler::new(db.clone(), Arc::new(LoggingNotifier))
        .start(config.follow_up_interval);

    let concierge = Concierge::new(
        db.clone(),
        Arc::new(model),
        Arc::new(spelling),
        writer.clone(),
    );
    let state = AppState::new(db.clone(), Arc::new(concierge), config.session_cookie_secure)
        .with_sessions(SessionStore::with_ttl(config.session_ttl));
    let sessions = state.sessions.clone();

    // Start server
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Concierge web server listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    follow_ups.stop().await;
    writer.shutdown().await;
    sessions.clear().await;
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
}
