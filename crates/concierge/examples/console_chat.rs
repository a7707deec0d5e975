//! Chat with the concierge from a terminal.
//!
//! Run with: cargo run -p concierge --example console_chat
//!
//! Configuration via .env file or environment variables:
//!   DATABASE_URL  - SQLite URL (default: in-memory database)
//!   LLM_API_KEY   - Use the real completions API; without it replies are echoed
//!   CONSOLE_USER  - Guest name (default: guest)

use std::env;
use std::sync::Arc;

use chat_core::ChatModel;
use concierge::{Concierge, ConversationWriter};
use database::{user, Database, DatabaseError, NewUser};
use futures::StreamExt;
use llm_client::LlmClient;
use mock_llm::EchoModel;
use nlp::SpellChecker;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let (url, pool_size) = match env::var("DATABASE_URL") {
        Ok(url) => (url, 5),
        Err(_) => ("sqlite::memory:".to_string(), 1),
    };
    let db = Database::connect_with_pool_size(&url, pool_size).await?;
    db.migrate().await?;

    let model: Arc<dyn ChatModel> = match LlmClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            info!(error = %e, "No completions API configured, echoing instead");
            Arc::new(EchoModel::with_prefix("(echo) "))
        }
    };

    let username = env::var("CONSOLE_USER").unwrap_or_else(|_| "guest".to_string());
    let guest = match user::get_user_by_username(db.pool(), &username).await {
        Ok(guest) => guest,
        Err(DatabaseError::NotFound { .. }) => {
            user::create_user(
                db.pool(),
                &NewUser {
                    username: username.clone(),
                    email: format!("{username}@localhost.test"),
                    password_hash: String::new(),
                },
            )
            .await?
        }
        Err(e) => return Err(e.into()),
    };

    let writer = ConversationWriter::start(db.clone(), 16);
    let concierge = Concierge::new(
        db.clone(),
        model,
        Arc::new(SpellChecker::bundled()),
        writer.clone(),
    );

    let mut stdout = tokio::io::stdout();
    let greeting = concierge.greeting(&guest).await?;
    stdout.write_all(format!("{greeting}\n> ").as_bytes()).await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }

        let mut reply = concierge.chat(&guest, &line).await?;
        stdout
            .write_all(format!("[{}] ", reply.intent).as_bytes())
            .await?;
        while let Some(delta) = reply.stream.next().await {
            stdout.write_all(delta?.as_bytes()).await?;
            stdout.flush().await?;
        }
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    writer.shutdown().await;
    db.close().await;
    Ok(())
}
