//! Per-user memory of booking details.

use std::collections::BTreeMap;

use database::{memory, Database};
use nlp::Entities;
use tracing::debug;

/// Key/value facts remembered about one user, ordered by key.
pub type MemoryContext = BTreeMap<String, String>;

/// Durable memory store backed by SQLite.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    database: Database,
}

impl MemoryStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Upsert every extracted entity; later values replace earlier ones.
    ///
    /// Returns how many keys were written.
    pub async fn remember(&self, user_id: i64, entities: &Entities) -> database::Result<usize> {
        for (key, value) in entities.iter() {
            memory::upsert_memory(self.database.pool(), user_id, key, value).await?;
        }
        debug!(user_id, keys = entities.len(), "Updated memory");
        Ok(entities.len())
    }

    /// Everything remembered about `user_id`.
    pub async fn recall(&self, user_id: i64) -> database::Result<MemoryContext> {
        let rows = memory::list_memories(self.database.pool(), user_id).await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    /// Drop one remembered key.
    pub async fn forget(&self, user_id: i64, key: &str) -> database::Result<bool> {
        memory::delete_memory(self.database.pool(), user_id, key).await
    }
}
