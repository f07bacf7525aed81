use std::path::Path;
use std::sync::Arc;

use redb::{Database as RedbDatabase, ReadableTable};
use thiserror::Error;

use super::models::TokenSnapshot;
use super::tables::TOKEN_META;

const CURRENT_TOKEN_KEY: &str = "current";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// Durable storage for the current global token.
///
/// Only the current token survives restarts. Previous tokens, re-entry
/// tokens, and session presence are ephemeral by design and live in the
/// [`MemoryStore`](crate::store::MemoryStore).
#[derive(Clone)]
pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("token-warden.redb");
        let db = RedbDatabase::create(db_path)?;

        // Create tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TOKEN_META)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Persist the current global token snapshot, replacing any prior one.
    pub fn put_current_token(&self, snapshot: &TokenSnapshot) -> Result<(), DatabaseError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TOKEN_META)?;
            let data = bincode::serialize(snapshot)?;
            table.insert(CURRENT_TOKEN_KEY, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read the persisted token snapshot, if one exists.
    pub fn get_current_token(&self) -> Result<Option<TokenSnapshot>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TOKEN_META)?;

        match table.get(CURRENT_TOKEN_KEY)? {
            Some(data) => {
                let snapshot: TokenSnapshot = bincode::deserialize(data.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::storage::models::RotationTrigger;

    #[test]
    fn token_snapshot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let db = Database::open(temp_dir.path()).unwrap();
            assert!(db.get_current_token().unwrap().is_none());

            db.put_current_token(&TokenSnapshot {
                rotated_at: Utc::now(),
                trigger: RotationTrigger::Scheduled,
                value: "042913".to_string(),
            })
            .unwrap();
        }

        let db = Database::open(temp_dir.path()).unwrap();
        let snapshot = db.get_current_token().unwrap().unwrap();
        assert_eq!(snapshot.value, "042913");
        assert_eq!(snapshot.trigger, RotationTrigger::Scheduled);
    }

    #[test]
    fn newer_snapshot_replaces_older() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path()).unwrap();

        for value in ["111111", "222222"] {
            db.put_current_token(&TokenSnapshot {
                rotated_at: Utc::now(),
                trigger: RotationTrigger::Manual,
                value: value.to_string(),
            })
            .unwrap();
        }

        assert_eq!(db.get_current_token().unwrap().unwrap().value, "222222");
    }
}
