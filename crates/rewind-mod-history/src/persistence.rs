/// Autosave store backed by redb.
///
/// Uses a single redb database file with two tables:
/// - `autosave`: bincode-serialized project snapshot keyed by `doc_id`
/// - `autosave_meta`: bincode-serialized `AutosaveMeta` keyed by `doc_id`
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Snapshot table: doc_id → bincode-serialized document snapshot.
const AUTOSAVE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("autosave");

/// Metadata table: doc_id → bincode-serialized AutosaveMeta.
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("autosave_meta");

/// File name of the database inside the data directory.
const DB_FILE_NAME: &str = "autosave.redb";

/// Per-document bookkeeping written alongside each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveMeta {
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// Size of the serialized snapshot.
    pub size_bytes: u64,
}

/// Crash-recovery store for live project state.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared across projects via `Arc<AutosaveStore>`.
pub struct AutosaveStore {
    db: Database,
}

impl std::fmt::Debug for AutosaveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveStore").finish()
    }
}

impl AutosaveStore {
    /// Opens or creates the autosave database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    /// Initializes tables on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join(DB_FILE_NAME);
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open autosave database: {}", db_path.display()))?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(AUTOSAVE_TABLE)
                .context("Failed to create autosave table")?;
            let _ = write_txn
                .open_table(META_TABLE)
                .context("Failed to create meta table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Arc::new(Self { db }))
    }

    /// Writes the latest snapshot for a document, replacing any older one.
    ///
    /// Snapshot and metadata are committed in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write transaction fails.
    pub fn write<T: Serialize>(&self, doc_id: &str, snapshot: &T) -> Result<()> {
        let bytes = bincode::serialize(snapshot).context("Failed to serialize snapshot")?;
        let meta = AutosaveMeta {
            saved_at: Utc::now(),
            size_bytes: bytes.len() as u64,
        };
        let meta_bytes =
            bincode::serialize(&meta).context("Failed to serialize autosave metadata")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(AUTOSAVE_TABLE)
                .context("Failed to open autosave table")?;
            table
                .insert(doc_id, bytes.as_slice())
                .context("Failed to insert snapshot")?;
        }
        {
            let mut table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            table
                .insert(doc_id, meta_bytes.as_slice())
                .context("Failed to insert autosave metadata")?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;
        tracing::debug!(doc_id, size_bytes = meta.size_bytes, "Autosaved document");
        Ok(())
    }

    /// Reads the latest snapshot for a document.
    ///
    /// Returns `None` if nothing was autosaved for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn read<T: DeserializeOwned>(&self, doc_id: &str) -> Result<Option<T>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(AUTOSAVE_TABLE)
            .context("Failed to open autosave table")?;

        match table.get(doc_id).context("Failed to read snapshot")? {
            Some(guard) => {
                let snapshot: T = bincode::deserialize(guard.value())
                    .context("Failed to deserialize snapshot")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Loads the bookkeeping for a document's latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_meta(&self, doc_id: &str) -> Result<Option<AutosaveMeta>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        match table.get(doc_id).context("Failed to read metadata")? {
            Some(guard) => {
                let meta: AutosaveMeta = bincode::deserialize(guard.value())
                    .context("Failed to deserialize metadata")?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Removes the snapshot and metadata for a document.
    ///
    /// Called once a project is saved or closed cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete(&self, doc_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(AUTOSAVE_TABLE)
                .context("Failed to open autosave table")?;
            let _ = table.remove(doc_id);
        }
        {
            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            let _ = meta_table.remove(doc_id);
        }
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(())
    }

    /// Lists all document IDs that have an autosaved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate meta table")? {
            let (key_guard, _) = entry.context("Failed to read meta entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}
