//! redb-based storage for stores, departments and scales

use crate::models::{DEFAULT_DEPARTMENTS, Scale, Store};
use crate::printing::LabelError;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Stores table: key = store name, value = JSON
const STORES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("stores");

/// Departments table: key = display name
const DEPARTMENTS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("departments");

/// Scales table: key = (store name, scale number), value = JSON
const SCALES_TABLE: TableDefinition<(&str, u32), &[u8]> = TableDefinition::new("scales");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid scale: {0}")]
    InvalidScale(#[from] LabelError),

    #[error("Store name is empty")]
    EmptyStoreName,

    #[error("Store already exists: {0}")]
    StoreAlreadyExists(String),

    #[error("Store not found: {0}")]
    StoreNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Scale metadata storage
#[derive(Clone)]
pub struct ScaleStorage {
    db: Arc<Database>,
}

impl ScaleStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    /// Create tables and seed the default departments
    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STORES_TABLE)?;
            let _ = write_txn.open_table(SCALES_TABLE)?;

            let mut departments = write_txn.open_table(DEPARTMENTS_TABLE)?;
            if departments.len()? == 0 {
                for name in DEFAULT_DEPARTMENTS {
                    departments.insert(name, ())?;
                }
                info!(count = DEFAULT_DEPARTMENTS.len(), "Seeded default departments");
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Stores ==========

    /// Create a store
    pub fn create_store(&self, name: &str) -> StorageResult<Store> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyStoreName);
        }

        let store = Store {
            name: name.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STORES_TABLE)?;
            if table.get(name)?.is_some() {
                return Err(StorageError::StoreAlreadyExists(name.to_string()));
            }
            let value = serde_json::to_vec(&store)?;
            table.insert(name, value.as_slice())?;
        }
        txn.commit()?;

        Ok(store)
    }

    /// Get a store by name
    pub fn get_store(&self, name: &str) -> StorageResult<Option<Store>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STORES_TABLE)?;

        match table.get(name)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All stores, sorted by name
    pub fn list_stores(&self) -> StorageResult<Vec<Store>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STORES_TABLE)?;

        let mut stores = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            stores.push(serde_json::from_slice(guard.value())?);
        }

        Ok(stores)
    }

    // ========== Departments ==========

    /// All department names, sorted
    pub fn list_departments(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEPARTMENTS_TABLE)?;

        let mut names = Vec::new();
        for result in table.iter()? {
            let (key, _) = result?;
            names.push(key.value().to_string());
        }

        Ok(names)
    }

    // ========== Scales ==========

    /// Insert or update a scale (unique by store + number)
    pub fn save_scale(&self, scale: &Scale) -> StorageResult<()> {
        // Same rules as a printable label
        scale.to_label_record(1)?;

        let txn = self.db.begin_write()?;
        Self::ensure_store(&txn, &scale.store)?;
        {
            let mut table = txn.open_table(SCALES_TABLE)?;
            let value = serde_json::to_vec(scale)?;
            table.insert((scale.store.as_str(), scale.number), value.as_slice())?;
        }
        txn.commit()?;

        Ok(())
    }

    /// Get a scale by store and number
    pub fn get_scale(&self, store: &str, number: u32) -> StorageResult<Option<Scale>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SCALES_TABLE)?;

        match table.get((store, number))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Scales of a store, sorted by number
    pub fn list_scales(&self, store: &str) -> StorageResult<Vec<Scale>> {
        let read_txn = self.db.begin_read()?;

        let stores = read_txn.open_table(STORES_TABLE)?;
        if stores.get(store)?.is_none() {
            return Err(StorageError::StoreNotFound(store.to_string()));
        }

        let table = read_txn.open_table(SCALES_TABLE)?;
        let mut scales = Vec::new();
        for result in table.range((store, 0u32)..=(store, u32::MAX))? {
            let (_, guard) = result?;
            scales.push(serde_json::from_slice(guard.value())?);
        }

        Ok(scales)
    }

    /// Delete one scale, returns whether it existed
    pub fn delete_scale(&self, store: &str, number: u32) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        Self::ensure_store(&txn, store)?;
        let removed = {
            let mut table = txn.open_table(SCALES_TABLE)?;
            let existed = table.remove((store, number))?.is_some();
            existed
        };
        txn.commit()?;

        Ok(removed)
    }

    /// Delete every scale of a store, returns the number removed
    pub fn clear_store(&self, store: &str) -> StorageResult<usize> {
        let txn = self.db.begin_write()?;
        Self::ensure_store(&txn, store)?;
        let deleted = {
            let mut table = txn.open_table(SCALES_TABLE)?;

            // Collect numbers to delete
            let mut numbers = Vec::new();
            for result in table.range((store, 0u32)..=(store, u32::MAX))? {
                let (key, _) = result?;
                let (_, number) = key.value();
                numbers.push(number);
            }

            for number in &numbers {
                table.remove((store, *number))?;
            }
            numbers.len()
        };
        txn.commit()?;

        info!(store = %store, deleted, "Cleared store scales");
        Ok(deleted)
    }

    fn ensure_store(txn: &WriteTransaction, store: &str) -> StorageResult<()> {
        let table = txn.open_table(STORES_TABLE)?;
        if table.get(store)?.is_none() {
            return Err(StorageError::StoreNotFound(store.to_string()));
        }
        Ok(())
    }

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let stores = read_txn.open_table(STORES_TABLE)?;
        let scales = read_txn.open_table(SCALES_TABLE)?;

        Ok(StorageStats {
            store_count: stores.len()?,
            scale_count: scales.len()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageStats {
    pub store_count: u64,
    pub scale_count: u64,
}
