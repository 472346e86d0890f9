//! Storage backends
//!
//! A backend is a flat byte-keyed map that can apply a [`WriteBatch`]
//! atomically. The entity store builds every multi-key change (a record plus
//! its index entry) as a single batch, so a backend failure never leaves an
//! indexed id without its record or the other way around.

use crate::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

/// One write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite a key
    Put { key: String, value: Vec<u8> },
    /// Remove a key if present
    Delete { key: String },
}

/// Writes applied all-or-nothing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a put (builder pattern)
    pub fn put(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
        });
        self
    }

    /// Add a delete (builder pattern)
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Byte-level key/value persistence used by the entity store
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend: Send + Sync {
    /// Read a key
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Apply every write in the batch, or none of them
    fn apply(&self, batch: WriteBatch) -> StoreResult<()>;
}

/// Volatile backend for tests and single-process deployments
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored under a prefix, in key order
    pub fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire lock: {}", e)))?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire lock: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire lock: {}", e)))?;
        for op in batch.ops {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Durable backend on an embedded sled database
#[derive(Debug, Clone)]
pub struct SledBackend {
    db: sled::Db,
    flush_on_write: bool,
}

impl SledBackend {
    /// Open (or create) a database directory
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = sled::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "Opened sled storage backend");
        Ok(Self {
            db,
            flush_on_write: true,
        })
    }

    /// Open a throwaway database that is removed when dropped
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self {
            db,
            flush_on_write: false,
        })
    }

    /// Control whether each batch is flushed to disk before returning
    pub fn with_flush_on_write(mut self, flush: bool) -> Self {
        self.flush_on_write = flush;
        self
    }
}

impl StorageBackend for SledBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key.as_bytes())?.map(|value| value.to_vec()))
    }

    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut sled_batch = sled::Batch::default();
        for op in batch.ops {
            match op {
                WriteOp::Put { key, value } => sled_batch.insert(key.as_bytes(), value),
                WriteOp::Delete { key } => sled_batch.remove(key.as_bytes()),
            }
        }
        self.db.apply_batch(sled_batch)?;
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }
}
