//! Generic keyed entity store
//!
//! One store serves every entity type; the type's [`Entity`] constants pick
//! the namespace and index. Layout in the backend:
//!
//! - `entity/{entity_name}/{id}`: JSON record
//! - `index/{index_name}`: JSON array of ids in insertion order
//!
//! # Concurrency
//!
//! Writes to one id are serialized through a per-record lock. Changes to an
//! index (create, delete, seeding, and saves that insert a new record) also
//! take the per-index lock, always after the record lock. Every multi-key
//! change is applied as one [`WriteBatch`], so the index and the stored
//! records agree after any successful or failed call.

use crate::backend::{StorageBackend, WriteBatch};
use crate::entity::{Entity, Singleton};
use crate::error::{StoreError, StoreResult};
use crate::locks::KeyedLocks;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Race-safe CRUD for every entity type
#[derive(Clone)]
pub struct EntityStore {
    backend: Arc<dyn StorageBackend>,
    locks: Arc<KeyedLocks>,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("active_locks", &self.locks.active())
            .finish()
    }
}

fn record_key<E: Entity>(id: &str) -> String {
    format!("entity/{}/{}", E::ENTITY_NAME, id)
}

fn index_key(index: &str) -> String {
    format!("index/{}", index)
}

fn index_of<E: Entity>() -> StoreResult<&'static str> {
    E::INDEX_NAME.ok_or(StoreError::NotIndexed(E::ENTITY_NAME))
}

impl EntityStore {
    /// Create a store over a backend
    pub fn new<B: StorageBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create a store over a shared backend
    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Insert a new indexed record.
    ///
    /// Fails with `AlreadyExists` when the id is taken. The record and its
    /// index entry are written in one batch.
    pub async fn create<E: Entity>(&self, record: E) -> StoreResult<E> {
        let index = index_of::<E>()?;
        let id = record.id().to_string();
        if id.is_empty() {
            return Err(StoreError::EmptyId(E::ENTITY_NAME));
        }

        let key = record_key::<E>(&id);
        let index_key = index_key(index);
        let _record_guard = self.locks.lock(&key).await;
        let _index_guard = self.locks.lock(&index_key).await;

        if self.backend.get(&key)?.is_some() {
            return Err(StoreError::AlreadyExists {
                entity: E::ENTITY_NAME,
                id,
            });
        }

        let mut ids = self.read_index(&index_key)?;
        if !ids.contains(&id) {
            ids.push(id.clone());
        }
        let batch = WriteBatch::new()
            .put(key, serde_json::to_vec(&record)?)
            .put(index_key, serde_json::to_vec(&ids)?);
        self.backend.apply(batch)?;

        debug!(entity = E::ENTITY_NAME, id = %id, "Created record");
        Ok(record)
    }

    /// Fetch a record by id
    pub async fn get<E: Entity>(&self, id: &str) -> StoreResult<E> {
        self.read::<E>(id)?.ok_or_else(|| StoreError::NotFound {
            entity: E::ENTITY_NAME,
            id: id.to_string(),
        })
    }

    /// Check whether a record is stored
    pub async fn exists<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        Ok(self.backend.get(&record_key::<E>(id))?.is_some())
    }

    /// Upsert a record under `id`.
    ///
    /// The record's own id is overwritten with `id`. For indexed types a
    /// record that did not exist yet is appended to the index in the same
    /// batch; existing records leave the index untouched.
    pub async fn save<E: Entity>(&self, id: &str, mut record: E) -> StoreResult<E> {
        if id.is_empty() {
            return Err(StoreError::EmptyId(E::ENTITY_NAME));
        }
        record.set_id(id.to_string());

        let key = record_key::<E>(id);
        let _record_guard = self.locks.lock(&key).await;
        let value = serde_json::to_vec(&record)?;
        let is_new = self.backend.get(&key)?.is_none();
        let inserting = E::INDEX_NAME.filter(|_| is_new);

        match inserting {
            Some(index) => {
                let index_key = index_key(index);
                let _index_guard = self.locks.lock(&index_key).await;
                let mut ids = self.read_index(&index_key)?;
                if !ids.iter().any(|existing| existing == id) {
                    ids.push(id.to_string());
                }
                self.backend.apply(
                    WriteBatch::new()
                        .put(key, value)
                        .put(index_key, serde_json::to_vec(&ids)?),
                )?;
                debug!(entity = E::ENTITY_NAME, id = %id, "Saved new record");
            }
            None => {
                self.backend.apply(WriteBatch::new().put(key, value))?;
                debug!(entity = E::ENTITY_NAME, id = %id, "Saved record");
            }
        }

        Ok(record)
    }

    /// Read, transform and write a record while holding its lock.
    ///
    /// Concurrent mutations of one id run one after another, each seeing the
    /// previous result. Fails with `NotFound` when the record is absent.
    pub async fn mutate<E, F>(&self, id: &str, update: F) -> StoreResult<E>
    where
        E: Entity,
        F: FnOnce(E) -> E + Send,
    {
        self.mutate_or(id, None, update).await
    }

    /// Remove a record and its index entry.
    ///
    /// Returns whether a record existed; deleting an absent id is not an
    /// error.
    pub async fn delete<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        let key = record_key::<E>(id);
        let _record_guard = self.locks.lock(&key).await;
        let existed = self.backend.get(&key)?.is_some();

        let mut batch = WriteBatch::new();
        if existed {
            batch = batch.delete(key);
        }

        let _index_guard = match E::INDEX_NAME {
            Some(index) => {
                let index_key = index_key(index);
                let guard = self.locks.lock(&index_key).await;
                let mut ids = self.read_index(&index_key)?;
                let before = ids.len();
                ids.retain(|existing| existing != id);
                if ids.len() != before {
                    batch = batch.put(index_key, serde_json::to_vec(&ids)?);
                }
                Some(guard)
            }
            None => None,
        };

        if !batch.is_empty() {
            self.backend.apply(batch)?;
        }

        debug!(entity = E::ENTITY_NAME, id = %id, existed, "Deleted record");
        Ok(existed)
    }

    /// All records of an indexed type, in index order
    pub async fn list<E: Entity>(&self) -> StoreResult<Vec<E>> {
        let index_key = index_key(index_of::<E>()?);
        let _index_guard = self.locks.lock(&index_key).await;

        let ids = self.read_index(&index_key)?;
        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.read::<E>(id)? {
                Some(record) => records.push(record),
                None => debug!(entity = E::ENTITY_NAME, id = %id, "Skipping index entry without record"),
            }
        }
        Ok(records)
    }

    /// Ids of an indexed type, in index order
    pub async fn ids<E: Entity>(&self) -> StoreResult<Vec<String>> {
        let index_key = index_key(index_of::<E>()?);
        let _index_guard = self.locks.lock(&index_key).await;
        self.read_index(&index_key)
    }

    /// Install the type's seed records if its index is empty.
    ///
    /// Returns how many records were installed; concurrent callers see at
    /// most one seeding pass take effect.
    pub async fn ensure_seed<E: Entity>(&self) -> StoreResult<usize> {
        let index_key = index_key(index_of::<E>()?);
        let _index_guard = self.locks.lock(&index_key).await;

        if !self.read_index(&index_key)?.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut batch = WriteBatch::new();
        for record in E::seed_data() {
            let id = record.id().to_string();
            if id.is_empty() || !seen.insert(id.clone()) {
                continue;
            }
            batch = batch.put(record_key::<E>(&id), serde_json::to_vec(&record)?);
            ids.push(id);
        }

        if ids.is_empty() {
            return Ok(0);
        }

        let count = ids.len();
        self.backend
            .apply(batch.put(index_key, serde_json::to_vec(&ids)?))?;
        info!(entity = E::ENTITY_NAME, count, "Seeded entity index");
        Ok(count)
    }

    /// Current singleton state, materializing the default on first access
    pub async fn singleton<S: Singleton>(&self) -> StoreResult<S> {
        let key = record_key::<S>(S::SINGLETON_ID);
        let _record_guard = self.locks.lock(&key).await;

        if let Some(state) = self.read::<S>(S::SINGLETON_ID)? {
            return Ok(state);
        }

        let mut state = S::initial_state();
        state.set_id(S::SINGLETON_ID.to_string());
        self.backend
            .apply(WriteBatch::new().put(key, serde_json::to_vec(&state)?))?;
        info!(entity = S::ENTITY_NAME, "Initialized singleton from default state");
        Ok(state)
    }

    /// Replace the singleton state
    pub async fn save_singleton<S: Singleton>(&self, state: S) -> StoreResult<S> {
        self.save(S::SINGLETON_ID, state).await
    }

    /// Transform the singleton state, starting from the default if absent
    pub async fn mutate_singleton<S, F>(&self, update: F) -> StoreResult<S>
    where
        S: Singleton,
        F: FnOnce(S) -> S + Send,
    {
        self.mutate_or(S::SINGLETON_ID, Some(S::initial_state()), update)
            .await
    }

    async fn mutate_or<E, F>(&self, id: &str, fallback: Option<E>, update: F) -> StoreResult<E>
    where
        E: Entity,
        F: FnOnce(E) -> E + Send,
    {
        let key = record_key::<E>(id);
        let _record_guard = self.locks.lock(&key).await;

        let current = match (self.read::<E>(id)?, fallback) {
            (Some(current), _) => current,
            (None, Some(fallback)) => fallback,
            (None, None) => {
                return Err(StoreError::NotFound {
                    entity: E::ENTITY_NAME,
                    id: id.to_string(),
                })
            }
        };

        let mut next = update(current);
        next.set_id(id.to_string());
        self.backend
            .apply(WriteBatch::new().put(key, serde_json::to_vec(&next)?))?;
        Ok(next)
    }

    fn read<E: Entity>(&self, id: &str) -> StoreResult<Option<E>> {
        match self.backend.get(&record_key::<E>(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_index(&self, index_key: &str) -> StoreResult<Vec<String>> {
        match self.backend.get(index_key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }
}
