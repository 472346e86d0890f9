//! Aegis Storage
//!
//! Keyed persistence for every mutable dashboard object. A single generic
//! [`EntityStore`] provides create/get/save/mutate/delete/list for any type
//! implementing [`Entity`], with an ordered secondary index for listing,
//! lazily-initialized singletons and one-shot seed data.
//!
//! # Guarantees
//!
//! - At most one record per id
//! - An id is in the index iff its record exists
//! - Mutations of one id are serialized; different ids proceed in parallel
//! - Concurrent seeding installs the seed set exactly once
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_storage::{EntityStore, MemoryBackend};
//!
//! let store = EntityStore::new(MemoryBackend::new());
//! store.ensure_seed::<Vendor>().await?;
//! let vendors = store.list::<Vendor>().await?;
//! ```

pub mod backend;
pub mod entity;
pub mod error;
pub mod locks;
pub mod store;

pub use backend::{MemoryBackend, SledBackend, StorageBackend, WriteBatch, WriteOp};
pub use entity::{Entity, Singleton, DEFAULT_SINGLETON_ID};
pub use error::{StoreError, StoreResult};
pub use locks::{KeyedGuard, KeyedLocks};
pub use store::EntityStore;
