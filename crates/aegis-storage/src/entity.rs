//! Entity type tags
//!
//! Every stored domain object implements [`Entity`]. The associated
//! constants act as the type tag the generic store dispatches on: the
//! storage namespace, and for indexed types the name of the secondary index
//! that tracks membership. Types without an index are singletons and
//! implement [`Singleton`] as well.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Well-known id used by singleton entities unless they override it
pub const DEFAULT_SINGLETON_ID: &str = "global-config";

/// A record stored under a unique string id
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage namespace for records of this type
    const ENTITY_NAME: &'static str;

    /// Name of the secondary index listing every stored id.
    ///
    /// `None` marks a singleton type: never indexed, never listed.
    const INDEX_NAME: Option<&'static str> = None;

    /// The record's id
    fn id(&self) -> &str;

    /// Replace the record's id
    fn set_id(&mut self, id: String);

    /// Fixed record set installed by `ensure_seed` on an empty index
    fn seed_data() -> Vec<Self> {
        Vec::new()
    }
}

/// An entity with exactly one instance, created lazily from a default state
pub trait Singleton: Entity {
    /// The single id this type is stored under
    const SINGLETON_ID: &'static str = DEFAULT_SINGLETON_ID;

    /// State materialized on first access
    fn initial_state() -> Self;
}
