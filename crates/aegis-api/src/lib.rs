//! Aegis API
//!
//! REST surface of the Aegis operations dashboard. Handlers are thin: they
//! load settings and records from the [`EntityStore`](aegis_storage::EntityStore),
//! call into the integration gateway or vendor prober, and wrap the result
//! in a `{success, data | error, code}` envelope.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_api::{create_router, AppState, Settings};
//! use std::sync::Arc;
//!
//! let store = Settings::default().storage.open_store()?;
//! let state = AppState::new(store, gateway, vendors);
//! let router = create_router(Arc::new(state));
//! ```

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ConfigError, Settings, StorageKind};
pub use error::{ApiError, ApiResponse};
pub use routes::{create_router, AppState};
