//! Aegis Integrations
//!
//! Outbound side of the dashboard: resolving integration credentials,
//! reading records from the ticketing and monitoring systems, and probing
//! vendor status pages.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_integrations::{CredentialChain, EnvCredentials, HttpSettings, IntegrationGateway};
//! use std::sync::Arc;
//!
//! let credentials = Arc::new(CredentialChain::new().with_source(EnvCredentials::new()));
//! let gateway = IntegrationGateway::from_settings(&HttpSettings::default(), credentials)?;
//! let outages = gateway.active_outages(&servicenow_config).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod gateway;
pub mod http;
pub mod vendor;

pub use credentials::{
    CredentialChain, CredentialError, CredentialSource, CredentialTable, DotEnvCredentials,
    EnvCredentials, Secret,
};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{IntegrationGateway, UpstreamRequest};
pub use http::HttpSettings;
pub use vendor::VendorStatusEvaluator;
