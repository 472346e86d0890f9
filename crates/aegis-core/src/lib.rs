//! Aegis Core
//!
//! Domain model for the Aegis operations dashboard: the canonical records
//! every panel renders, their storage bindings, integration settings, and
//! the pure logic that turns external data into those records.
//!
//! # Features
//!
//! - Canonical outage, alert, ticket, vendor and bridge records
//! - Configurable field mapping from arbitrary external JSON
//! - Vendor health decision from status-page documents
//! - Outage trend aggregation and CSV export
//! - Payload validation for dashboard-managed records

pub mod entities;
pub mod export;
pub mod integration;
pub mod mapping;
pub mod records;
pub mod status;
pub mod trends;
pub mod validation;

pub use export::outages_csv;
pub use integration::{IntegrationAccess, ServiceNowConfig, SolarWindsConfig};
pub use mapping::{extract, map_collection, map_record, Canonical, FieldMapping, TicketLinks};
pub use records::{
    AlertSeverity, CollaborationBridge, ImpactLevel, MonitoringAlert, Outage, ServiceNowTicket,
    TicketStatus, Vendor, VendorCheckType, VendorHealth, VendorStatus,
};
pub use trends::{outage_trends, TrendBreakdown, TrendReport};
pub use validation::{BridgeDraft, ValidationError, VendorDraft};
