//! Vendor health decision
//!
//! The network probe lives in `aegis-integrations`; this module decides the
//! tri-state health from what the probe observed.

use crate::mapping::{extract, stringify};
use crate::records::{Vendor, VendorHealth};
use serde_json::Value;

/// Health of a vendor that is not probed over the network
pub fn unprobed_health(vendor: &Vendor) -> Option<VendorHealth> {
    match vendor.json_probe() {
        Some(_) => None,
        None => Some(VendorHealth::Operational),
    }
}

/// Decide health from a successful response body.
///
/// A body that is not JSON, or lacks the path, is `Degraded`.
pub fn evaluate_body(body: &[u8], json_path: &str, expected: &str) -> VendorHealth {
    match serde_json::from_slice::<Value>(body) {
        Ok(document) => evaluate_document(&document, json_path, expected),
        Err(_) => VendorHealth::Degraded,
    }
}

/// Decide health from a decoded status document
pub fn evaluate_document(document: &Value, json_path: &str, expected: &str) -> VendorHealth {
    match extract(document, json_path) {
        Some(value) if stringify(value) == expected => VendorHealth::Operational,
        Some(_) => VendorHealth::Outage,
        None => VendorHealth::Degraded,
    }
}
