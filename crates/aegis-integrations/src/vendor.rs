//! Vendor status probing

use crate::http::HttpSettings;
use aegis_core::status::{evaluate_body, unprobed_health};
use aegis_core::{Vendor, VendorHealth, VendorStatus};
use futures::future::join_all;

/// Evaluates vendor health, recomputed on every call
#[derive(Debug, Clone)]
pub struct VendorStatusEvaluator {
    client: reqwest::Client,
}

impl VendorStatusEvaluator {
    /// The client should carry the probe timeout and user agent
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &HttpSettings) -> reqwest::Result<Self> {
        Ok(Self::new(settings.build_client()?))
    }

    /// Status of every vendor, checked concurrently, in input order
    pub async fn statuses(&self, vendors: &[Vendor]) -> Vec<VendorStatus> {
        join_all(vendors.iter().map(|vendor| self.evaluate(vendor))).await
    }

    pub async fn evaluate(&self, vendor: &Vendor) -> VendorStatus {
        let health = match unprobed_health(vendor) {
            Some(health) => health,
            None => self.probe(vendor).await,
        };
        VendorStatus::new(vendor, health)
    }

    async fn probe(&self, vendor: &Vendor) -> VendorHealth {
        let Some(probe) = vendor.json_probe() else {
            return VendorHealth::Operational;
        };

        let response = match self.client.get(probe.api_url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(vendor = %vendor.name, error = %error, "Vendor status probe failed");
                return VendorHealth::Degraded;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(vendor = %vendor.name, status = status.as_u16(), "Vendor status page is failing");
            return VendorHealth::Degraded;
        }

        match response.bytes().await {
            Ok(body) => {
                let health = evaluate_body(&body, probe.json_path, probe.expected_value);
                tracing::debug!(vendor = %vendor.name, health = ?health, "Vendor status evaluated");
                health
            }
            Err(error) => {
                tracing::warn!(vendor = %vendor.name, error = %error, "Vendor status body unreadable");
                VendorHealth::Degraded
            }
        }
    }
}
