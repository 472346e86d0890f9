//! Storage bindings for dashboard-managed records

use crate::records::{CollaborationBridge, Vendor};
use aegis_storage::Entity;

impl Entity for Vendor {
    const ENTITY_NAME: &'static str = "vendor";
    const INDEX_NAME: Option<&'static str> = Some("vendors");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn seed_data() -> Vec<Self> {
        vec![
            Vendor::api_json(
                "vendor-01",
                "CrowdStrike",
                "https://status.crowdstrike.com/",
                "https://status.crowdstrike.com/api/v2/status.json",
                "status.indicator",
                "none",
            ),
            Vendor::manual("vendor-02", "Citrix", "https://status.cloud.com/"),
            Vendor::manual("vendor-03", "FIS", "#"),
            Vendor::manual("vendor-04", "Sectigo", "https://sectigo.status.io/"),
            Vendor::manual("vendor-05", "Five9", "https://status.five9.com/"),
            Vendor::manual("vendor-06", "SolarWinds", "https://status.solarwinds.com/"),
        ]
    }
}

impl Entity for CollaborationBridge {
    const ENTITY_NAME: &'static str = "collaboration-bridge";
    const INDEX_NAME: Option<&'static str> = Some("collaboration-bridges");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn seed_data() -> Vec<Self> {
        let bridge = |id: &str, title: &str, participants, duration: &str, high| CollaborationBridge {
            id: id.to_string(),
            title: title.to_string(),
            participants,
            duration: duration.to_string(),
            is_high_severity: high,
            teams_call_url: "#".to_string(),
        };
        vec![
            bridge("bridge-01", "SEV1: API Gateway Latency", 12, "42m", true),
            bridge("bridge-02", "SEV2: Auth Service Errors", 7, "1h 15m", true),
            bridge("bridge-03", "War Room: Database Performance", 5, "23m", false),
        ]
    }
}
