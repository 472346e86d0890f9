//! Integration settings
//!
//! Each external integration keeps one settings record in the store. The
//! records hold the names of the credential variables, never their values.

use crate::mapping::{FieldMapping, TicketLinks};
use aegis_storage::{Entity, Singleton, DEFAULT_SINGLETON_ID};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOLARWINDS_QUERY: &str = "SELECT AlertObjectID, EntityCaption, EntityDetailsUrl, TriggerTimeStamp, Acknowledged, Severity FROM Orion.AlertActive ORDER BY TriggerTimeStamp DESC";

/// What the gateway needs to reach one integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationAccess<'a> {
    /// Integration name, used in errors and logs
    pub integration: &'static str,
    pub enabled: bool,
    pub base_url: &'a str,
    pub username_var: &'a str,
    pub password_var: &'a str,
}

impl IntegrationAccess<'_> {
    /// Enabled with a non-blank endpoint
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.base_url.trim().is_empty()
    }

    /// Endpoint URL without trailing slashes
    pub fn base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

/// Ticketing system settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceNowConfig {
    pub id: String,
    pub enabled: bool,
    pub instance_url: String,
    pub username_var: String,
    pub password_var: String,
    pub outage_table: String,
    pub field_mapping: FieldMapping,
    pub ticket_table: String,
    pub ticket_field_mapping: FieldMapping,
}

impl Default for ServiceNowConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_SINGLETON_ID.to_string(),
            enabled: false,
            instance_url: String::new(),
            username_var: "SERVICENOW_USERNAME".to_string(),
            password_var: "SERVICENOW_PASSWORD".to_string(),
            outage_table: "cmdb_ci_outage".to_string(),
            field_mapping: FieldMapping::new()
                .with("id", "sys_id")
                .with("systemName", "cmdb_ci.name")
                .with("impactLevel", "u_impact_level")
                .with("startTime", "begin")
                .with("eta", "end")
                .with("description", "short_description")
                .with("teamsBridgeUrl", "u_teams_bridge_url"),
            ticket_table: "incident".to_string(),
            ticket_field_mapping: FieldMapping::new()
                .with("id", "number")
                .with("summary", "short_description")
                .with("affectedCI", "cmdb_ci.name")
                .with("status", "state")
                .with("assignedTeam", "assignment_group.name")
                .with("priority", "priority"),
        }
    }
}

impl ServiceNowConfig {
    pub fn access(&self) -> IntegrationAccess<'_> {
        IntegrationAccess {
            integration: "ServiceNow",
            enabled: self.enabled,
            base_url: &self.instance_url,
            username_var: &self.username_var,
            password_var: &self.password_var,
        }
    }

    /// The external field holding outage end times
    pub fn eta_path(&self) -> &str {
        self.field_mapping.path("eta").unwrap_or("end")
    }

    /// The external field holding ticket priority
    pub fn priority_path(&self) -> &str {
        self.ticket_field_mapping.path("priority").unwrap_or("priority")
    }

    pub fn ticket_links(&self) -> TicketLinks {
        TicketLinks::new(self.instance_url.trim(), self.ticket_table.as_str())
    }
}

impl Entity for ServiceNowConfig {
    const ENTITY_NAME: &'static str = "servicenow-config";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Singleton for ServiceNowConfig {
    fn initial_state() -> Self {
        Self::default()
    }
}

/// Network monitoring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolarWindsConfig {
    pub id: String,
    pub enabled: bool,
    pub api_url: String,
    pub username_var: String,
    pub password_var: String,
    pub query: String,
    pub alert_field_mapping: FieldMapping,
}

impl Default for SolarWindsConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_SINGLETON_ID.to_string(),
            enabled: false,
            api_url: String::new(),
            username_var: "SOLARWINDS_USERNAME".to_string(),
            password_var: "SOLARWINDS_PASSWORD".to_string(),
            query: DEFAULT_SOLARWINDS_QUERY.to_string(),
            alert_field_mapping: FieldMapping::new()
                .with("id", "AlertObjectID")
                .with("type", "EntityCaption")
                .with("affectedSystem", "EntityDetailsUrl")
                .with("timestamp", "TriggerTimeStamp")
                .with("severity", "Severity")
                .with("validated", "Acknowledged"),
        }
    }
}

impl SolarWindsConfig {
    pub fn access(&self) -> IntegrationAccess<'_> {
        IntegrationAccess {
            integration: "SolarWinds",
            enabled: self.enabled,
            base_url: &self.api_url,
            username_var: &self.username_var,
            password_var: &self.password_var,
        }
    }
}

impl Entity for SolarWindsConfig {
    const ENTITY_NAME: &'static str = "solarwinds-config";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Singleton for SolarWindsConfig {
    fn initial_state() -> Self {
        Self::default()
    }
}
