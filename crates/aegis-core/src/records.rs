//! Canonical dashboard records
//!
//! The normalized shapes every panel consumes, whatever system the data
//! came from. Wire format is camelCase JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Outage impact, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[serde(rename = "SEV1")]
    Sev1,
    #[serde(rename = "SEV2")]
    Sev2,
    #[serde(rename = "SEV3")]
    Sev3,
    Degraded,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 4] = [
        ImpactLevel::Sev1,
        ImpactLevel::Sev2,
        ImpactLevel::Sev3,
        ImpactLevel::Degraded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Sev1 => "SEV1",
            ImpactLevel::Sev2 => "SEV2",
            ImpactLevel::Sev3 => "SEV3",
            ImpactLevel::Degraded => "Degraded",
        }
    }

    /// Parse a member name, ignoring case, spaces, dashes and underscores
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "sev1" => Some(ImpactLevel::Sev1),
            "sev2" => Some(ImpactLevel::Sev2),
            "sev3" => Some(ImpactLevel::Sev3),
            "degraded" => Some(ImpactLevel::Degraded),
            _ => None,
        }
    }
}

impl Default for ImpactLevel {
    fn default() -> Self {
        ImpactLevel::Degraded
    }
}

/// An active or historical outage from the ticketing system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outage {
    pub id: String,
    pub system_name: String,
    pub impact_level: ImpactLevel,
    pub start_time: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub teams_bridge_url: Option<String>,
    pub description: String,
}

/// Monitoring alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    /// Map the monitoring system's numeric severity code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(AlertSeverity::Info),
            2 => Some(AlertSeverity::Critical),
            3 => Some(AlertSeverity::Warning),
            _ => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(code) = raw.trim().parse::<i64>() {
            return Self::from_code(code);
        }
        match normalize_token(raw).as_str() {
            "critical" => Some(AlertSeverity::Critical),
            "warning" => Some(AlertSeverity::Warning),
            "info" => Some(AlertSeverity::Info),
            _ => None,
        }
    }
}

impl Default for AlertSeverity {
    fn default() -> Self {
        AlertSeverity::Info
    }
}

/// An active alert from the network monitoring system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub affected_system: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub severity: AlertSeverity,
    pub validated: bool,
}

/// Ticket workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Resolved,
}

impl TicketStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "new" => Some(TicketStatus::New),
            "inprogress" => Some(TicketStatus::InProgress),
            "onhold" => Some(TicketStatus::OnHold),
            "resolved" => Some(TicketStatus::Resolved),
            _ => None,
        }
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::New
    }
}

/// A high-priority ticket from the ticketing system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNowTicket {
    pub id: String,
    pub summary: String,
    #[serde(rename = "affectedCI")]
    pub affected_ci: String,
    pub status: TicketStatus,
    pub assigned_team: String,
    pub ticket_url: Option<String>,
}

/// How a vendor's health is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorCheckType {
    /// Poll a JSON status endpoint and compare one value
    ApiJson,
    /// No live signal
    Manual,
}

impl Default for VendorCheckType {
    fn default() -> Self {
        VendorCheckType::Manual
    }
}

/// A third-party vendor whose status the dashboard tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status_type: VendorCheckType,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub expected_value: Option<String>,
}

/// Settings needed to poll a vendor's JSON status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonProbe<'a> {
    pub api_url: &'a str,
    pub json_path: &'a str,
    pub expected_value: &'a str,
}

impl Vendor {
    /// Create a manually-tracked vendor
    pub fn manual(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            status_type: VendorCheckType::Manual,
            api_url: None,
            json_path: None,
            expected_value: None,
        }
    }

    /// Create a vendor polled through a JSON status endpoint
    pub fn api_json(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        api_url: impl Into<String>,
        json_path: impl Into<String>,
        expected_value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            status_type: VendorCheckType::ApiJson,
            api_url: Some(api_url.into()),
            json_path: Some(json_path.into()),
            expected_value: Some(expected_value.into()),
        }
    }

    /// Probe settings, if this vendor is fully configured for JSON polling
    pub fn json_probe(&self) -> Option<JsonProbe<'_>> {
        if self.status_type != VendorCheckType::ApiJson {
            return None;
        }
        Some(JsonProbe {
            api_url: non_empty(&self.api_url)?,
            json_path: non_empty(&self.json_path)?,
            expected_value: non_empty(&self.expected_value)?,
        })
    }
}

/// Tri-state vendor health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorHealth {
    Operational,
    Degraded,
    Outage,
}

/// A vendor's evaluated health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorStatus {
    pub id: String,
    pub name: String,
    pub status: VendorHealth,
    pub url: String,
}

impl VendorStatus {
    pub fn new(vendor: &Vendor, status: VendorHealth) -> Self {
        Self {
            id: vendor.id.clone(),
            name: vendor.name.clone(),
            status,
            url: vendor.url.clone(),
        }
    }
}

/// An open incident call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationBridge {
    pub id: String,
    pub title: String,
    pub participants: u32,
    pub duration: String,
    pub is_high_severity: bool,
    pub teams_call_url: String,
}

/// Render an instant the way records serialize it
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
