//! Canonical record construction from mapped fields

use super::{coerce, Canonical, FieldReader};
use crate::records::{
    AlertSeverity, ImpactLevel, MonitoringAlert, Outage, ServiceNowTicket, TicketStatus,
};
use serde_json::Value;

const NOT_AVAILABLE: &str = "N/A";

/// Where ticket deep links point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLinks {
    pub instance_url: String,
    pub table: String,
}

impl TicketLinks {
    pub fn new(instance_url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            table: table.into(),
        }
    }

    /// Deep link to one ticket in the ticketing UI
    pub fn link(&self, sys_id: &str) -> String {
        format!(
            "{}/nav_to.do?uri={}.do?sys_id={}",
            self.instance_url.trim_end_matches('/'),
            self.table,
            sys_id
        )
    }
}

impl Canonical for Outage {
    type Context = ();

    fn from_fields(fields: &FieldReader<'_>, _: &()) -> Self {
        // Mappings saved without an `id` entry still carry the native record id
        let id = fields
            .text("id")
            .or_else(|| fields.raw("sys_id").and_then(coerce::text))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            id,
            system_name: fields
                .text("systemName")
                .unwrap_or_else(|| "Unknown System".to_string()),
            impact_level: fields
                .member("impactLevel", |v| v.as_str().and_then(ImpactLevel::parse))
                .unwrap_or_default(),
            start_time: fields.instant("startTime"),
            eta: fields.instant("eta"),
            teams_bridge_url: fields.text("teamsBridgeUrl"),
            description: fields
                .text("description")
                .unwrap_or_else(|| "No description provided.".to_string()),
        }
    }
}

impl Canonical for ServiceNowTicket {
    type Context = TicketLinks;

    fn from_fields(fields: &FieldReader<'_>, links: &TicketLinks) -> Self {
        let ticket_url = fields
            .raw("sys_id")
            .and_then(Value::as_str)
            .filter(|sys_id| !sys_id.is_empty())
            .map(|sys_id| links.link(sys_id));

        Self {
            id: fields.text("id").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            summary: fields
                .text("summary")
                .unwrap_or_else(|| "No summary".to_string()),
            affected_ci: fields
                .text("affectedCI")
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: fields
                .member("status", |v| v.as_str().and_then(TicketStatus::parse))
                .unwrap_or_default(),
            assigned_team: fields
                .text("assignedTeam")
                .unwrap_or_else(|| "Unassigned".to_string()),
            ticket_url,
        }
    }
}

impl Canonical for MonitoringAlert {
    type Context = ();

    fn from_fields(fields: &FieldReader<'_>, _: &()) -> Self {
        Self {
            id: fields.text("id").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            alert_type: fields
                .text("type")
                .unwrap_or_else(|| "Unknown Alert".to_string()),
            affected_system: fields
                .text("affectedSystem")
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            timestamp: fields.instant("timestamp"),
            severity: fields
                .member("severity", severity_from_value)
                .unwrap_or_default(),
            validated: fields.flag("validated").unwrap_or(false),
        }
    }
}

fn severity_from_value(value: &Value) -> Option<AlertSeverity> {
    match value {
        Value::Number(n) => n.as_i64().and_then(AlertSeverity::from_code),
        Value::String(s) => AlertSeverity::parse(s),
        _ => None,
    }
}
