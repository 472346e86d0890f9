//! Payload validation for dashboard-managed records
//!
//! Incoming vendor and bridge payloads are drafts: every field optional, so
//! missing fields are reported by name instead of failing deserialization.

use crate::records::{CollaborationBridge, Vendor, VendorCheckType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A payload missing a required field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{required} are required")]
pub struct ValidationError {
    pub required: &'static str,
}

/// A vendor as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDraft {
    pub name: Option<String>,
    pub url: Option<String>,
    pub status_type: Option<VendorCheckType>,
    pub api_url: Option<String>,
    pub json_path: Option<String>,
    pub expected_value: Option<String>,
}

impl VendorDraft {
    const REQUIRED: &'static str = "name, url, and statusType";

    /// Build the full record, requiring name, url and check type
    pub fn into_vendor(self, id: impl Into<String>) -> Result<Vendor, ValidationError> {
        let missing = ValidationError {
            required: Self::REQUIRED,
        };
        let (Some(name), Some(url), Some(status_type)) =
            (present(self.name), present(self.url), self.status_type)
        else {
            return Err(missing);
        };
        Ok(Vendor {
            id: id.into(),
            name,
            url,
            status_type,
            api_url: self.api_url,
            json_path: self.json_path,
            expected_value: self.expected_value,
        })
    }
}

/// A collaboration bridge as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeDraft {
    pub title: Option<String>,
    pub participants: Option<u32>,
    pub duration: Option<String>,
    pub is_high_severity: Option<bool>,
    pub teams_call_url: Option<String>,
}

impl BridgeDraft {
    const REQUIRED: &'static str = "title, teamsCallUrl, and participants";

    /// Require title, call URL and participant count
    pub fn validate(&self) -> Result<(), ValidationError> {
        let complete = self.title.as_deref().is_some_and(|t| !t.is_empty())
            && self.teams_call_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.participants.is_some();
        if complete {
            Ok(())
        } else {
            Err(ValidationError {
                required: Self::REQUIRED,
            })
        }
    }

    /// Build a new bridge; duration defaults to `0m`, severity to low
    pub fn into_bridge(self, id: impl Into<String>) -> Result<CollaborationBridge, ValidationError> {
        self.validate()?;
        Ok(CollaborationBridge {
            id: id.into(),
            title: self.title.unwrap_or_default(),
            participants: self.participants.unwrap_or_default(),
            duration: self
                .duration
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "0m".to_string()),
            is_high_severity: self.is_high_severity.unwrap_or(false),
            teams_call_url: self.teams_call_url.unwrap_or_default(),
        })
    }

    /// Overlay the supplied fields on an existing bridge, keeping its id
    pub fn merge_into(self, current: CollaborationBridge) -> CollaborationBridge {
        CollaborationBridge {
            id: current.id,
            title: self.title.unwrap_or(current.title),
            participants: self.participants.unwrap_or(current.participants),
            duration: self.duration.unwrap_or(current.duration),
            is_high_severity: self.is_high_severity.unwrap_or(current.is_high_severity),
            teams_call_url: self.teams_call_url.unwrap_or(current.teams_call_url),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
