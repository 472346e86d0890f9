//! Integration gateway
//!
//! Every integration read goes through [`IntegrationGateway::fetch_collection`]:
//! gate on settings, resolve credentials, perform one authenticated call,
//! pull the record array out of the response. The public reads only differ
//! in the request they describe and the mapping they apply.

use crate::credentials::{CredentialSource, Secret};
use crate::error::{GatewayError, GatewayResult};
use crate::http::HttpSettings;
use aegis_core::{
    map_collection, IntegrationAccess, MonitoringAlert, Outage, ServiceNowConfig,
    ServiceNowTicket, SolarWindsConfig,
};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::ACCEPT;
use serde_json::{json, Value};
use std::sync::Arc;

/// Days of outage history returned by [`IntegrationGateway::outage_history`]
pub const HISTORY_DAYS: i64 = 7;

/// Open tickets at most returned by [`IntegrationGateway::priority_tickets`]
pub const TICKET_LIMIT: u32 = 20;

const SERVICENOW_COLLECTION: &str = "result";
const SOLARWINDS_COLLECTION: &str = "results";
const SOLARWINDS_QUERY_PATH: &str = "/SolarWinds/InformationService/v3/Json/Query";

/// One upstream call
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    Get {
        path: String,
        query: Vec<(&'static str, String)>,
    },
    Post {
        path: String,
        body: Value,
    },
}

impl UpstreamRequest {
    fn path(&self) -> &str {
        match self {
            UpstreamRequest::Get { path, .. } | UpstreamRequest::Post { path, .. } => path,
        }
    }
}

/// Authenticated reads from the external integrations
#[derive(Clone)]
pub struct IntegrationGateway {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for IntegrationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationGateway")
            .field("credentials", &self.credentials.name())
            .finish()
    }
}

impl IntegrationGateway {
    pub fn new(client: reqwest::Client, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn from_settings(
        settings: &HttpSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> reqwest::Result<Self> {
        Ok(Self::new(settings.build_client()?, credentials))
    }

    /// Outages whose end time is in the future or unset
    pub async fn active_outages(&self, config: &ServiceNowConfig) -> GatewayResult<Vec<Outage>> {
        let eta = config.eta_path();
        let query = format!("{eta}>javascript:gs.now()^OR{eta}ISEMPTY");
        let request = servicenow_table_read(&config.outage_table, query, &config.field_mapping);
        let rows = self.fetch_collection(config.access(), request, SERVICENOW_COLLECTION).await?;
        Ok(map_collection(&rows, &config.field_mapping, &()))
    }

    /// Outages that ended during the last [`HISTORY_DAYS`] days, or are still open
    pub async fn outage_history(&self, config: &ServiceNowConfig) -> GatewayResult<Vec<Outage>> {
        self.outage_history_since(config, Utc::now() - Duration::days(HISTORY_DAYS))
            .await
    }

    pub async fn outage_history_since(
        &self,
        config: &ServiceNowConfig,
        since: DateTime<Utc>,
    ) -> GatewayResult<Vec<Outage>> {
        let query = format!(
            "{}>={}",
            config.eta_path(),
            since.format("%Y-%m-%d %H:%M:%S")
        );
        let request = servicenow_table_read(&config.outage_table, query, &config.field_mapping);
        let rows = self.fetch_collection(config.access(), request, SERVICENOW_COLLECTION).await?;
        Ok(map_collection(&rows, &config.field_mapping, &()))
    }

    /// Open top-priority tickets, most recently updated first
    pub async fn priority_tickets(
        &self,
        config: &ServiceNowConfig,
    ) -> GatewayResult<Vec<ServiceNowTicket>> {
        let query = format!(
            "stateNOT IN 6,7,8^ORDERBYDESCsys_updated_on^{}=1",
            config.priority_path()
        );
        let mut request =
            servicenow_table_read(&config.ticket_table, query, &config.ticket_field_mapping);
        if let UpstreamRequest::Get { query, .. } = &mut request {
            query.push(("sysparm_limit", TICKET_LIMIT.to_string()));
        }
        let rows = self.fetch_collection(config.access(), request, SERVICENOW_COLLECTION).await?;
        Ok(map_collection(
            &rows,
            &config.ticket_field_mapping,
            &config.ticket_links(),
        ))
    }

    /// Active alerts from the monitoring system's query endpoint
    pub async fn active_alerts(
        &self,
        config: &SolarWindsConfig,
    ) -> GatewayResult<Vec<MonitoringAlert>> {
        let request = UpstreamRequest::Post {
            path: SOLARWINDS_QUERY_PATH.to_string(),
            body: json!({ "query": config.query }),
        };
        let rows = self.fetch_collection(config.access(), request, SOLARWINDS_COLLECTION).await?;
        Ok(map_collection(&rows, &config.alert_field_mapping, &()))
    }

    /// Perform one authenticated read and return the records under `collection`.
    ///
    /// A JSON body without the collection array yields no records.
    pub async fn fetch_collection(
        &self,
        access: IntegrationAccess<'_>,
        request: UpstreamRequest,
        collection: &str,
    ) -> GatewayResult<Vec<Value>> {
        let integration = access.integration;
        if !access.is_configured() {
            return Err(GatewayError::NotConfigured { integration });
        }

        let username = self.credential(integration, access.username_var).await?;
        let password = self.credential(integration, access.password_var).await?;

        let url = format!("{}{}", access.base(), request.path());
        tracing::debug!(integration, url = %url, "Fetching integration records");

        let builder = match request {
            UpstreamRequest::Get { query, .. } => self.client.get(&url).query(&query),
            UpstreamRequest::Post { body, .. } => self.client.post(&url).json(&body),
        };
        let response = builder
            .basic_auth(username.as_str(), Some(password.as_str()))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                tracing::warn!(integration, error = %source, "Integration unreachable");
                GatewayError::Transport {
                    integration,
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(integration, status = status.as_u16(), "Integration request failed");
            return Err(GatewayError::Upstream {
                integration,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport {
                integration,
                source,
            })?;
        let document: Value = serde_json::from_slice(&body)
            .map_err(|source| GatewayError::InvalidBody {
                integration,
                source,
            })?;

        let rows = take_collection(document, collection).unwrap_or_else(|| {
            tracing::warn!(
                integration,
                collection,
                "Response has no record array, returning no records"
            );
            Vec::new()
        });
        tracing::info!(integration, count = rows.len(), "Fetched integration records");
        Ok(rows)
    }

    async fn credential(&self, integration: &'static str, variable: &str) -> GatewayResult<Secret> {
        self.credentials
            .lookup(variable)
            .await
            .ok_or_else(|| GatewayError::MissingCredentials {
                integration,
                variable: variable.to_string(),
            })
    }
}

fn servicenow_table_read(
    table: &str,
    query: String,
    mapping: &aegis_core::FieldMapping,
) -> UpstreamRequest {
    UpstreamRequest::Get {
        path: format!("/api/now/table/{table}"),
        query: vec![
            ("sysparm_display_value", "true".to_string()),
            ("sysparm_query", query),
            ("sysparm_fields", servicenow_fields(mapping)),
        ],
    }
}

/// `sys_id` followed by every mapped path, without duplicates
fn servicenow_fields(mapping: &aegis_core::FieldMapping) -> String {
    let mut fields = vec!["sys_id"];
    for path in mapping.paths() {
        if !fields.contains(&path) {
            fields.push(path);
        }
    }
    fields.join(",")
}

fn take_collection(document: Value, collection: &str) -> Option<Vec<Value>> {
    match document {
        Value::Object(mut map) => match map.remove(collection) {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    }
}
