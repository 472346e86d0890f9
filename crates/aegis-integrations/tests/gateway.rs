//! Integration gateway against mock upstreams

use aegis_core::{AlertSeverity, ImpactLevel, ServiceNowConfig, SolarWindsConfig, TicketStatus};
use aegis_integrations::{CredentialTable, GatewayError, HttpSettings, IntegrationGateway};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// "user:pass"
const BASIC_AUTH: &str = "Basic dXNlcjpwYXNz";

fn gateway(credentials: CredentialTable) -> IntegrationGateway {
    let settings = HttpSettings::default().with_timeout(Duration::from_millis(500));
    IntegrationGateway::from_settings(&settings, Arc::new(credentials)).unwrap()
}

fn servicenow_credentials() -> CredentialTable {
    CredentialTable::new()
        .with("SERVICENOW_USERNAME", "user")
        .with("SERVICENOW_PASSWORD", "pass")
}

fn servicenow(server: &MockServer) -> ServiceNowConfig {
    ServiceNowConfig {
        enabled: true,
        instance_url: server.uri(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_disabled_integration_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = servicenow(&server);
    config.enabled = false;
    let result = gateway(servicenow_credentials()).active_outages(&config).await;
    assert!(matches!(result, Err(GatewayError::NotConfigured { integration: "ServiceNow" })));

    let mut config = servicenow(&server);
    config.instance_url = "  ".to_string();
    let result = gateway(servicenow_credentials()).priority_tickets(&config).await;
    assert!(matches!(result, Err(GatewayError::NotConfigured { .. })));
}

#[tokio::test]
async fn test_missing_credentials_name_the_variable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = CredentialTable::new()
        .with("SERVICENOW_USERNAME", "user")
        .with("SERVICENOW_PASSWORD", "");
    let result = gateway(credentials).active_outages(&servicenow(&server)).await;

    match result {
        Err(GatewayError::MissingCredentials { variable, .. }) => {
            assert_eq!(variable, "SERVICENOW_PASSWORD")
        }
        other => panic!("expected missing credentials, got {other:?}"),
    }
}

#[tokio::test]
async fn test_active_outages_request_and_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/cmdb_ci_outage"))
        .and(header("authorization", BASIC_AUTH))
        .and(header("accept", "application/json"))
        .and(query_param("sysparm_display_value", "true"))
        .and(query_param("sysparm_query", "end>javascript:gs.now()^ORendISEMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {
                    "sys_id": "a1",
                    "cmdb_ci": {"name": "Payments"},
                    "u_impact_level": "SEV1",
                    "begin": "2024-05-02 08:00:00",
                    "end": "",
                    "short_description": "Card auth failing"
                },
                {"sys_id": "a2", "u_impact_level": "whatever"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outages = gateway(servicenow_credentials())
        .active_outages(&servicenow(&server))
        .await
        .unwrap();

    assert_eq!(outages.len(), 2);
    assert_eq!(outages[0].system_name, "Payments");
    assert_eq!(outages[0].impact_level, ImpactLevel::Sev1);
    assert_eq!(outages[0].eta, None);
    assert_eq!(outages[1].impact_level, ImpactLevel::Degraded);
    assert_eq!(outages[1].description, "No description provided.");
}

#[tokio::test]
async fn test_outage_history_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/cmdb_ci_outage"))
        .and(query_param("sysparm_query", "end>=2024-05-01 12:30:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .expect(1)
        .mount(&server)
        .await;

    let since = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let outages = gateway(servicenow_credentials())
        .outage_history_since(&servicenow(&server), since)
        .await
        .unwrap();
    assert!(outages.is_empty());
}

#[tokio::test]
async fn test_priority_tickets_request_and_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param(
            "sysparm_query",
            "stateNOT IN 6,7,8^ORDERBYDESCsys_updated_on^priority=1",
        ))
        .and(query_param("sysparm_limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "sys_id": "f00",
                "number": "INC0042",
                "short_description": "Email delayed",
                "state": "On Hold",
                "assignment_group": {"name": "Messaging"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = servicenow(&server);
    let tickets = gateway(servicenow_credentials())
        .priority_tickets(&config)
        .await
        .unwrap();

    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, "INC0042");
    assert_eq!(tickets[0].status, TicketStatus::OnHold);
    assert_eq!(tickets[0].affected_ci, "N/A");
    assert_eq!(
        tickets[0].ticket_url,
        Some(format!("{}/nav_to.do?uri=incident.do?sys_id=f00", server.uri()))
    );
}

#[tokio::test]
async fn test_upstream_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = gateway(servicenow_credentials())
        .active_outages(&servicenow(&server))
        .await;
    assert!(matches!(result, Err(GatewayError::Upstream { status: 401, .. })));
}

#[tokio::test]
async fn test_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = gateway(servicenow_credentials())
        .active_outages(&servicenow(&server))
        .await;
    assert!(matches!(result, Err(GatewayError::InvalidBody { .. })));
}

#[tokio::test]
async fn test_malformed_shape_yields_no_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": {"message": "no"}})))
        .mount(&server)
        .await;

    let outages = gateway(servicenow_credentials())
        .active_outages(&servicenow(&server))
        .await
        .unwrap();
    assert!(outages.is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let result = gateway(servicenow_credentials())
        .active_outages(&servicenow(&server))
        .await;
    assert!(matches!(result, Err(GatewayError::Transport { .. })));
}

#[tokio::test]
async fn test_active_alerts_query() {
    let server = MockServer::start().await;
    let config = SolarWindsConfig {
        enabled: true,
        api_url: server.uri(),
        ..Default::default()
    };

    Mock::given(method("POST"))
        .and(path("/SolarWinds/InformationService/v3/Json/Query"))
        .and(header("authorization", BASIC_AUTH))
        .and(body_json(json!({"query": config.query})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "AlertObjectID": 17,
                    "EntityCaption": "Node Down",
                    "EntityDetailsUrl": "core-sw-01",
                    "TriggerTimeStamp": "2024-05-02T08:00:00.000",
                    "Acknowledged": true,
                    "Severity": 3
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = CredentialTable::new()
        .with("SOLARWINDS_USERNAME", "user")
        .with("SOLARWINDS_PASSWORD", "pass");
    let alerts = gateway(credentials).active_alerts(&config).await.unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "17");
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    assert!(alerts[0].validated);
}
