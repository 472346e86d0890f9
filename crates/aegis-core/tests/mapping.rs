//! Field mapping against the default integration settings

use aegis_core::{
    extract, map_collection, map_record, AlertSeverity, ImpactLevel, MonitoringAlert, Outage,
    ServiceNowConfig, ServiceNowTicket, SolarWindsConfig, TicketStatus,
};
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn test_servicenow_outage_rows() {
    let config = ServiceNowConfig::default();
    let rows = vec![
        json!({
            "sys_id": "9d3f",
            "cmdb_ci": {"name": "Checkout API"},
            "u_impact_level": "SEV2",
            "begin": "2024-05-02 08:00:00",
            "end": "2024-05-02 12:00:00",
            "short_description": "Elevated 5xx",
            "u_teams_bridge_url": ""
        }),
        json!({"sys_id": "a1"}),
    ];

    let outages: Vec<Outage> = map_collection(&rows, &config.field_mapping, &());
    assert_eq!(outages.len(), 2);
    assert_eq!(outages[0].system_name, "Checkout API");
    assert_eq!(outages[0].impact_level, ImpactLevel::Sev2);
    assert_eq!(outages[0].teams_bridge_url, None);

    let wire = serde_json::to_value(&outages[0]).unwrap();
    assert_eq!(wire["startTime"], "2024-05-02T08:00:00Z");
    assert_eq!(wire["eta"], "2024-05-02T12:00:00Z");

    assert_eq!(outages[1].id, "a1");
    assert_eq!(outages[1].system_name, "Unknown System");
}

#[test]
fn test_outage_id_without_mapped_id() {
    let config: ServiceNowConfig = serde_json::from_value(json!({
        "enabled": true,
        "instanceUrl": "https://acme.service-now.com",
        "fieldMapping": {
            "systemName": "cmdb_ci.name",
            "impactLevel": "u_impact_level",
            "startTime": "begin",
            "eta": "end",
            "description": "short_description",
            "teamsBridgeUrl": "u_teams_bridge_url"
        }
    }))
    .unwrap();

    let row = json!({"sys_id": "9d3f", "cmdb_ci": {"name": "Checkout API"}});
    let outage: Outage = map_record(&row, &config.field_mapping, &());
    assert_eq!(outage.id, "9d3f");
    assert_eq!(outage.system_name, "Checkout API");

    let unidentified: Outage = map_record(&json!({}), &config.field_mapping, &());
    assert_eq!(unidentified.id, "N/A");
}

#[test]
fn test_servicenow_display_values() {
    let config = ServiceNowConfig::default();
    let row = json!({
        "sys_id": "46d4",
        "number": "INC0010001",
        "short_description": "VPN down",
        "cmdb_ci": {"name": "vpn-gw-01"},
        "state": "In Progress",
        "assignment_group": {"name": "Network Ops"},
        "priority": "1 - Critical"
    });

    let ticket: ServiceNowTicket =
        map_record(&row, &config.ticket_field_mapping, &config.ticket_links());
    assert_eq!(ticket.id, "INC0010001");
    assert_eq!(ticket.affected_ci, "vpn-gw-01");
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.assigned_team, "Network Ops");
    assert_eq!(
        ticket.ticket_url.as_deref(),
        Some("/nav_to.do?uri=incident.do?sys_id=46d4")
    );
}

#[test]
fn test_solarwinds_alert_rows() {
    let config = SolarWindsConfig::default();
    let row = json!({
        "AlertObjectID": 811,
        "EntityCaption": "Interface Down",
        "EntityDetailsUrl": "/Orion/View.aspx?NetObject=I:14",
        "TriggerTimeStamp": "2024-05-02T08:00:00.000",
        "Acknowledged": false,
        "Severity": 2
    });

    let alert: MonitoringAlert = map_record(&row, &config.alert_field_mapping, &());
    assert_eq!(alert.id, "811");
    assert_eq!(alert.alert_type, "Interface Down");
    assert_eq!(alert.severity, AlertSeverity::Critical);
    assert!(!alert.validated);
    assert!(alert.timestamp.is_some());

    let wire = serde_json::to_value(&alert).unwrap();
    assert_eq!(wire["type"], "Interface Down");
}

#[test]
fn test_missing_every_field_yields_defaults() {
    let config = SolarWindsConfig::default();
    let alert: MonitoringAlert = map_record(&json!({}), &config.alert_field_mapping, &());
    assert_eq!(alert.id, "N/A");
    assert_eq!(alert.alert_type, "Unknown Alert");
    assert_eq!(alert.affected_system, "N/A");
    assert_eq!(alert.timestamp, None);
    assert_eq!(alert.severity, AlertSeverity::Info);
    assert!(!alert.validated);
}

#[test]
fn test_empty_collection() {
    let config = ServiceNowConfig::default();
    let outages: Vec<Outage> = map_collection(&[], &config.field_mapping, &());
    assert!(outages.is_empty());
}

#[test]
fn test_extract_returns_trailing_null() {
    let item = json!({"a": {"b": null}});
    assert_eq!(extract(&item, "a.b"), Some(&Value::Null));
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 :-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_mapping_is_total(item in arb_json(), path in "[a-c0-2]{1,2}(\\.[a-c0-2]{1,2}){0,3}") {
        let _ = extract(&item, &path);

        let config = ServiceNowConfig::default();
        let outage: Outage = map_record(&item, &config.field_mapping, &());
        prop_assert!(!outage.id.is_empty());
        prop_assert!(!outage.system_name.is_empty());

        let ticket: ServiceNowTicket =
            map_record(&item, &config.ticket_field_mapping, &config.ticket_links());
        prop_assert!(!ticket.summary.is_empty());
    }

    #[test]
    fn prop_extract_finds_what_was_nested(keys in prop::collection::vec("[a-z]{1,6}", 1..5), leaf in any::<i64>()) {
        let mut item = json!(leaf);
        for key in keys.iter().rev() {
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(key.clone(), item);
            item = Value::Object(wrapper);
        }
        let path = keys.join(".");
        prop_assert_eq!(extract(&item, &path), Some(&json!(leaf)));
    }
}
