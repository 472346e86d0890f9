//! Vendor status probing against mock status pages

use aegis_core::{Vendor, VendorHealth};
use aegis_integrations::{HttpSettings, VendorStatusEvaluator};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn evaluator() -> VendorStatusEvaluator {
    let settings = HttpSettings::default().with_timeout(Duration::from_millis(300));
    VendorStatusEvaluator::from_settings(&settings).unwrap()
}

fn probed(server: &MockServer, route: &str) -> Vendor {
    Vendor::api_json(
        "vendor-01",
        "CrowdStrike",
        "https://status.crowdstrike.com/",
        format!("{}{}", server.uri(), route),
        "status.indicator",
        "none",
    )
}

async fn status_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("user-agent", "AegisDashboard/1.0"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_indicator_none_is_operational() {
    let server = MockServer::start().await;
    status_page(
        &server,
        "/api/v2/status.json",
        ResponseTemplate::new(200).set_body_json(json!({"status": {"indicator": "none"}})),
    )
    .await;

    let status = evaluator().evaluate(&probed(&server, "/api/v2/status.json")).await;
    assert_eq!(status.status, VendorHealth::Operational);
    assert_eq!(status.url, "https://status.crowdstrike.com/");
}

#[tokio::test]
async fn test_other_indicator_is_outage() {
    let server = MockServer::start().await;
    status_page(
        &server,
        "/api/v2/status.json",
        ResponseTemplate::new(200).set_body_json(json!({"status": {"indicator": "major"}})),
    )
    .await;

    let status = evaluator().evaluate(&probed(&server, "/api/v2/status.json")).await;
    assert_eq!(status.status, VendorHealth::Outage);
}

#[tokio::test]
async fn test_failures_are_degraded() {
    let server = MockServer::start().await;
    status_page(&server, "/error", ResponseTemplate::new(503)).await;
    status_page(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": {"indicator": "none"}}))
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    status_page(
        &server,
        "/html",
        ResponseTemplate::new(200).set_body_string("<html></html>"),
    )
    .await;
    status_page(
        &server,
        "/other-shape",
        ResponseTemplate::new(200).set_body_json(json!({"page": {"name": "x"}})),
    )
    .await;

    let vendors: Vec<Vendor> = ["/error", "/slow", "/html", "/other-shape"]
        .iter()
        .map(|route| probed(&server, route))
        .collect();
    let statuses = evaluator().statuses(&vendors).await;

    assert_eq!(statuses.len(), 4);
    assert!(statuses.iter().all(|s| s.status == VendorHealth::Degraded));
}

#[tokio::test]
async fn test_manual_vendors_are_not_probed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut incomplete = probed(&server, "/api/v2/status.json");
    incomplete.expected_value = None;
    let vendors = vec![Vendor::manual("vendor-03", "FIS", "#"), incomplete];

    let statuses = evaluator().statuses(&vendors).await;
    assert_eq!(statuses[0].id, "vendor-03");
    assert!(statuses.iter().all(|s| s.status == VendorHealth::Operational));
}

#[tokio::test]
async fn test_results_keep_vendor_order() {
    let server = MockServer::start().await;
    status_page(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": {"indicator": "major"}}))
            .set_delay(Duration::from_millis(100)),
    )
    .await;

    let vendors = vec![
        probed(&server, "/slow"),
        Vendor::manual("vendor-02", "Citrix", "https://status.cloud.com/"),
    ];
    let statuses = evaluator().statuses(&vendors).await;

    assert_eq!(statuses[0].status, VendorHealth::Outage);
    assert_eq!(statuses[1].name, "Citrix");
}
