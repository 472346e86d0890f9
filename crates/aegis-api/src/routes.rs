//! Route definitions
//!
//! - `/api/vendors` CRUD and `/api/vendors/status`
//! - `/api/servicenow/config`, `/api/solarwinds/config` integration settings
//! - `/api/outages/*`, `/api/servicenow/tickets`, `/api/monitoring/alerts`
//!   live integration reads
//! - `/api/collaboration/bridges` CRUD
//! - `/health`

use crate::error::{ApiError, ApiResponse};
use aegis_core::{
    outage_trends, outages_csv, BridgeDraft, CollaborationBridge, MonitoringAlert, Outage,
    ServiceNowConfig, ServiceNowTicket, SolarWindsConfig, TrendBreakdown, TrendReport, Vendor,
    VendorDraft, VendorStatus,
};
use aegis_integrations::{IntegrationGateway, VendorStatusEvaluator};
use aegis_storage::EntityStore;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Longest trend window served, matching the history read
pub const MAX_TREND_DAYS: u32 = 7;

/// Handler state shared across all routes
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: EntityStore,
    pub gateway: IntegrationGateway,
    pub vendors: VendorStatusEvaluator,
}

impl AppState {
    pub fn new(
        store: EntityStore,
        gateway: IntegrationGateway,
        vendors: VendorStatusEvaluator,
    ) -> Self {
        Self {
            store,
            gateway,
            vendors,
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Vendors
        .route("/api/vendors", get(list_vendors).post(create_vendor))
        .route("/api/vendors/status", get(vendor_statuses))
        .route("/api/vendors/:id", put(update_vendor).delete(delete_vendor))
        // Integration settings
        .route(
            "/api/servicenow/config",
            get(get_servicenow_config).post(save_servicenow_config),
        )
        .route(
            "/api/solarwinds/config",
            get(get_solarwinds_config).post(save_solarwinds_config),
        )
        // Live integration reads
        .route("/api/outages/active", get(active_outages))
        .route("/api/outages/history", get(outage_history))
        .route("/api/outages/history/export", get(export_outage_history))
        .route("/api/outages/trends", get(outage_trend_report))
        .route("/api/servicenow/tickets", get(priority_tickets))
        .route("/api/monitoring/alerts", get(monitoring_alerts))
        // Collaboration bridges
        .route(
            "/api/collaboration/bridges",
            get(list_bridges).post(create_bridge),
        )
        .route(
            "/api/collaboration/bridges/:id",
            put(update_bridge).delete(delete_bridge),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidInput(format!("Invalid JSON body: {e}")))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> ApiResult<HealthResponse> {
    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

// --- Vendors ---

async fn list_vendors(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Vendor>> {
    state.store.ensure_seed::<Vendor>().await?;
    ok(state.store.list::<Vendor>().await?)
}

async fn create_vendor(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Vendor> {
    let draft: VendorDraft = parse_body(&body)?;
    let vendor = draft.into_vendor(uuid::Uuid::new_v4().to_string())?;
    ok(state.store.create(vendor).await?)
}

async fn update_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Vendor> {
    let draft: VendorDraft = parse_body(&body)?;
    let vendor = draft.into_vendor(id.as_str())?;
    let updated = state
        .store
        .mutate::<Vendor, _>(&id, move |_| vendor)
        .await
        .map_err(|e| not_found_as("Vendor not found", e))?;
    ok(updated)
}

async fn delete_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    if !state.store.delete::<Vendor>(&id).await? {
        return Err(ApiError::NotFound("Vendor not found".to_string()));
    }
    ok(Deleted { id, deleted: true })
}

async fn vendor_statuses(State(state): State<Arc<AppState>>) -> ApiResult<Vec<VendorStatus>> {
    state.store.ensure_seed::<Vendor>().await?;
    let vendors = state.store.list::<Vendor>().await?;
    ok(state.vendors.statuses(&vendors).await)
}

// --- Integration settings ---

async fn get_servicenow_config(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ServiceNowConfig> {
    ok(state.store.singleton::<ServiceNowConfig>().await?)
}

async fn save_servicenow_config(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ServiceNowConfig> {
    let config: ServiceNowConfig = parse_body(&body)?;
    let saved = state.store.save_singleton(config).await?;
    tracing::info!(enabled = saved.enabled, "Saved ServiceNow settings");
    ok(saved)
}

async fn get_solarwinds_config(
    State(state): State<Arc<AppState>>,
) -> ApiResult<SolarWindsConfig> {
    ok(state.store.singleton::<SolarWindsConfig>().await?)
}

async fn save_solarwinds_config(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<SolarWindsConfig> {
    let config: SolarWindsConfig = parse_body(&body)?;
    let saved = state.store.save_singleton(config).await?;
    tracing::info!(enabled = saved.enabled, "Saved SolarWinds settings");
    ok(saved)
}

// --- Live integration reads ---

async fn active_outages(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Outage>> {
    let config = state.store.singleton::<ServiceNowConfig>().await?;
    ok(state.gateway.active_outages(&config).await?)
}

async fn outage_history(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Outage>> {
    let config = state.store.singleton::<ServiceNowConfig>().await?;
    ok(state.gateway.outage_history(&config).await?)
}

async fn export_outage_history(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let config = state.store.singleton::<ServiceNowConfig>().await?;
    let history = state.gateway.outage_history(&config).await?;
    let filename = format!(
        "attachment; filename=\"outage-history-{}.csv\"",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        outages_csv(&history),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    pub breakdown: Option<String>,
    pub days: Option<u32>,
}

async fn outage_trend_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<TrendReport> {
    let breakdown = match query.breakdown.as_deref() {
        None | Some("") | Some("impact") => TrendBreakdown::Impact,
        Some("system") => TrendBreakdown::System,
        Some(other) => {
            return Err(ApiError::InvalidInput(format!(
                "Unknown breakdown '{other}', expected 'impact' or 'system'"
            )))
        }
    };
    let days = query.days.unwrap_or(MAX_TREND_DAYS);
    if !(1..=MAX_TREND_DAYS).contains(&days) {
        return Err(ApiError::InvalidInput(format!(
            "days must be between 1 and {MAX_TREND_DAYS}"
        )));
    }

    let config = state.store.singleton::<ServiceNowConfig>().await?;
    let history = state.gateway.outage_history(&config).await?;
    let today = chrono::Utc::now().date_naive();
    ok(outage_trends(&history, today, days, breakdown))
}

async fn priority_tickets(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ServiceNowTicket>> {
    let config = state.store.singleton::<ServiceNowConfig>().await?;
    ok(state.gateway.priority_tickets(&config).await?)
}

async fn monitoring_alerts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MonitoringAlert>> {
    let config = state.store.singleton::<SolarWindsConfig>().await?;
    ok(state.gateway.active_alerts(&config).await?)
}

// --- Collaboration bridges ---

async fn list_bridges(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CollaborationBridge>> {
    state.store.ensure_seed::<CollaborationBridge>().await?;
    ok(state.store.list::<CollaborationBridge>().await?)
}

async fn create_bridge(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<CollaborationBridge> {
    let draft: BridgeDraft = parse_body(&body)?;
    let bridge = draft.into_bridge(uuid::Uuid::new_v4().to_string())?;
    ok(state.store.create(bridge).await?)
}

async fn update_bridge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<CollaborationBridge> {
    let draft: BridgeDraft = parse_body(&body)?;
    draft.validate()?;
    let updated = state
        .store
        .mutate::<CollaborationBridge, _>(&id, move |current| draft.merge_into(current))
        .await
        .map_err(|e| not_found_as("Bridge not found", e))?;
    ok(updated)
}

async fn delete_bridge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    if !state.store.delete::<CollaborationBridge>(&id).await? {
        return Err(ApiError::NotFound("Bridge not found".to_string()));
    }
    ok(Deleted { id, deleted: true })
}

fn not_found_as(message: &str, err: aegis_storage::StoreError) -> ApiError {
    match err {
        aegis_storage::StoreError::NotFound { .. } => ApiError::NotFound(message.to_string()),
        other => ApiError::Store(other),
    }
}
