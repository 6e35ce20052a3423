use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::api::{AppState, json_response};
use crate::domain::EntityKind;
use crate::service::TaxonomyQuery;

#[derive(Debug, Clone)]
pub struct HealthSettings {
    pub kind: EntityKind,
    pub panic_guide: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u32,
    pub name: String,
    pub description: String,
    pub checks: Vec<CheckResult>,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub panic_guide: String,
    pub check_output: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub fn health_report(query: &dyn TaxonomyQuery, settings: &HealthSettings) -> HealthReport {
    let label = settings.kind.label();
    let (ok, check_output) = match query.check_connectivity() {
        Ok(()) => (true, "Connectivity to TME is ok".to_string()),
        Err(err) => (false, format!("Error connecting to TME: {err}")),
    };

    HealthReport {
        schema_version: 1,
        name: format!("{label} Transformer Healthchecks"),
        description: "Checks for accessing TME".to_string(),
        checks: vec![CheckResult {
            name: "Check connectivity to TME".to_string(),
            ok,
            severity: 1,
            business_impact: format!("Unable to respond to request for the {label} data from TME"),
            technical_summary: format!("Cannot connect to TME to be able to supply {label}"),
            panic_guide: settings.panic_guide.clone(),
            check_output,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }],
        ok,
    }
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/__health", get(health))
        .route("/__gtg", get(good_to_go))
        .route("/__ping", get(ping))
        .route("/ping", get(ping))
        .route("/__build-info", get(build_info))
        .route("/build-info", get(build_info))
}

/// GET /__health
async fn health(State(state): State<AppState>) -> Response {
    let report = health_report(state.query.as_ref(), &state.health);
    json_response(Some(&report))
}

/// GET /__gtg - 503 until the index is published
async fn good_to_go(State(state): State<AppState>) -> StatusCode {
    match state.query.check_connectivity() {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn build_info() -> Response {
    let info = BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };
    json_response(Some(&info))
}
