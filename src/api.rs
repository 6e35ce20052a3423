use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderName, Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::stream;
use serde::Serialize;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span, error, info_span};

use crate::domain::Identifier;
use crate::error::TransformerError;
use crate::health::{self, HealthSettings};
use crate::service::TaxonomyQuery;

const APPLICATION_JSON: &str = "application/json";
const REQUEST_ID: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<dyn TaxonomyQuery>,
    pub health: Arc<HealthSettings>,
}

/// Routes for one taxonomy under `/transformers/{segment}` plus the health
/// endpoints. Every request carries an `X-Request-Id`, taken from the caller
/// or generated, which is logged on the request span and echoed back.
pub fn router(query: Arc<dyn TaxonomyQuery>, health: HealthSettings) -> Router {
    let base = format!("/transformers/{}", health.kind.path_segment());
    let state = AppState {
        query,
        health: Arc::new(health),
    };

    Router::new()
        .route(&base, get(list_entities))
        .route(&format!("{base}/__ids"), get(list_ids))
        .route(&format!("{base}/__count"), get(count))
        .route(&format!("{base}/:id"), get(entity_by_id))
        .merge(health::routes())
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID),
            MakeRequestUuid,
        ))
}

fn request_span(request: &Request<Body>) -> Span {
    let transaction_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        transaction_id,
    )
}

/// GET /transformers/{segment}
async fn list_entities(State(state): State<AppState>) -> Response {
    if let Err(err) = state.query.check_connectivity() {
        return unavailable(&err);
    }
    json_response(state.query.list_all())
}

/// GET /transformers/{segment}/:id
async fn entity_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<Identifier>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Err(err) = state.query.check_connectivity() {
        return unavailable(&err);
    }
    json_response(state.query.get_by_id(id.as_str()))
}

/// GET /transformers/{segment}/__ids - one `{"id": ...}` object per line
async fn list_ids(State(state): State<AppState>) -> Response {
    if let Err(err) = state.query.check_connectivity() {
        return unavailable(&err);
    }
    let Some(ids) = state.query.list_ids() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let lines = stream::iter(ids.into_iter().map(|entry| {
        serde_json::to_vec(&entry).map(|mut line| {
            line.push(b'\n');
            line
        })
    }));
    Body::from_stream(lines).into_response()
}

/// GET /transformers/{segment}/__count
async fn count(State(state): State<AppState>) -> Response {
    if let Err(err) = state.query.check_connectivity() {
        return unavailable(&err);
    }
    state.query.count().to_string().into_response()
}

/// 200 with the value as a JSON line, or 404 with an empty body. Both carry a
/// JSON content type.
pub(crate) fn json_response<T: Serialize + ?Sized>(value: Option<&T>) -> Response {
    let Some(value) = value else {
        return (StatusCode::NOT_FOUND, [(CONTENT_TYPE, APPLICATION_JSON)]).into_response();
    };
    match serde_json::to_vec(value) {
        Ok(mut body) => {
            body.push(b'\n');
            (StatusCode::OK, [(CONTENT_TYPE, APPLICATION_JSON)], body).into_response()
        }
        Err(err) => {
            error!(error = %err, "error on json encoding");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    let body = format!("{}\n", serde_json::json!({ "message": message }));
    (status, [(CONTENT_TYPE, APPLICATION_JSON)], body).into_response()
}

fn unavailable(err: &TransformerError) -> Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, &err.to_string())
}
