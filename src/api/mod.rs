use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    ChartData, ChartSeriesKind, InputError, ProjectionInputs, Stepper, YearlySnapshot,
    format_axis_label, format_tooltip, run_projection, validate_start_year,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Calendar year used to label offset 0 when the caller does not pin one.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionPayload {
    pub years: Option<u32>,
    pub interest_rate: Option<f64>,
    pub principal: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub start_year: Option<i32>,
    pub series_kind: Option<ChartSeriesKind>,
    /// A +/- button press applied to the other fields before validation.
    pub step: Option<Stepper>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRequest {
    pub inputs: ProjectionInputs,
    pub start_year: i32,
    pub series_kind: ChartSeriesKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub inputs: ProjectionInputs,
    pub start_year: i32,
    pub series_kind: ChartSeriesKind,
    pub snapshots: Vec<YearlySnapshot>,
    pub chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct FormatQuery {
    value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatResponse {
    value: f64,
    axis_label: String,
    tooltip: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },
    #[error("Not found")]
    NotFound,
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Malformed { status, .. } => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        error_response(status, &self.to_string())
    }
}

pub fn request_from_payload(payload: ProjectionPayload) -> Result<ProjectionRequest, InputError> {
    let defaults = ProjectionInputs::default();
    let mut inputs = ProjectionInputs {
        principal: payload.principal.unwrap_or(defaults.principal),
        annual_rate: payload.interest_rate.unwrap_or(defaults.annual_rate),
        periods_per_year: defaults.periods_per_year,
        years: payload.years.unwrap_or(defaults.years),
        monthly_contribution: payload
            .monthly_contribution
            .unwrap_or(defaults.monthly_contribution),
    };
    if let Some(step) = payload.step {
        inputs = step.apply(inputs);
    }
    inputs.validate()?;

    let start_year = payload.start_year.unwrap_or_else(current_year);
    validate_start_year(start_year)?;

    Ok(ProjectionRequest {
        inputs,
        start_year,
        series_kind: payload.series_kind.unwrap_or_default(),
    })
}

pub fn build_projection_response(request: &ProjectionRequest) -> ProjectionResponse {
    let projection = run_projection(&request.inputs, request.start_year);
    let chart = ChartData::from_snapshots(&projection.snapshots, request.series_kind);
    ProjectionResponse {
        inputs: projection.inputs,
        start_year: projection.start_year,
        series_kind: request.series_kind,
        snapshots: projection.snapshots,
        chart,
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/format", get(format_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("compound interest calculator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn projection_get_handler(
    payload: Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => projection_handler_impl(payload),
        Err(rejection) => rejected(rejection.into()),
    }
}

async fn projection_post_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => projection_handler_impl(payload),
        Err(rejection) => rejected(rejection.into()),
    }
}

fn rejected(err: ApiError) -> Response {
    warn!(%err, "malformed request");
    err.into_response()
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "rejected projection request");
            return ApiError::from(err).into_response();
        }
    };
    debug!(
        years = request.inputs.years,
        rate = request.inputs.annual_rate,
        "projecting"
    );
    json_response(StatusCode::OK, build_projection_response(&request))
}

async fn format_handler(query: Result<Query<FormatQuery>, QueryRejection>) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejected(rejection.into()),
    };
    if !query.value.is_finite() {
        return rejected(InputError::NonFinite { field: "value" }.into());
    }
    json_response(
        StatusCode::OK,
        FormatResponse {
            value: query.value,
            axis_label: format_axis_label(query.value),
            tooltip: format_tooltip(query.value),
        },
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
