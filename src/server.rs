use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::calendar::horizon::build_horizon;
use crate::config::Config;
use crate::engine::{plan_in, PlanOutcome, PlanRequest};
use crate::holidays::merge_holidays;
use crate::metrics::Metrics;
use crate::optimizer::manual::{ActiveSelection, ManualEditState, PlanningSession};
use crate::types::{Bridge, Holiday, Strategy};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// Planning inputs; anything left out comes from the server config.
#[derive(Debug, Clone, Default, Deserialize)]
struct PlanBody {
    year: Option<i32>,
    carry_over_months: Option<u32>,
    /// Explicit month anchors; wins over `year`.
    horizon: Option<Vec<NaiveDate>>,
    /// Provider holidays; replaces the configured holiday file.
    holidays: Option<Vec<Holiday>>,
    region: Option<String>,
    budget: Option<u32>,
    strategy: Option<String>,
    allow_past_days: Option<bool>,
    today: Option<NaiveDate>,
    max_alternatives: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EditBody {
    #[serde(flatten)]
    plan: PlanBody,
    /// Index of the alternative being edited; the primary when absent.
    alternative: Option<usize>,
    #[serde(default)]
    edits: ManualEditState,
}

#[derive(Debug, Clone, Deserialize)]
struct ToggleBody {
    #[serde(flatten)]
    edit: EditBody,
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct BridgesResponse {
    available_workdays: usize,
    bridges: Vec<Bridge>,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    accepted: bool,
    active: ActiveSelection,
    edits: ManualEditState,
    active_days: Vec<NaiveDate>,
    remaining_days: u32,
    metrics: Metrics,
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    active: ActiveSelection,
    edits: ManualEditState,
    active_days: Vec<NaiveDate>,
    remaining_days: u32,
    metrics: Metrics,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState { config };

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/plan", post(plan))
        .route("/v1/bridges", post(bridges))
        .route("/v1/toggle", post(toggle))
        .route("/v1/metrics", post(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn plan(
    State(state): State<ApiState>,
    Json(body): Json<PlanBody>,
) -> ApiResult<PlanOutcome> {
    let request = resolve_plan_request(&state.config, &body)?;
    let ctx = request.context();
    Ok(ok(plan_in(&ctx, &request)))
}

async fn bridges(
    State(state): State<ApiState>,
    Json(body): Json<PlanBody>,
) -> ApiResult<BridgesResponse> {
    let request = resolve_plan_request(&state.config, &body)?;
    let ctx = request.context();
    let outcome = plan_in(&ctx, &request);
    Ok(ok(BridgesResponse {
        available_workdays: outcome.available_workdays,
        bridges: outcome.bridges,
    }))
}

async fn toggle(
    State(state): State<ApiState>,
    Json(body): Json<ToggleBody>,
) -> ApiResult<ToggleResponse> {
    let (request, mut session) = restore_session(&state.config, &body.edit)?;
    let ctx = request.context();
    let accepted = session.toggle_day_selection(body.date, request.budget);
    if !accepted {
        info!(date = %body.date, "toggle refused, no budget left");
    }
    Ok(ok(ToggleResponse {
        accepted,
        active: session.active(),
        edits: session.edits().clone(),
        active_days: session.active_days(),
        remaining_days: session.remaining_days(request.budget),
        metrics: session.metrics(&ctx, request.budget),
    }))
}

async fn metrics(
    State(state): State<ApiState>,
    Json(body): Json<EditBody>,
) -> ApiResult<MetricsResponse> {
    let (request, session) = restore_session(&state.config, &body)?;
    let ctx = request.context();
    Ok(ok(MetricsResponse {
        active: session.active(),
        edits: session.edits().clone(),
        active_days: session.active_days(),
        remaining_days: session.remaining_days(request.budget),
        metrics: session.metrics(&ctx, request.budget),
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

/// Replans from scratch and layers the client's edits back on. Planning is
/// deterministic, so the same inputs give back the suggestions the client saw.
fn restore_session(
    config: &Config,
    body: &EditBody,
) -> std::result::Result<(PlanRequest, PlanningSession), ApiError> {
    let request = resolve_plan_request(config, &body.plan)?;
    let ctx = request.context();
    let outcome = plan_in(&ctx, &request);
    let mut session = PlanningSession::new(outcome.primary, outcome.alternatives);
    if let Some(index) = body.alternative {
        if !session.select_alternative(index) {
            return Err(ApiError::bad_request(format!(
                "alternative {index} does not exist ({} available)",
                session.alternatives().len()
            )));
        }
    }
    session.restore_edits(body.edits.clone());
    Ok((request, session))
}

fn resolve_plan_request(
    config: &Config,
    body: &PlanBody,
) -> std::result::Result<PlanRequest, ApiError> {
    let today = body.today.unwrap_or_else(|| Local::now().date_naive());
    let horizon = match &body.horizon {
        Some(anchors) if anchors.is_empty() => {
            return Err(ApiError::bad_request("horizon must name at least one month"));
        }
        Some(anchors) => anchors.clone(),
        None => match body.year {
            Some(year) => build_horizon(
                year,
                body.carry_over_months
                    .unwrap_or(config.horizon.carry_over_months),
            ),
            None => config.horizon_anchors(today.year()),
        },
    };

    let region = body.region.as_deref().or(config.holidays.region.as_deref());
    let holidays = match &body.holidays {
        Some(external) => {
            let custom: Vec<Holiday> = config
                .holidays
                .custom
                .iter()
                .map(|entry| Holiday::custom(entry.date, entry.name.clone()))
                .collect();
            merge_holidays(external, &custom, region)
        }
        None => {
            let mut config = config.clone();
            config.holidays.region = region.map(str::to_string);
            config.resolved_holidays().map_err(ApiError::internal)?
        }
    };

    let strategy = body
        .strategy
        .as_deref()
        .map(Strategy::from_tag)
        .unwrap_or_else(|| config.strategy());

    Ok(PlanRequest {
        horizon,
        holidays,
        budget: body.budget.unwrap_or(config.planner.budget),
        strategy,
        allow_past_days: body
            .allow_past_days
            .unwrap_or(config.planner.allow_past_days),
        today,
        max_alternatives: body
            .max_alternatives
            .unwrap_or(config.planner.max_alternatives),
    })
}
