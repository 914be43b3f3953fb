use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::fixtures::FixtureService;
use crate::football_data::models::Competition;
use crate::football_data::{FootballData, RequestBudget, UpstreamError, SUPPORTED_COMPETITIONS};
use crate::predictor::{PredictionEngine, ScoredFixture};

#[derive(Clone)]
pub struct AppState {
    pub fixtures: FixtureService,
    pub engine: PredictionEngine,
    pub budget: RequestBudget,
    pub source: Arc<dyn FootballData>,
    pub credential_configured: bool,
}

impl AppState {
    fn require_credential(&self) -> Result<(), ApiError> {
        if self.credential_configured {
            Ok(())
        } else {
            Err(ApiError::MissingCredential)
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("FOOTBALL_DATA_KEY is not set")]
    MissingCredential,
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/matches", get(matches_handler))
        .route("/api/status", get(status_handler))
        .route("/api/competitions", get(competitions_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
struct MatchesQuery {
    date: Option<String>,
}

/// GET /api/matches?date=YYYY-MM-DD
async fn matches_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<ScoredFixture>>, ApiError> {
    state.require_credential()?;

    let requested = query.date.as_deref().filter(|d| !d.is_empty());
    info!("Fixtures requested for {}", requested.unwrap_or("today"));

    let fixtures = state.fixtures.fetch(requested, Utc::now().date_naive()).await;
    let scored = state.engine.score_all(fixtures).await;
    info!("Returning {} scored fixture(s)", scored.len());
    Ok(Json(scored))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    request_count: u32,
    request_limit: u32,
    remaining_requests: u32,
    reset_time: String,
    supported_competitions: Vec<&'static str>,
    last_request: String,
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusBody> {
    let snap = state.budget.snapshot().await;
    Json(StatusBody {
        request_count: snap.used,
        request_limit: snap.limit,
        remaining_requests: snap.remaining,
        reset_time: snap.resets_at.to_rfc3339(),
        supported_competitions: SUPPORTED_COMPETITIONS.iter().map(|(name, _)| *name).collect(),
        last_request: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
struct SeasonSummary {
    start: String,
    end: Option<String>,
    current: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompetitionSummary {
    id: u64,
    name: String,
    code: Option<String>,
    area: Option<String>,
    current_season: Option<SeasonSummary>,
}

impl From<Competition> for CompetitionSummary {
    fn from(c: Competition) -> Self {
        let current_season = c.current_season.and_then(|s| {
            s.start_date.map(|start| SeasonSummary {
                start,
                end: s.end_date,
                current: s.current_matchday,
            })
        });
        CompetitionSummary {
            id: c.id,
            name: c.name,
            code: c.code,
            area: c.area.and_then(|a| a.name),
            current_season,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompetitionsBody {
    total: usize,
    competitions: Vec<CompetitionSummary>,
    request_count: u32,
    request_limit: u32,
}

/// GET /api/competitions
async fn competitions_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    state.require_credential()?;

    if !state.budget.acquire("competitions").await {
        let snap = state.budget.snapshot().await;
        return Ok(Json(json!({
            "error": "Request budget exhausted",
            "requestCount": snap.used,
            "requestLimit": snap.limit,
        }))
        .into_response());
    }

    let competitions = state.source.competitions().await?;
    info!("{} competitions available upstream", competitions.len());

    let snap = state.budget.snapshot().await;
    Ok(Json(CompetitionsBody {
        total: competitions.len(),
        competitions: competitions.into_iter().map(CompetitionSummary::from).collect(),
        request_count: snap.used,
        request_limit: snap.limit,
    })
    .into_response())
}
