use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::RankLookup;
use crate::models::PlayerSummaryStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// Aggregated from the matches loaded in this session
    #[default]
    Local,
    /// Computed by the proxy
    Server,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    pub num_matches: Option<u32>,
    #[serde(default)]
    pub source: SummarySource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub stats: PlayerSummaryStats,
    pub avg_kda: f64,
    pub source: SummarySource,
}

pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let session = &state.session;
    let num_matches = params
        .num_matches
        .unwrap_or(session.config().stats_window as u32);
    if num_matches == 0 {
        return Err(ApiError::BadRequest(
            "numMatches must be greater than 0".to_string(),
        ));
    }

    let stats = match params.source {
        SummarySource::Local => session.summary(Some(num_matches as usize)).await,
        SummarySource::Server => session.server_summary(num_matches).await?,
    };

    Ok(Json(SummaryResponse {
        avg_kda: stats.avg_kda(),
        stats,
        source: params.source,
    }))
}

pub async fn rank(State(state): State<AppState>) -> Json<RankLookup> {
    Json(state.session.rank().await)
}
