use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::session::{LoadMoreOutcome, LoadMoreRejection, PageApplied, SessionSnapshot};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    /// `"<name>#<tag>"`
    pub riot_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub page: PageApplied,
    pub session: SessionSnapshot,
}

pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = state.session.search(&body.riot_id).await?;
    Ok(Json(SearchResponse {
        page,
        session: state.session.snapshot().await,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadMoreResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageApplied>,
    /// Why the request was a no-op
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<LoadMoreRejection>,
    pub session: SessionSnapshot,
}

/// Rejections are a normal outcome, returned with 200 alongside the current state.
pub async fn load_more(State(state): State<AppState>) -> Result<Json<LoadMoreResponse>, ApiError> {
    let outcome = state.session.load_more().await?;
    let (page, rejection) = match outcome {
        LoadMoreOutcome::Loaded(page) => (Some(page), None),
        LoadMoreOutcome::Rejected(reason) => (None, Some(reason)),
    };

    Ok(Json(LoadMoreResponse {
        accepted: page.is_some(),
        page,
        rejection,
        session: state.session.snapshot().await,
    }))
}

pub async fn snapshot(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::test_support::{app, get_json, post_json, test_state};
    use crate::fetch::mock::{page, MockFailure, MockSource};
    use crate::models::fixtures::match_for;
    use crate::models::Match;

    fn matches(n: u32) -> Vec<Match> {
        (0..n)
            .map(|i| match_for(&format!("NA1_{}", i), "me", "Ahri", true))
            .collect()
    }

    #[tokio::test]
    async fn test_search_returns_page_and_session() {
        let mut first = page("me", matches(20));
        first.failed_matches = vec!["NA1_77".to_string()];
        let state = test_state(MockSource::new().with_page("God of Wind", 0, first));

        let (status, json) = post_json(
            app(&state),
            "/api/search",
            r#"{"riotId": "God of Wind #na1"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["page"]["appended"], 20);
        assert_eq!(json["session"]["phase"], "ready");
        assert_eq!(json["session"]["hasMore"], true);
        assert_eq!(json["session"]["riotId"]["tagline"], "NA1");
        assert_eq!(json["session"]["failedMatches"][0], "NA1_77");
        assert!(json["session"]["unresolvedMatches"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_riot_id() {
        let state = test_state(MockSource::new());

        let (status, json) = post_json(app(&state), "/api/search", r#"{"riotId": "nohash"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(state.session.snapshot().await.phase, crate::session::SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_search_unknown_player_is_not_found() {
        let state = test_state(MockSource::new());

        let (status, json) =
            post_json(app(&state), "/api/search", r#"{"riotId": "Ghost#NA1"}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_search_rate_limited() {
        let state = test_state(MockSource::new().with_search_failure(
            "Busy",
            0,
            MockFailure::RateLimited(30),
        ));

        let (status, json) = post_json(app(&state), "/api/search", r#"{"riotId": "Busy#NA1"}"#).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_load_more_without_search_is_rejected() {
        let state = test_state(MockSource::new());

        let (status, json) = post_json(app(&state), "/api/load-more", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["accepted"], false);
        assert_eq!(json["rejection"]["reason"], "no_active_search");
        assert!(json.get("page").is_none());
    }

    #[tokio::test]
    async fn test_load_more_then_debounced() {
        let mut second = page("me", vec![match_for("NA1_20", "me", "Lux", false)]);
        second.has_more = Some(true);
        let state = test_state(
            MockSource::new()
                .with_page("God of Wind", 0, page("me", matches(20)))
                .with_page("God of Wind", 20, second),
        );
        state.session.search("God of Wind#NA1").await.unwrap();

        let (status, json) = post_json(app(&state), "/api/load-more", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["accepted"], true);
        assert_eq!(json["page"]["appended"], 1);
        assert_eq!(json["session"]["matchesLoaded"], 21);
        assert_eq!(json["session"]["hasMore"], true);

        let (_, json) = post_json(app(&state), "/api/load-more", "").await;
        assert_eq!(json["accepted"], false);
        assert_eq!(json["rejection"]["reason"], "debounced");
    }

    #[tokio::test]
    async fn test_session_snapshot_before_search() {
        let state = test_state(MockSource::new());

        let (status, json) = get_json(app(&state), "/api/session").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["matchesLoaded"], 0);
        assert!(json["searchId"].is_null());
        assert_eq!(json["loadMoreAvailable"], false);
    }
}
