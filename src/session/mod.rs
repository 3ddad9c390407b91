//! Search session controller.
//!
//! Drives one player's match history through its lifecycle:
//!
//! ```text
//! Idle -> Loading -> Ready -> LoadingMore -> Ready
//! ```
//!
//! Failed matches reported with a page get exactly one retry each, run as
//! independent background tasks. Every state change is a single write under
//! the session lock, and every write that follows an await first checks that
//! the search it belongs to is still current.

pub mod gate;
pub mod pagination;
pub mod profile;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::calculate::{aggregate_player_stats, transform_matches, RankLookup, DEFAULT_STATS_WINDOW};
use crate::fetch::{FetchError, MatchSource};
use crate::models::{
    Match, PlayerSummaryStats, RiotId, RiotIdError, SearchId, SearchRequest,
    TransformedMatchData,
};

pub use gate::{LoadMoreGate, LoadMoreRejection, DEFAULT_DEBOUNCE};
pub use pagination::{MatchResolution, PageApplied, PaginationState};
pub use profile::{lookup_rank, PLACEHOLDER_SUMMONER_ID};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid Riot ID: {0}")]
    InvalidRiotId(#[from] RiotIdError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Search was superseded by a newer search")]
    Superseded,

    #[error("No active search")]
    NoActiveSearch,
}

/// Tuning for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub page_size: u32,
    pub debounce: Duration,
    /// Delay before the single retry of a failed match
    pub retry_delay: Duration,
    pub stats_window: usize,
    /// Tagline used for rank lookups when no search has set one
    pub default_tagline: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            debounce: DEFAULT_DEBOUNCE,
            retry_delay: Duration::from_secs(15),
            stats_window: DEFAULT_STATS_WINDOW,
            default_tagline: "NA1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    LoadingMore,
}

impl SessionPhase {
    fn in_flight(self) -> bool {
        matches!(self, SessionPhase::Loading | SessionPhase::LoadingMore)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadMoreOutcome {
    Loaded(PageApplied),
    Rejected(LoadMoreRejection),
}

#[derive(Debug)]
struct SessionState {
    search_id: SearchId,
    riot_id: Option<RiotId>,
    puuid: Option<String>,
    summoner_id: Option<String>,
    phase: SessionPhase,
    pagination: PaginationState,
    gate: LoadMoreGate,
    last_error: Option<String>,
}

impl SessionState {
    fn new(debounce: Duration) -> Self {
        Self {
            search_id: SearchId::none(),
            riot_id: None,
            puuid: None,
            summoner_id: None,
            phase: SessionPhase::Idle,
            pagination: PaginationState::new(),
            gate: LoadMoreGate::new(debounce),
            last_error: None,
        }
    }

    fn loading(search_id: SearchId, riot_id: RiotId, debounce: Duration) -> Self {
        Self {
            search_id,
            riot_id: Some(riot_id),
            phase: SessionPhase::Loading,
            ..Self::new(debounce)
        }
    }

    fn fail(&mut self, error: &FetchError, phase: SessionPhase) {
        if let Some(secs) = error.retry_after() {
            self.gate.start_cooldown(Instant::now(), secs);
        }
        self.phase = phase;
        self.last_error = Some(error.to_string());
    }
}

/// Observable fields of a session, for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub search_id: Option<SearchId>,
    pub riot_id: Option<RiotId>,
    pub puuid: Option<String>,
    pub phase: SessionPhase,
    pub matches_loaded: usize,
    pub has_more: bool,
    pub next_start_index: u32,
    /// Seconds left on the rate-limit cooldown
    pub retry_after: Option<u64>,
    /// Still waiting for their single retry
    pub failed_matches: Vec<String>,
    /// Gave up after the retry
    pub unresolved_matches: Vec<String>,
    pub recovered_matches: Vec<String>,
    pub load_more_available: bool,
    pub last_error: Option<String>,
}

pub struct SearchSession {
    source: Arc<dyn MatchSource>,
    config: SessionConfig,
    state: Arc<RwLock<SessionState>>,
    retry_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn MatchSource>, config: SessionConfig) -> Self {
        let state = SessionState::new(config.debounce);
        Self {
            source,
            config,
            state: Arc::new(RwLock::new(state)),
            retry_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn MatchSource> {
        &self.source
    }

    /// Start a new search, discarding all state from the previous one.
    ///
    /// Malformed input is rejected before any request is made. If another
    /// search starts while this one is in flight, this one returns
    /// [`SessionError::Superseded`] and leaves the newer search's state alone.
    pub async fn search(&self, input: &str) -> Result<PageApplied, SessionError> {
        let riot_id = RiotId::parse(input)?;
        let search_id = SearchId::new();
        let page_size = self.config.page_size;

        {
            let mut state = self.state.write().await;
            *state = SessionState::loading(search_id, riot_id.clone(), self.config.debounce);
        }
        self.abort_retries().await;

        info!("Searching {} ({})", riot_id, search_id);
        let request = SearchRequest::page(&riot_id, 0, page_size);
        let result = self.source.search(&request).await;

        let mut state = self.state.write().await;
        if state.search_id != search_id {
            debug!("Discarding response for superseded search {}", search_id);
            return Err(SessionError::Superseded);
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Search for {} failed: {}", riot_id, e);
                state.fail(&e, SessionPhase::Idle);
                return Err(e.into());
            }
        };

        state.puuid = Some(response.puuid.clone());
        state.summoner_id = response.summoner_id.clone();
        let applied = state.pagination.apply_page(response, 0, page_size);
        if let Some(secs) = applied.retry_after {
            state.gate.start_cooldown(Instant::now(), secs);
        }
        state.phase = SessionPhase::Ready;
        drop(state);

        info!(
            "Loaded {} matches for {} ({} failed)",
            applied.appended,
            riot_id,
            applied.newly_failed.len()
        );
        self.schedule_retries(search_id, &applied.newly_failed).await;
        Ok(applied)
    }

    /// Fetch the next page, if the guard allows it.
    ///
    /// A transport failure leaves previously loaded matches untouched.
    pub async fn load_more(&self) -> Result<LoadMoreOutcome, SessionError> {
        let page_size = self.config.page_size;
        let (search_id, request) = {
            let mut state = self.state.write().await;
            let now = Instant::now();

            let Some(riot_id) = state.riot_id.clone() else {
                return Ok(LoadMoreOutcome::Rejected(LoadMoreRejection::NoActiveSearch));
            };
            if state.phase == SessionPhase::Idle {
                return Ok(LoadMoreOutcome::Rejected(LoadMoreRejection::NoActiveSearch));
            }
            if let Err(reason) =
                state
                    .gate
                    .check(now, state.phase.in_flight(), state.pagination.has_more())
            {
                debug!("Load more rejected: {}", reason);
                return Ok(LoadMoreOutcome::Rejected(reason));
            }

            state.gate.accept(now);
            state.phase = SessionPhase::LoadingMore;
            let start = state.pagination.next_start_index();
            (
                state.search_id,
                SearchRequest::page(&riot_id, start, page_size),
            )
        };

        let requested_start = request.start_index();
        let result = self.source.search(&request).await;

        let mut state = self.state.write().await;
        if state.search_id != search_id {
            debug!("Discarding page {} for superseded search", requested_start);
            return Err(SessionError::Superseded);
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Load more at {} failed: {}", requested_start, e);
                state.fail(&e, SessionPhase::Ready);
                return Err(e.into());
            }
        };

        let applied = state
            .pagination
            .apply_page(response, requested_start, page_size);
        if let Some(secs) = applied.retry_after {
            state.gate.start_cooldown(Instant::now(), secs);
        }
        state.phase = SessionPhase::Ready;
        state.last_error = None;
        drop(state);

        info!(
            "Loaded {} more matches from {} (has_more={})",
            applied.appended, requested_start, applied.has_more
        );
        self.schedule_retries(search_id, &applied.newly_failed).await;
        Ok(LoadMoreOutcome::Loaded(applied))
    }

    /// Spawn one delayed retry per failed match id.
    async fn schedule_retries(&self, search_id: SearchId, match_ids: &[String]) {
        if match_ids.is_empty() {
            return;
        }

        let mut tasks = self.retry_tasks.lock().await;
        tasks.retain(|task| !task.is_finished());
        for match_id in match_ids {
            debug!(
                "Scheduling retry of {} in {:?}",
                match_id, self.config.retry_delay
            );
            tasks.push(tokio::spawn(retry_failed_match(
                Arc::clone(&self.source),
                Arc::clone(&self.state),
                search_id,
                match_id.clone(),
                self.config.retry_delay,
            )));
        }
    }

    async fn abort_retries(&self) {
        let mut tasks = self.retry_tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    /// Wait for every scheduled retry to finish.
    pub async fn settle_retries(&self) {
        let tasks: Vec<_> = self.retry_tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Retry task failed: {}", e);
                }
            }
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        let now = Instant::now();
        let pagination = &state.pagination;
        let load_more_available = state.phase == SessionPhase::Ready
            && state
                .gate
                .check(now, false, pagination.has_more())
                .is_ok();

        SessionSnapshot {
            search_id: (!state.search_id.is_none()).then_some(state.search_id),
            riot_id: state.riot_id.clone(),
            puuid: state.puuid.clone(),
            phase: state.phase,
            matches_loaded: pagination.len(),
            has_more: pagination.has_more(),
            next_start_index: pagination.next_start_index(),
            retry_after: state.gate.retry_after_secs(now),
            failed_matches: pagination.failed_match_ids().iter().cloned().collect(),
            unresolved_matches: pagination.unresolved_match_ids().iter().cloned().collect(),
            recovered_matches: pagination.recovered_match_ids().iter().cloned().collect(),
            load_more_available,
            last_error: state.last_error.clone(),
        }
    }

    pub async fn matches(&self) -> Vec<Match> {
        self.state.read().await.pagination.matches().to_vec()
    }

    pub async fn find_match(&self, match_id: &str) -> Option<Match> {
        self.state.read().await.pagination.find(match_id).cloned()
    }

    pub async fn resolution(&self, match_id: &str) -> Option<MatchResolution> {
        self.state.read().await.pagination.resolution(match_id)
    }

    /// The searched player's view of every loaded match.
    pub async fn match_views(&self) -> Vec<TransformedMatchData> {
        let state = self.state.read().await;
        match state.puuid.as_deref() {
            Some(puuid) => transform_matches(state.pagination.matches(), puuid),
            None => Vec::new(),
        }
    }

    /// Summary over the `window` most recent loaded matches.
    pub async fn summary(&self, window: Option<usize>) -> PlayerSummaryStats {
        let window = window.unwrap_or(self.config.stats_window);
        let state = self.state.read().await;
        match state.puuid.as_deref() {
            Some(puuid) => aggregate_player_stats(state.pagination.matches(), puuid, window),
            None => PlayerSummaryStats::default(),
        }
    }

    /// Summary computed by the proxy over the player's last `num_matches` games.
    pub async fn server_summary(&self, num_matches: u32) -> Result<PlayerSummaryStats, SessionError> {
        let puuid = self
            .state
            .read()
            .await
            .puuid
            .clone()
            .ok_or(SessionError::NoActiveSearch)?;
        Ok(self.source.player_stats(&puuid, num_matches).await?)
    }

    /// Solo-queue standing of the searched player.
    pub async fn rank(&self) -> RankLookup {
        let (puuid, summoner_id, tagline) = {
            let state = self.state.read().await;
            let tagline = state
                .riot_id
                .as_ref()
                .map(|r| r.tagline.clone())
                .unwrap_or_else(|| self.config.default_tagline.clone());
            (state.puuid.clone(), state.summoner_id.clone(), tagline)
        };

        lookup_rank(
            self.source.as_ref(),
            puuid.as_deref(),
            summoner_id.as_deref(),
            &tagline,
        )
        .await
    }
}

/// Single-shot retry: wait, ask once, apply the outcome if the search is still current.
async fn retry_failed_match(
    source: Arc<dyn MatchSource>,
    state: Arc<RwLock<SessionState>>,
    search_id: SearchId,
    match_id: String,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    {
        let state = state.read().await;
        let pending = state.pagination.failed_match_ids().contains(&match_id);
        if state.search_id != search_id || !pending {
            debug!("Skipping retry of {}: no longer pending", match_id);
            return;
        }
    }

    let found = match source.retried_match(&match_id).await {
        Ok(Some(m)) => Some(m),
        Ok(None) => {
            warn!("Retry of {} found no match", match_id);
            None
        }
        Err(e) => {
            warn!("Retry of {} failed: {}", match_id, e);
            None
        }
    };

    let mut state = state.write().await;
    if state.search_id != search_id {
        debug!("Discarding retry of {} for superseded search", match_id);
        return;
    }
    if let Some(resolution) = state.pagination.resolve_retry(&match_id, found) {
        info!("Match {} {:?}", match_id, resolution);
    }
}
