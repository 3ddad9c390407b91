//! Scripted [`MatchSource`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, MatchSource};
use crate::models::{
    Match, MatchListResponse, PlayerSummaryStats, RankEntry, SearchRequest, SummonerData,
};

/// Failure a mock endpoint should produce.
#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    RateLimited(u64),
    Status(u16),
}

impl MockFailure {
    fn to_error(self) -> FetchError {
        match self {
            MockFailure::RateLimited(secs) => FetchError::RateLimited {
                retry_after_secs: secs,
            },
            MockFailure::Status(status) => FetchError::HttpStatus {
                status,
                message: "mock failure".to_string(),
            },
        }
    }
}

/// Mock match source. Every call is recorded so tests can count requests.
#[derive(Default)]
pub struct MockSource {
    pages: HashMap<(String, u32), Result<MatchListResponse, MockFailure>>,
    delays: HashMap<String, Duration>,
    page_delays: HashMap<(String, u32), Duration>,
    retry_delays: HashMap<String, Duration>,
    retried: HashMap<String, Result<Option<Match>, MockFailure>>,
    summoners: HashMap<String, Result<SummonerData, MockFailure>>,
    leagues: HashMap<String, Result<Vec<RankEntry>, MockFailure>>,
    stats: Option<PlayerSummaryStats>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to a search for `game_name` at `start` with `page`.
    pub fn with_page(mut self, game_name: &str, start: u32, page: MatchListResponse) -> Self {
        self.pages.insert((game_name.to_string(), start), Ok(page));
        self
    }

    pub fn with_search_failure(mut self, game_name: &str, start: u32, failure: MockFailure) -> Self {
        self.pages
            .insert((game_name.to_string(), start), Err(failure));
        self
    }

    /// Delay every search for `game_name`.
    pub fn with_delay(mut self, game_name: &str, delay: Duration) -> Self {
        self.delays.insert(game_name.to_string(), delay);
        self
    }

    /// Delay only the search for `game_name` at `start`.
    pub fn with_page_delay(mut self, game_name: &str, start: u32, delay: Duration) -> Self {
        self.page_delays.insert((game_name.to_string(), start), delay);
        self
    }

    pub fn with_retry_delay(mut self, match_id: &str, delay: Duration) -> Self {
        self.retry_delays.insert(match_id.to_string(), delay);
        self
    }

    pub fn with_retried(mut self, match_id: &str, found: Option<Match>) -> Self {
        self.retried.insert(match_id.to_string(), Ok(found));
        self
    }

    pub fn with_retry_failure(mut self, match_id: &str, failure: MockFailure) -> Self {
        self.retried.insert(match_id.to_string(), Err(failure));
        self
    }

    pub fn with_summoner(mut self, summoner: SummonerData) -> Self {
        self.summoners.insert(summoner.puuid.clone(), Ok(summoner));
        self
    }

    pub fn with_summoner_failure(mut self, puuid: &str, failure: MockFailure) -> Self {
        self.summoners.insert(puuid.to_string(), Err(failure));
        self
    }

    pub fn with_league(mut self, summoner_id: &str, entries: Vec<RankEntry>) -> Self {
        self.leagues.insert(summoner_id.to_string(), Ok(entries));
        self
    }

    pub fn with_league_failure(mut self, summoner_id: &str, failure: MockFailure) -> Self {
        self.leagues.insert(summoner_id.to_string(), Err(failure));
        self
    }

    pub fn with_stats(mut self, stats: PlayerSummaryStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// A page carrying `matches` for `puuid`, with no explicit pagination flags.
pub fn page(puuid: &str, matches: Vec<Match>) -> MatchListResponse {
    MatchListResponse {
        puuid: puuid.to_string(),
        match_data_list: matches,
        ..Default::default()
    }
}

#[async_trait]
impl MatchSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<MatchListResponse, FetchError> {
        self.record(format!(
            "search:{}:{}",
            request.game_name,
            request.start_index()
        ));

        if let Some(delay) = self.delays.get(&request.game_name) {
            tokio::time::sleep(*delay).await;
        }
        let key = (request.game_name.clone(), request.start_index());
        if let Some(delay) = self.page_delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        match self.pages.get(&key) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(FetchError::HttpStatus {
                status: 404,
                message: "Summoner not found".to_string(),
            }),
        }
    }

    async fn retried_match(&self, match_id: &str) -> Result<Option<Match>, FetchError> {
        self.record(format!("retried:{}", match_id));
        if let Some(delay) = self.retry_delays.get(match_id) {
            tokio::time::sleep(*delay).await;
        }
        match self.retried.get(match_id) {
            Some(Ok(found)) => Ok(found.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(None),
        }
    }

    async fn summoner_by_puuid(
        &self,
        puuid: &str,
        _tagline: &str,
    ) -> Result<Option<SummonerData>, FetchError> {
        self.record(format!("summoner:{}", puuid));
        match self.summoners.get(puuid) {
            Some(Ok(summoner)) => Ok(Some(summoner.clone())),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(None),
        }
    }

    async fn league_entries(
        &self,
        summoner_id: &str,
        _tagline: &str,
        _puuid: &str,
    ) -> Result<Vec<RankEntry>, FetchError> {
        self.record(format!("league:{}", summoner_id));
        match self.leagues.get(summoner_id) {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn player_stats(
        &self,
        puuid: &str,
        num_matches: u32,
    ) -> Result<PlayerSummaryStats, FetchError> {
        self.record(format!("stats:{}:{}", puuid, num_matches));
        self.stats.clone().ok_or(FetchError::HttpStatus {
            status: 404,
            message: "No stats".to_string(),
        })
    }
}
