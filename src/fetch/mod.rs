//! HTTP access to the backend proxy.
//!
//! The proxy fronts the game-data API. All calls are discrete, client-initiated
//! requests; [`MatchSource`] is the seam the session controller depends on so
//! it can be driven by a scripted source in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::models::{
    Match, MatchListResponse, PlayerSummaryStats, ProxyErrorBody, RankEntry, RetriedMatchResponse,
    SearchRequest, SummonerData,
};

#[cfg(test)]
pub mod mock;

/// Errors that can occur talking to the proxy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Cooldown requested by the proxy, if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            FetchError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Source of match data and player standings.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// `POST /`: one page of a player's match history.
    async fn search(&self, request: &SearchRequest) -> Result<MatchListResponse, FetchError>;

    /// `GET /retried-match/{id}`: `None` when the proxy still cannot resolve it.
    async fn retried_match(&self, match_id: &str) -> Result<Option<Match>, FetchError>;

    /// `GET /summoner/puuid/{puuid}`: `None` on 404.
    async fn summoner_by_puuid(
        &self,
        puuid: &str,
        tagline: &str,
    ) -> Result<Option<SummonerData>, FetchError>;

    /// `GET /summoner/{id}/league`: standings in every ranked queue.
    async fn league_entries(
        &self,
        summoner_id: &str,
        tagline: &str,
        puuid: &str,
    ) -> Result<Vec<RankEntry>, FetchError>;

    /// `GET /player/{puuid}/stats`: server-side summary.
    async fn player_stats(
        &self,
        puuid: &str,
        num_matches: u32,
    ) -> Result<PlayerSummaryStats, FetchError>;
}

/// Configuration for the proxy client.
#[derive(Debug, Clone)]
pub struct ProxyClientConfig {
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for ProxyClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5005".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("match-history/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed [`MatchSource`].
pub struct ProxyClient {
    client: Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ProxyClientConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("match-history/0.1.0")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(ProxyClientConfig::default())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from escaped path segments.
    ///
    /// With no segments this is the proxy root, which always ends in `/`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
            if segments.is_empty() {
                path.push("");
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Map non-success responses to [`FetchError`], using the proxy's `{error}` body when present.
    async fn check_status(response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(FetchError::HttpStatus {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ProxyErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string())
}

#[async_trait]
impl MatchSource for ProxyClient {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn search(&self, request: &SearchRequest) -> Result<MatchListResponse, FetchError> {
        let url = self.endpoint(&[])?;
        info!(
            "Fetching matches for {}#{} (start={})",
            request.game_name,
            request.tagline,
            request.start_index()
        );

        let response = self.client.post(url).json(request).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn retried_match(&self, match_id: &str) -> Result<Option<Match>, FetchError> {
        let url = self.endpoint(&["retried-match", match_id])?;
        let body: RetriedMatchResponse = self.get_json(url).await?;
        Ok(body.match_data)
    }

    async fn summoner_by_puuid(
        &self,
        puuid: &str,
        tagline: &str,
    ) -> Result<Option<SummonerData>, FetchError> {
        let mut url = self.endpoint(&["summoner", "puuid", puuid])?;
        url.query_pairs_mut().append_pair("tagline", tagline);

        match self.get_json(url).await {
            Ok(summoner) => Ok(Some(summoner)),
            Err(FetchError::HttpStatus { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn league_entries(
        &self,
        summoner_id: &str,
        tagline: &str,
        puuid: &str,
    ) -> Result<Vec<RankEntry>, FetchError> {
        let mut url = self.endpoint(&["summoner", summoner_id, "league"])?;
        url.query_pairs_mut()
            .append_pair("tagline", tagline)
            .append_pair("puuid", puuid);
        self.get_json(url).await
    }

    async fn player_stats(
        &self,
        puuid: &str,
        num_matches: u32,
    ) -> Result<PlayerSummaryStats, FetchError> {
        let mut url = self.endpoint(&["player", puuid, "stats"])?;
        url.query_pairs_mut()
            .append_pair("numMatches", &num_matches.to_string());
        self.get_json(url).await
    }
}
