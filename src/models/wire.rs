//! Request and response bodies exchanged with the backend proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{Match, RiotId};

/// Body of `POST /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub game_name: String,
    pub tagline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl SearchRequest {
    /// Request one page of a player's history starting at `start`.
    pub fn page(riot_id: &RiotId, start: u32, count: u32) -> Self {
        Self {
            game_name: riot_id.game_name.clone(),
            tagline: riot_id.tagline.clone(),
            start: Some(start),
            count: Some(count),
        }
    }

    /// Offset actually requested (0 when omitted).
    pub fn start_index(&self) -> u32 {
        self.start.unwrap_or(0)
    }
}

/// Response of `POST /`: one page of matches plus pagination metadata.
///
/// Matches are read one by one. An entry that does not parse is left out of
/// `match_data_list`, counted in `unreadable_matches`, and its id (when it has
/// one) joins `failed_matches` so it gets the usual single retry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMatchListResponse")]
pub struct MatchListResponse {
    pub puuid: String,

    pub match_data_list: Vec<Match>,

    /// Match ids the proxy could not fetch for this page
    pub failed_matches: Vec<String>,

    pub summoner_id: Option<String>,

    pub has_more: Option<bool>,
    pub next_start_index: Option<u32>,
    pub total_loaded: Option<u32>,

    /// Cooldown in seconds when the proxy is being rate limited
    pub retry_after: Option<u64>,

    #[serde(skip)]
    pub unreadable_matches: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchListResponse {
    puuid: String,
    #[serde(default)]
    match_data_list: Vec<Value>,
    #[serde(default)]
    failed_matches: Vec<String>,
    summoner_id: Option<String>,
    has_more: Option<bool>,
    next_start_index: Option<u32>,
    total_loaded: Option<u32>,
    retry_after: Option<u64>,
}

impl From<RawMatchListResponse> for MatchListResponse {
    fn from(raw: RawMatchListResponse) -> Self {
        let mut failed_matches = raw.failed_matches;
        let mut match_data_list = Vec::with_capacity(raw.match_data_list.len());
        let mut unreadable_matches = 0;

        for value in raw.match_data_list {
            let match_id = value
                .pointer("/metadata/matchId")
                .and_then(Value::as_str)
                .map(str::to_string);

            match serde_json::from_value::<Match>(value) {
                Ok(m) => match_data_list.push(m),
                Err(e) => {
                    unreadable_matches += 1;
                    match match_id {
                        Some(id) => {
                            warn!("Unreadable match {} in page: {}", id, e);
                            if !failed_matches.contains(&id) {
                                failed_matches.push(id);
                            }
                        }
                        None => warn!("Dropping unreadable match without an id: {}", e),
                    }
                }
            }
        }

        Self {
            puuid: raw.puuid,
            match_data_list,
            failed_matches,
            summoner_id: raw.summoner_id,
            has_more: raw.has_more,
            next_start_index: raw.next_start_index,
            total_loaded: raw.total_loaded,
            retry_after: raw.retry_after,
            unreadable_matches,
        }
    }
}

/// Response of `GET /retried-match/{matchId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetriedMatchResponse {
    #[serde(rename = "match")]
    pub match_data: Option<Match>,
}

/// Response of `GET /summoner/puuid/{puuid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerData {
    pub id: String,
    pub puuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summoner_level: u32,
}

/// Error body carried by non-2xx proxy responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyErrorBody {
    pub error: String,
}
