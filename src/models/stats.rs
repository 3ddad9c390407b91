//! Derived statistics models.

use serde::{Deserialize, Serialize};

use super::MatchResult;
use crate::calculate::{calculate_kda, calculate_win_rate};

/// Placeholder for absent lane / name fields.
pub const UNKNOWN: &str = "Unknown";

/// One player's view of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedMatchData {
    pub match_id: String,
    pub game_mode: String,
    pub queue_name: String,

    /// The `win` flag of the player's team (false if the team is missing)
    pub win: bool,

    /// Classified result; `Unknown` when the match has no single winner
    pub result: MatchResult,

    pub champion: String,
    /// Asset lookup key for the champion
    pub champion_key: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,

    /// (kills + assists) / deaths, or kills + assists when deaths = 0
    pub kda: f64,

    /// Share of team kills credited to the player, 0 when the team has none.
    /// Not clamped: lagging upstream data can push it above 100.
    pub kill_participation_percent: u32,

    pub lane: String,
    pub cs: u32,
    pub riot_id_game_name: String,
    pub puuid: String,
}

impl TransformedMatchData {
    /// KDA as shown to the user: integer for a deathless game, two decimals otherwise.
    pub fn kda_label(&self) -> String {
        if self.deaths == 0 {
            self.kda.to_string()
        } else {
            format!("{:.2}", self.kda)
        }
    }
}

/// Per-champion totals within a summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionAggregate {
    #[serde(rename = "championName", alias = "name")]
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

impl ChampionAggregate {
    /// Empty aggregate for a champion.
    pub fn new(name: String) -> Self {
        Self {
            name,
            games: 0,
            wins: 0,
            win_rate: 0.0,
            kills: 0,
            deaths: 0,
            assists: 0,
        }
    }

    /// Add one game and refresh the win rate.
    pub fn record(&mut self, won: bool, kills: u32, deaths: u32, assists: u32) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
        self.kills += kills;
        self.deaths += deaths;
        self.assists += assists;
        self.win_rate = calculate_win_rate(self.wins, self.games - self.wins);
    }

    pub fn losses(&self) -> u32 {
        self.games - self.wins
    }

    /// Cumulative KDA over all games on this champion.
    pub fn kda(&self) -> f64 {
        calculate_kda(self.kills, self.deaths, self.assists)
    }
}

/// Summary over a player's most recent matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryStats {
    /// Matches where the player was found (may be fewer than requested)
    pub matches_analyzed: u32,
    pub wins: u32,
    pub losses: u32,

    /// wins / (wins + losses); undecided games count toward neither
    pub win_rate: f64,

    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,

    /// Most played first
    #[serde(rename = "topChampions", alias = "champions", default)]
    pub champions: Vec<ChampionAggregate>,
}

impl PlayerSummaryStats {
    /// KDA from the window averages.
    pub fn avg_kda(&self) -> f64 {
        if self.avg_deaths > 0.0 {
            (self.avg_kills + self.avg_assists) / self.avg_deaths
        } else {
            self.avg_kills + self.avg_assists
        }
    }

    /// The `n` most played champions.
    pub fn top_champions(&self, n: usize) -> &[ChampionAggregate] {
        &self.champions[..n.min(self.champions.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.matches_analyzed == 0
    }

    /// Count a decided or undecided game toward wins/losses.
    pub(crate) fn record_result(&mut self, result: MatchResult) {
        match result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Loss => self.losses += 1,
            MatchResult::Unknown => {}
        }
    }
}
