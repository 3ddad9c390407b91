//! Statistics calculation engine.
//!
//! Computes derived metrics from raw match records:
//! - Per-match player view (KDA, kill participation, result)
//! - Team rosters with per-team stat maximums
//! - Summary statistics over a window of recent matches
//! - Ranked queue selection

pub mod aggregate;
pub mod rank;
pub mod teams;
pub mod transform;

pub use aggregate::{aggregate_player_stats, DEFAULT_STATS_WINDOW};
pub use rank::{select_rank, RankLookup};
pub use teams::{partition_teams, Roster, TeamPartition, TeamStat};
pub use transform::{transform_match, transform_matches, TransformError};

/// Calculate KDA.
///
/// A deathless game scores kills + assists; this is the perfect-KDA case, not a guard.
pub fn calculate_kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    let takedowns = (kills + assists) as f64;
    if deaths == 0 {
        takedowns
    } else {
        takedowns / deaths as f64
    }
}

/// Calculate kill participation as a rounded percentage.
///
/// Returns 0 when the team has no kills. The result is not clamped to 100.
pub fn calculate_kill_participation(kills: u32, assists: u32, team_kills: u32) -> u32 {
    if team_kills == 0 {
        return 0;
    }
    (100.0 * (kills + assists) as f64 / team_kills as f64).round() as u32
}

/// Calculate win rate from decided games.
pub fn calculate_win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Arithmetic mean of a running sum, 0 for an empty window.
pub fn calculate_average(sum: u32, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
