//! Aggregator: fold a window of recent matches into summary statistics.

use std::collections::HashMap;

use super::{calculate_average, calculate_win_rate};
use crate::models::{ChampionAggregate, Match, MatchResult, PlayerSummaryStats};

/// Default number of recent matches summarized.
pub const DEFAULT_STATS_WINDOW: usize = 20;

/// Summarize up to `window` most recent matches for a player.
///
/// `matches` is expected most-recent first. Matches without the player are
/// skipped, so `matches_analyzed` may be lower than `window`. An empty input
/// yields an all-zero summary rather than an error.
pub fn aggregate_player_stats(matches: &[Match], puuid: &str, window: usize) -> PlayerSummaryStats {
    let mut stats = PlayerSummaryStats::default();
    let mut champions: HashMap<&str, ChampionAggregate> = HashMap::new();
    let (mut kills, mut deaths, mut assists) = (0u32, 0u32, 0u32);

    for m in matches.iter().take(window) {
        let Some(participant) = m.participant(puuid) else {
            continue;
        };

        let result = m.result_for(participant.team_id);
        stats.matches_analyzed += 1;
        stats.record_result(result);

        kills += participant.kills;
        deaths += participant.deaths;
        assists += participant.assists;

        champions
            .entry(participant.champion_name.as_str())
            .or_insert_with(|| ChampionAggregate::new(participant.champion_name.clone()))
            .record(
                result == MatchResult::Win,
                participant.kills,
                participant.deaths,
                participant.assists,
            );
    }

    stats.win_rate = calculate_win_rate(stats.wins, stats.losses);
    stats.avg_kills = calculate_average(kills, stats.matches_analyzed);
    stats.avg_deaths = calculate_average(deaths, stats.matches_analyzed);
    stats.avg_assists = calculate_average(assists, stats.matches_analyzed);
    stats.champions = rank_champions(champions.into_values().collect());

    stats
}

/// Most played first, then higher win rate, then name.
fn rank_champions(mut champions: Vec<ChampionAggregate>) -> Vec<ChampionAggregate> {
    champions.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
            .then_with(|| a.name.cmp(&b.name))
    });
    champions
}
