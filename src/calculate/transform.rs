//! Per-match transformer: one player's view of one match.

use thiserror::Error;

use super::{calculate_kda, calculate_kill_participation};
use crate::assets::normalize_champion_name;
use crate::models::{Match, TransformedMatchData, UNKNOWN};

/// Errors from deriving a player's view of a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The player is not in this match. Callers skip the match, not the batch.
    #[error("participant {puuid} not found in match {match_id}")]
    ParticipantNotFound { match_id: String, puuid: String },
}

/// Derive a player's outcome, KDA, kill participation and lane from a match.
pub fn transform_match(m: &Match, puuid: &str) -> Result<TransformedMatchData, TransformError> {
    let participant = m
        .participant(puuid)
        .ok_or_else(|| TransformError::ParticipantNotFound {
            match_id: m.match_id().to_string(),
            puuid: puuid.to_string(),
        })?;

    let team = participant.team_id;
    let team_kills = m.team_kills(team);

    Ok(TransformedMatchData {
        match_id: m.match_id().to_string(),
        game_mode: m.info.game_mode.clone(),
        queue_name: m.queue_name(),
        win: m.team_win(team).unwrap_or(false),
        result: m.result_for(team),
        champion: participant.champion_name.clone(),
        champion_key: normalize_champion_name(&participant.champion_name),
        kills: participant.kills,
        deaths: participant.deaths,
        assists: participant.assists,
        kda: calculate_kda(participant.kills, participant.deaths, participant.assists),
        kill_participation_percent: calculate_kill_participation(
            participant.kills,
            participant.assists,
            team_kills,
        ),
        lane: non_empty_or_unknown(participant.lane.as_deref()),
        cs: participant.cs(),
        riot_id_game_name: non_empty_or_unknown(participant.riot_id_game_name.as_deref()),
        puuid: puuid.to_string(),
    })
}

/// Transform every match the player appears in, skipping the rest.
pub fn transform_matches(matches: &[Match], puuid: &str) -> Vec<TransformedMatchData> {
    matches
        .iter()
        .filter_map(|m| match transform_match(m, puuid) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!("Skipping match: {}", e);
                None
            }
        })
        .collect()
}

fn non_empty_or_unknown(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}
