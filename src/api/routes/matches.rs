use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::assets::normalize_champion_name;
use crate::calculate::{
    calculate_kda, calculate_kill_participation, partition_teams, transform_match, Roster,
    TeamPartition, TeamStat,
};
use crate::models::{
    format_game_duration, format_time_ago, Match, Participant, TeamId, TransformedMatchData,
    UNKNOWN,
};
use crate::session::MatchResolution;

// ── Match list ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    #[serde(flatten)]
    pub view: TransformedMatchData,
    pub kda_label: String,
    pub duration: String,
    pub time_ago: String,
    pub resolution: MatchResolution,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchRow>,
    pub total: usize,
}

/// Loaded matches from the searched player's point of view, in load order.
pub async fn list(State(state): State<AppState>) -> Json<MatchesResponse> {
    let session = &state.session;
    let snapshot = session.snapshot().await;
    let Some(puuid) = snapshot.puuid else {
        return Json(MatchesResponse {
            matches: Vec::new(),
            total: 0,
        });
    };

    let now = Utc::now();
    let matches: Vec<MatchRow> = session
        .matches()
        .await
        .iter()
        .filter_map(|m| {
            let view = transform_match(m, &puuid).ok()?;
            let resolution = if snapshot.recovered_matches.iter().any(|id| id == &view.match_id) {
                MatchResolution::Recovered
            } else {
                MatchResolution::Fetched
            };
            Some(MatchRow {
                kda_label: view.kda_label(),
                duration: format_game_duration(m.info.game_duration),
                time_ago: format_time_ago(m.info.game_creation, now),
                resolution,
                view,
            })
        })
        .collect();

    Json(MatchesResponse {
        total: matches.len(),
        matches,
    })
}

// ── Team comparison ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TeamsParams {
    pub stat: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRow {
    pub puuid: String,
    pub riot_id: String,
    pub champion_name: String,
    pub champion_key: String,
    pub champ_level: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda: f64,
    pub kill_participation_percent: u32,
    pub cs: u32,
    pub stat_value: u64,
    /// Bar width relative to the best value on the same team, in [0, 1]
    pub bar_fraction: f64,
    pub items: Vec<u32>,
    pub summoner_spells: [u32; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub team_id: TeamId,
    pub win: Option<bool>,
    pub total_kills: u32,
    pub max_stat: u64,
    pub participants: Vec<ParticipantRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsResponse {
    pub match_id: String,
    pub queue_name: String,
    pub game_mode: String,
    pub duration: String,
    pub stat: TeamStat,
    pub match_max: u64,
    pub blue: RosterView,
    pub red: RosterView,
}

fn riot_id_label(p: &Participant) -> String {
    match (p.riot_id_game_name.as_deref(), p.riot_id_tagline.as_deref()) {
        (Some(name), Some(tag)) if !name.is_empty() => format!("{}#{}", name, tag),
        (Some(name), _) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn roster_view(partition: &TeamPartition<'_>, roster: &Roster<'_>) -> RosterView {
    let participants = roster
        .participants
        .iter()
        .map(|p| ParticipantRow {
            puuid: p.puuid.clone(),
            riot_id: riot_id_label(p),
            champion_name: p.champion_name.clone(),
            champion_key: normalize_champion_name(&p.champion_name),
            champ_level: p.champ_level,
            kills: p.kills,
            deaths: p.deaths,
            assists: p.assists,
            kda: calculate_kda(p.kills, p.deaths, p.assists),
            kill_participation_percent: calculate_kill_participation(
                p.kills,
                p.assists,
                roster.total_kills,
            ),
            cs: p.cs(),
            stat_value: partition.stat.value(p),
            bar_fraction: partition.bar_fraction(p),
            items: p.items().collect(),
            summoner_spells: [p.summoner1_id, p.summoner2_id],
        })
        .collect();

    RosterView {
        team_id: roster.team_id,
        win: roster.win,
        total_kills: roster.total_kills,
        max_stat: roster.max_stat,
        participants,
    }
}

fn teams_response(m: &Match, stat: TeamStat) -> TeamsResponse {
    let partition = partition_teams(m, stat);
    TeamsResponse {
        match_id: m.match_id().to_string(),
        queue_name: m.queue_name(),
        game_mode: m.info.game_mode.clone(),
        duration: format_game_duration(m.info.game_duration),
        stat,
        match_max: partition.match_max(),
        blue: roster_view(&partition, &partition.blue),
        red: roster_view(&partition, &partition.red),
    }
}

pub async fn teams(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Query(params): Query<TeamsParams>,
) -> Result<Json<TeamsResponse>, ApiError> {
    let stat = match params.stat.as_deref() {
        None => TeamStat::default(),
        Some(s) => TeamStat::parse(s)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown stat: {}", s)))?,
    };

    let m = state
        .session
        .find_match(&match_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Match {} is not loaded", match_id)))?;

    Ok(Json(teams_response(&m, stat)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::api::test_support::{app, get_json, test_state};
    use crate::fetch::mock::{page, MockSource};
    use crate::models::fixtures::{full_match, match_for, participant};

    fn ranked_match() -> Match {
        let mut me = participant("me", TeamId::Blue, "MonkeyKing", 6, 2, 8);
        me.riot_id_game_name = Some("God of Wind".to_string());
        me.riot_id_tagline = Some("NA1".to_string());
        me.total_damage_dealt_to_champions = 24_000;
        me.item0 = 3078;
        me.item3 = 3047;

        let mut ally = participant("ally", TeamId::Blue, "Lux", 4, 5, 10);
        ally.total_damage_dealt_to_champions = 12_000;

        let mut enemy = participant("enemy", TeamId::Red, "Kai'Sa", 9, 6, 3);
        enemy.total_damage_dealt_to_champions = 30_000;

        full_match("NA1_500", vec![me, ally, enemy], TeamId::Blue)
    }

    async fn searched_state() -> AppState {
        let state = test_state(MockSource::new().with_page(
            "God of Wind",
            0,
            page("me", vec![ranked_match(), match_for("NA1_501", "other", "Zed", true)]),
        ));
        state.session.search("God of Wind#NA1").await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_list_skips_matches_without_player() {
        let state = searched_state().await;

        let (status, json) = get_json(app(&state), "/api/matches").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        let row = &json["matches"][0];
        assert_eq!(row["matchId"], "NA1_500");
        assert_eq!(row["championKey"], "Wukong");
        assert_eq!(row["killParticipationPercent"], 140);
        assert_eq!(row["kdaLabel"], "7.00");
        assert_eq!(row["duration"], "30:00");
        assert_eq!(row["resolution"], "fetched");
        assert_eq!(row["queueName"], "Ranked Solo/Duo");
    }

    #[tokio::test]
    async fn test_list_before_search_is_empty() {
        let state = test_state(MockSource::new());
        let (status, json) = get_json(app(&state), "/api/matches").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 0);
    }

    #[tokio::test]
    async fn test_teams_default_damage() {
        let state = searched_state().await;

        let (status, json) = get_json(app(&state), "/api/matches/NA1_500/teams").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stat"], "damage");
        assert_eq!(json["matchMax"], 30_000);
        assert_eq!(json["blue"]["teamId"], 100);
        assert_eq!(json["blue"]["win"], true);
        assert_eq!(json["blue"]["maxStat"], 24_000);
        assert_eq!(json["blue"]["totalKills"], 10);

        let me = &json["blue"]["participants"][0];
        assert_eq!(me["riotId"], "God of Wind#NA1");
        assert_eq!(me["barFraction"], 1.0);
        assert_eq!(me["items"], serde_json::json!([3078, 3047]));
        assert_eq!(json["blue"]["participants"][1]["barFraction"], 0.5);

        let enemy = &json["red"]["participants"][0];
        assert_eq!(enemy["championKey"], "KaiSa");
        assert_eq!(enemy["riotId"], UNKNOWN);
    }

    #[tokio::test]
    async fn test_teams_by_kills() {
        let state = searched_state().await;

        let (status, json) = get_json(app(&state), "/api/matches/NA1_500/teams?stat=kills").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stat"], "kills");
        assert_eq!(json["blue"]["maxStat"], 6);
    }

    #[tokio::test]
    async fn test_teams_errors() {
        let state = searched_state().await;

        let (status, _) = get_json(app(&state), "/api/matches/NA1_999/teams").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = get_json(app(&state), "/api/matches/NA1_500/teams?stat=mana").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
