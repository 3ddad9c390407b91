//! Match builders shared by unit tests.

use super::{Match, MatchInfo, MatchMetadata, Participant, Team, TeamId};

pub fn participant(
    puuid: &str,
    team_id: TeamId,
    champion: &str,
    kills: u32,
    deaths: u32,
    assists: u32,
) -> Participant {
    Participant {
        puuid: puuid.to_string(),
        team_id,
        champion_name: champion.to_string(),
        kills,
        deaths,
        assists,
        lane: None,
        role: None,
        total_minions_killed: None,
        riot_id_game_name: None,
        riot_id_tagline: None,
        champ_level: 18,
        total_damage_dealt_to_champions: 0,
        total_damage_taken: 0,
        gold_earned: 0,
        vision_score: 0,
        summoner1_id: 4,
        summoner2_id: 14,
        item0: 0,
        item1: 0,
        item2: 0,
        item3: 0,
        item4: 0,
        item5: 0,
        item6: 0,
    }
}

/// A ranked match where `winner` won.
pub fn full_match(match_id: &str, participants: Vec<Participant>, winner: TeamId) -> Match {
    Match {
        metadata: MatchMetadata {
            match_id: match_id.to_string(),
        },
        info: MatchInfo {
            game_mode: "CLASSIC".to_string(),
            queue_id: 420,
            game_duration: 1800,
            game_creation: 1_700_000_000_000,
            participants,
            teams: vec![
                Team {
                    team_id: TeamId::Blue,
                    win: winner == TeamId::Blue,
                },
                Team {
                    team_id: TeamId::Red,
                    win: winner == TeamId::Red,
                },
            ],
        },
    }
}

/// A match featuring `puuid` on blue playing `champion`, plus one red opponent.
pub fn match_for(match_id: &str, puuid: &str, champion: &str, won: bool) -> Match {
    full_match(
        match_id,
        vec![
            participant(puuid, TeamId::Blue, champion, 4, 2, 6),
            participant("opponent", TeamId::Red, "Garen", 2, 4, 1),
        ],
        if won { TeamId::Blue } else { TeamId::Red },
    )
}
