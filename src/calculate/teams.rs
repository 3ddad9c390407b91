//! Team partitioner: split a match into opposing rosters for comparison.

use serde::{Deserialize, Serialize};

use crate::models::{Match, Participant, TeamId};

/// Numeric participant stat used to scale comparison bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStat {
    #[default]
    Damage,
    DamageTaken,
    Gold,
    Vision,
    Kills,
    Cs,
}

impl TeamStat {
    /// Read this stat from a participant.
    pub fn value(self, p: &Participant) -> u64 {
        match self {
            TeamStat::Damage => p.total_damage_dealt_to_champions,
            TeamStat::DamageTaken => p.total_damage_taken,
            TeamStat::Gold => p.gold_earned,
            TeamStat::Vision => p.vision_score,
            TeamStat::Kills => p.kills as u64,
            TeamStat::Cs => p.cs() as u64,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "damage" => Some(TeamStat::Damage),
            "damage_taken" => Some(TeamStat::DamageTaken),
            "gold" => Some(TeamStat::Gold),
            "vision" => Some(TeamStat::Vision),
            "kills" => Some(TeamStat::Kills),
            "cs" => Some(TeamStat::Cs),
            _ => None,
        }
    }
}

/// One side of a match.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster<'a> {
    pub team_id: TeamId,
    pub win: Option<bool>,
    pub participants: Vec<&'a Participant>,
    pub total_kills: u32,
    /// Largest value of the selected stat on this side (0 when empty)
    pub max_stat: u64,
}

impl<'a> Roster<'a> {
    fn build(m: &'a Match, team_id: TeamId, stat: TeamStat) -> Self {
        let participants: Vec<&Participant> = m.team_participants(team_id).collect();
        let max_stat = participants
            .iter()
            .map(|p| stat.value(p))
            .max()
            .unwrap_or(0);
        let total_kills = participants.iter().map(|p| p.kills).sum();

        Self {
            team_id,
            win: m.team_win(team_id),
            participants,
            total_kills,
            max_stat,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Both rosters of a match, scaled by the same stat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPartition<'a> {
    pub stat: TeamStat,
    pub blue: Roster<'a>,
    pub red: Roster<'a>,
}

impl<'a> TeamPartition<'a> {
    pub fn roster(&self, team_id: TeamId) -> &Roster<'a> {
        match team_id {
            TeamId::Blue => &self.blue,
            TeamId::Red => &self.red,
        }
    }

    /// Largest value of the stat across both teams.
    pub fn match_max(&self) -> u64 {
        self.blue.max_stat.max(self.red.max_stat)
    }

    /// Bar width for a participant relative to its own team's maximum, in [0, 1].
    pub fn bar_fraction(&self, p: &Participant) -> f64 {
        let max = self.roster(p.team_id).max_stat;
        if max == 0 {
            0.0
        } else {
            self.stat.value(p) as f64 / max as f64
        }
    }
}

/// Split participants into blue and red rosters, preserving roster order.
pub fn partition_teams(m: &Match, stat: TeamStat) -> TeamPartition<'_> {
    TeamPartition {
        stat,
        blue: Roster::build(m, TeamId::Blue, stat),
        red: Roster::build(m, TeamId::Red, stat),
    }
}
