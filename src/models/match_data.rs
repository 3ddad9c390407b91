//! Match, participant and team records as returned by the proxy.
//!
//! Field names follow the upstream match payload (`metadata` / `info`
//! envelopes, camelCase keys) so a page can be deserialized directly.

use serde::{Deserialize, Serialize};

use super::queue_name;

/// One of the two opposing sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TeamId {
    Blue,
    Red,
}

impl TeamId {
    /// Numeric identifier used on the wire.
    pub fn as_u16(self) -> u16 {
        match self {
            TeamId::Blue => 100,
            TeamId::Red => 200,
        }
    }

    /// The opposing side.
    pub fn opponent(self) -> Self {
        match self {
            TeamId::Blue => TeamId::Red,
            TeamId::Red => TeamId::Blue,
        }
    }
}

impl TryFrom<u16> for TeamId {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(TeamId::Blue),
            200 => Ok(TeamId::Red),
            other => Err(format!("unknown team id {}", other)),
        }
    }
}

impl From<TeamId> for u16 {
    fn from(team: TeamId) -> Self {
        team.as_u16()
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::Blue => write!(f, "blue"),
            TeamId::Red => write!(f, "red"),
        }
    }
}

/// Result of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    /// Both or neither team reported a win (non-standard modes, remakes).
    Unknown,
}

/// Per-team outcome record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: TeamId,
    pub win: bool,
}

/// One player's record within a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Stable player identity, the join key across matches
    pub puuid: String,

    pub team_id: TeamId,

    /// Played champion (free text, see `assets::normalize_champion_name`)
    pub champion_name: String,

    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,

    pub lane: Option<String>,
    pub role: Option<String>,

    /// Creep score; older payloads omit it
    pub total_minions_killed: Option<u32>,

    pub riot_id_game_name: Option<String>,
    pub riot_id_tagline: Option<String>,

    #[serde(default, alias = "championLevel")]
    pub champ_level: u32,

    #[serde(default)]
    pub total_damage_dealt_to_champions: u64,
    #[serde(default)]
    pub total_damage_taken: u64,
    #[serde(default)]
    pub gold_earned: u64,
    #[serde(default)]
    pub vision_score: u64,

    #[serde(default)]
    pub summoner1_id: u32,
    #[serde(default)]
    pub summoner2_id: u32,

    #[serde(default)]
    pub item0: u32,
    #[serde(default)]
    pub item1: u32,
    #[serde(default)]
    pub item2: u32,
    #[serde(default)]
    pub item3: u32,
    #[serde(default)]
    pub item4: u32,
    #[serde(default)]
    pub item5: u32,
    #[serde(default)]
    pub item6: u32,
}

impl Participant {
    /// All seven item slots in order (0 = empty).
    pub fn item_slots(&self) -> [u32; 7] {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6,
        ]
    }

    /// Equipped items, skipping empty slots.
    pub fn items(&self) -> impl Iterator<Item = u32> {
        self.item_slots().into_iter().filter(|id| *id != 0)
    }

    /// Creep score with absent values treated as zero.
    pub fn cs(&self) -> u32 {
        self.total_minions_killed.unwrap_or(0)
    }

    /// Kills plus assists.
    pub fn takedowns(&self) -> u32 {
        self.kills + self.assists
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub game_mode: String,

    #[serde(default)]
    pub queue_id: u32,

    /// Duration in seconds
    #[serde(default)]
    pub game_duration: u64,

    /// Creation time, epoch millis
    #[serde(default)]
    pub game_creation: i64,

    #[serde(default)]
    pub participants: Vec<Participant>,

    #[serde(default)]
    pub teams: Vec<Team>,
}

/// A completed game with two opposing teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

impl Match {
    pub fn match_id(&self) -> &str {
        &self.metadata.match_id
    }

    /// Human-readable queue name.
    pub fn queue_name(&self) -> String {
        queue_name(self.info.queue_id)
    }

    /// Find the participant with the given puuid.
    pub fn participant(&self, puuid: &str) -> Option<&Participant> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    /// Participants on one side, in roster order.
    pub fn team_participants(&self, team: TeamId) -> impl Iterator<Item = &Participant> {
        self.info
            .participants
            .iter()
            .filter(move |p| p.team_id == team)
    }

    /// Total kills recorded for one side.
    pub fn team_kills(&self, team: TeamId) -> u32 {
        self.team_participants(team).map(|p| p.kills).sum()
    }

    /// The `win` flag reported for a team, if that team is present.
    pub fn team_win(&self, team: TeamId) -> Option<bool> {
        self.info
            .teams
            .iter()
            .find(|t| t.team_id == team)
            .map(|t| t.win)
    }

    /// Classify the result for one side.
    ///
    /// A decided match has exactly one winning team. Anything else is
    /// `Unknown` rather than an error.
    pub fn result_for(&self, team: TeamId) -> MatchResult {
        let winners = self.info.teams.iter().filter(|t| t.win).count();
        if winners != 1 {
            return MatchResult::Unknown;
        }
        match self.team_win(team) {
            Some(true) => MatchResult::Win,
            Some(false) => MatchResult::Loss,
            None => MatchResult::Unknown,
        }
    }
}
