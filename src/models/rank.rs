//! Ranked ladder standings.

use serde::{Deserialize, Serialize};

/// Ranked queue category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueueType {
    /// The canonical solo/duo ranked queue
    RankedSolo,
    RankedFlex,
    Other(String),
}

impl QueueType {
    pub const RANKED_SOLO: &'static str = "RANKED_SOLO_5x5";
    pub const RANKED_FLEX: &'static str = "RANKED_FLEX_SR";

    pub fn as_str(&self) -> &str {
        match self {
            QueueType::RankedSolo => Self::RANKED_SOLO,
            QueueType::RankedFlex => Self::RANKED_FLEX,
            QueueType::Other(s) => s,
        }
    }
}

impl From<String> for QueueType {
    fn from(s: String) -> Self {
        match s.as_str() {
            Self::RANKED_SOLO => QueueType::RankedSolo,
            Self::RANKED_FLEX => QueueType::RankedFlex,
            _ => QueueType::Other(s),
        }
    }
}

impl From<QueueType> for String {
    fn from(q: QueueType) -> Self {
        q.as_str().to_string()
    }
}

/// Ladder tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Apex tiers have no divisions.
    pub fn is_apex(self) -> bool {
        self >= Tier::Master
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-rank within a tier. `I` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Some(Division::I),
            "II" => Some(Division::II),
            "III" => Some(Division::III),
            "IV" => Some(Division::IV),
            _ => None,
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Division::I => write!(f, "I"),
            Division::II => write!(f, "II"),
            Division::III => write!(f, "III"),
            Division::IV => write!(f, "IV"),
        }
    }
}

/// League entry as sent by the proxy (`rank` carries the division).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRankEntry {
    queue_type: QueueType,
    tier: Tier,
    #[serde(default, alias = "division")]
    rank: Option<String>,
    #[serde(default)]
    league_points: u32,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
}

/// A player's standing in one ranked queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRankEntry")]
pub struct RankEntry {
    pub queue_type: QueueType,
    pub tier: Tier,
    /// Absent for apex tiers
    pub division: Option<Division>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl From<RawRankEntry> for RankEntry {
    fn from(raw: RawRankEntry) -> Self {
        let division = if raw.tier.is_apex() {
            None
        } else {
            raw.rank.as_deref().and_then(Division::parse)
        };

        Self {
            queue_type: raw.queue_type,
            tier: raw.tier,
            division,
            league_points: raw.league_points,
            wins: raw.wins,
            losses: raw.losses,
        }
    }
}

impl RankEntry {
    /// wins / (wins + losses), 0 when no games are recorded.
    pub fn win_rate(&self) -> f64 {
        crate::calculate::calculate_win_rate(self.wins, self.losses)
    }

    /// Display name, e.g. "GOLD II" or "MASTER".
    pub fn display_name(&self) -> String {
        match self.division {
            Some(division) if !self.tier.is_apex() => format!("{} {}", self.tier, division),
            _ => self.tier.to_string(),
        }
    }
}
