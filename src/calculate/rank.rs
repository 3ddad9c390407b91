//! Rank lookup: pick the ranked entry to display.

use serde::Serialize;

use crate::models::{QueueType, RankEntry};

/// Outcome of selecting a queue's standing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankLookup {
    Found {
        #[serde(flatten)]
        entry: RankEntry,
        #[serde(rename = "displayName")]
        display_name: String,
        #[serde(rename = "winRate")]
        win_rate: f64,
    },
    /// The player has no standing in the requested queue
    NoRank {
        #[serde(rename = "queueType")]
        queue_type: QueueType,
    },
    /// No player identity was available, so no lookup was possible
    IdentityMissing,
}

impl RankLookup {
    fn found(entry: RankEntry) -> Self {
        RankLookup::Found {
            display_name: entry.display_name(),
            win_rate: entry.win_rate(),
            entry,
        }
    }

    pub fn entry(&self) -> Option<&RankEntry> {
        match self {
            RankLookup::Found { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RankLookup::Found { .. })
    }
}

/// Select the entry for `queue` from a player's standings.
///
/// `puuid` is the identity the upstream lookup is keyed on; without it the
/// result is `IdentityMissing`, distinct from `NoRank`.
pub fn select_rank(puuid: Option<&str>, entries: &[RankEntry], queue: &QueueType) -> RankLookup {
    if puuid.map_or(true, |p| p.trim().is_empty()) {
        return RankLookup::IdentityMissing;
    }

    entries
        .iter()
        .find(|e| &e.queue_type == queue)
        .cloned()
        .map(RankLookup::found)
        .unwrap_or_else(|| RankLookup::NoRank {
            queue_type: queue.clone(),
        })
}
