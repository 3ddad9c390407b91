//! Ranked standing lookup for a searched player.

use tracing::{debug, warn};

use crate::calculate::{select_rank, RankLookup};
use crate::fetch::MatchSource;
use crate::models::QueueType;

/// Summoner id sent when none could be resolved; the proxy keys league entries on puuid.
pub const PLACEHOLDER_SUMMONER_ID: &str = "placeholder";

/// Resolve the player's solo-queue standing.
///
/// Uses `summoner_id` from the search response when present, otherwise asks the
/// proxy for it. A player that cannot be resolved, for any reason, still gets a
/// league lookup under [`PLACEHOLDER_SUMMONER_ID`]. A failed league lookup reads
/// as no rank. Without a puuid no request is made.
pub async fn lookup_rank(
    source: &dyn MatchSource,
    puuid: Option<&str>,
    summoner_id: Option<&str>,
    tagline: &str,
) -> RankLookup {
    let Some(puuid) = puuid.filter(|p| !p.trim().is_empty()) else {
        return RankLookup::IdentityMissing;
    };

    let summoner_id = match summoner_id.filter(|s| !s.trim().is_empty()) {
        Some(id) => id.to_string(),
        None => match source.summoner_by_puuid(puuid, tagline).await {
            Ok(Some(summoner)) => summoner.id,
            Ok(None) => {
                debug!("No summoner for {}, using placeholder id", puuid);
                PLACEHOLDER_SUMMONER_ID.to_string()
            }
            Err(e) => {
                warn!("Summoner lookup for {} failed, using placeholder id: {}", puuid, e);
                PLACEHOLDER_SUMMONER_ID.to_string()
            }
        },
    };

    let entries = match source.league_entries(&summoner_id, tagline, puuid).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("League lookup for {} failed: {}", summoner_id, e);
            Vec::new()
        }
    };
    select_rank(Some(puuid), &entries, &QueueType::RankedSolo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::{MockFailure, MockSource};
    use crate::models::{Division, RankEntry, SummonerData, Tier};

    fn solo(tier: Tier) -> RankEntry {
        RankEntry {
            queue_type: QueueType::RankedSolo,
            tier,
            division: Some(Division::II),
            league_points: 40,
            wins: 10,
            losses: 10,
        }
    }

    #[tokio::test]
    async fn test_uses_search_summoner_id() {
        let source = MockSource::new().with_league("sum-1", vec![solo(Tier::Gold)]);

        let lookup = lookup_rank(&source, Some("p1"), Some("sum-1"), "NA1").await;

        assert!(lookup.is_found());
        assert_eq!(source.calls(), vec!["league:sum-1".to_string()]);
    }

    #[tokio::test]
    async fn test_resolves_summoner_by_puuid() {
        let source = MockSource::new()
            .with_summoner(SummonerData {
                id: "sum-2".to_string(),
                puuid: "p2".to_string(),
                name: "Player".to_string(),
                summoner_level: 300,
            })
            .with_league("sum-2", vec![solo(Tier::Platinum)]);

        let lookup = lookup_rank(&source, Some("p2"), None, "EUW").await;

        assert_eq!(lookup.entry().map(|e| e.tier), Some(Tier::Platinum));
        assert_eq!(source.count_calls("summoner:"), 1);
    }

    #[tokio::test]
    async fn test_unknown_summoner_uses_placeholder() {
        let source = MockSource::new();

        let lookup = lookup_rank(&source, Some("p3"), None, "NA1").await;

        assert!(matches!(lookup, RankLookup::NoRank { .. }));
        assert_eq!(
            source.calls(),
            vec!["summoner:p3".to_string(), "league:placeholder".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_identity_makes_no_calls() {
        let source = MockSource::new();

        let lookup = lookup_rank(&source, None, Some("sum-1"), "NA1").await;

        assert_eq!(lookup, RankLookup::IdentityMissing);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_summoner_lookup_uses_placeholder() {
        let source = MockSource::new()
            .with_summoner_failure("p4", MockFailure::Status(500))
            .with_league(PLACEHOLDER_SUMMONER_ID, vec![solo(Tier::Silver)]);

        let lookup = lookup_rank(&source, Some("p4"), None, "NA1").await;

        assert_eq!(lookup.entry().map(|e| e.tier), Some(Tier::Silver));
        assert_eq!(
            source.calls(),
            vec!["summoner:p4".to_string(), "league:placeholder".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_league_lookup_is_no_rank() {
        let source = MockSource::new().with_league_failure("sum-5", MockFailure::Status(502));

        let lookup = lookup_rank(&source, Some("p5"), Some("sum-5"), "NA1").await;

        assert_eq!(
            lookup,
            RankLookup::NoRank {
                queue_type: QueueType::RankedSolo
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limited_summoner_lookup_still_reaches_league() {
        let source = MockSource::new().with_summoner_failure("p6", MockFailure::RateLimited(30));

        let lookup = lookup_rank(&source, Some("p6"), None, "NA1").await;

        assert!(matches!(lookup, RankLookup::NoRank { .. }));
        assert_eq!(source.count_calls("league:placeholder"), 1);
    }
}
