//! Pagination state for one player search.
//!
//! Pure state: no I/O, no clocks. The controller applies page responses and
//! retry outcomes to it as single, atomic updates.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::models::{Match, MatchListResponse};

/// Where a match id stands in the fetch/retry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResolution {
    /// Delivered with its page
    Fetched,
    /// Failed with its page, then resolved by the single retry
    Recovered,
    /// Failed with its page, retry not yet attempted
    PendingRetry,
    /// Failed with its page and again on retry; terminal
    Unresolved,
}

/// Result of applying one page response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageApplied {
    pub appended: usize,
    /// Matches dropped because their id was already loaded
    pub duplicates: usize,
    /// Ids newly marked as failed; each needs exactly one retry
    pub newly_failed: Vec<String>,
    pub has_more: bool,
    pub next_start_index: u32,
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    matches: Vec<Match>,
    loaded_ids: HashSet<String>,
    next_start_index: u32,
    has_more: bool,
    retry_after_secs: Option<u64>,
    failed_match_ids: BTreeSet<String>,
    unresolved_match_ids: BTreeSet<String>,
    recovered_match_ids: BTreeSet<String>,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a successful page fetched at `requested_start`.
    ///
    /// `has_more` takes the server's flag when present, otherwise it is true iff
    /// the page came back full. `next_start_index` takes the server's value when
    /// present, otherwise `requested_start + page_size`.
    pub fn apply_page(
        &mut self,
        response: MatchListResponse,
        requested_start: u32,
        page_size: u32,
    ) -> PageApplied {
        let returned = response.match_data_list.len();
        let page_len = returned + response.unreadable_matches;
        let appended = self.append(response.match_data_list);

        self.has_more = response
            .has_more
            .unwrap_or(page_len == page_size as usize);
        self.next_start_index = response
            .next_start_index
            .unwrap_or(requested_start + page_size);
        self.retry_after_secs = response.retry_after;

        let mut newly_failed = Vec::new();
        for id in response.failed_matches {
            if self.is_known(&id) {
                continue;
            }
            self.failed_match_ids.insert(id.clone());
            newly_failed.push(id);
        }

        PageApplied {
            appended,
            duplicates: returned - appended,
            newly_failed,
            has_more: self.has_more,
            next_start_index: self.next_start_index,
            retry_after: self.retry_after_secs,
        }
    }

    /// Apply the outcome of the single retry for `match_id`.
    ///
    /// Returns `None` when the id was not pending (stale or repeated outcome).
    pub fn resolve_retry(&mut self, match_id: &str, found: Option<Match>) -> Option<MatchResolution> {
        if !self.failed_match_ids.remove(match_id) {
            return None;
        }

        match found {
            Some(m) => {
                self.append(vec![m]);
                self.recovered_match_ids.insert(match_id.to_string());
                Some(MatchResolution::Recovered)
            }
            None => {
                self.unresolved_match_ids.insert(match_id.to_string());
                Some(MatchResolution::Unresolved)
            }
        }
    }

    pub fn resolution(&self, match_id: &str) -> Option<MatchResolution> {
        if self.failed_match_ids.contains(match_id) {
            Some(MatchResolution::PendingRetry)
        } else if self.unresolved_match_ids.contains(match_id) {
            Some(MatchResolution::Unresolved)
        } else if self.recovered_match_ids.contains(match_id) {
            Some(MatchResolution::Recovered)
        } else if self.loaded_ids.contains(match_id) {
            Some(MatchResolution::Fetched)
        } else {
            None
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn find(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.match_id() == match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn next_start_index(&self) -> u32 {
        self.next_start_index
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after_secs
    }

    pub fn failed_match_ids(&self) -> &BTreeSet<String> {
        &self.failed_match_ids
    }

    pub fn unresolved_match_ids(&self) -> &BTreeSet<String> {
        &self.unresolved_match_ids
    }

    pub fn recovered_match_ids(&self) -> &BTreeSet<String> {
        &self.recovered_match_ids
    }

    /// Append unseen matches. A loaded id leaves the retry lifecycle.
    fn append(&mut self, batch: Vec<Match>) -> usize {
        let before = self.matches.len();
        for m in batch {
            if self.loaded_ids.insert(m.match_id().to_string()) {
                self.failed_match_ids.remove(m.match_id());
                self.matches.push(m);
            }
        }
        self.matches.len() - before
    }

    /// Already loaded or already in the retry lifecycle.
    fn is_known(&self, match_id: &str) -> bool {
        self.loaded_ids.contains(match_id)
            || self.failed_match_ids.contains(match_id)
            || self.unresolved_match_ids.contains(match_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::page;
    use crate::models::fixtures::match_for;

    fn matches(ids: std::ops::Range<u32>) -> Vec<Match> {
        ids.map(|i| match_for(&format!("NA1_{}", i), "me", "Ahri", true))
            .collect()
    }

    #[test]
    fn test_full_page_infers_has_more() {
        let mut state = PaginationState::new();
        let applied = state.apply_page(page("me", matches(0..20)), 0, 20);

        assert_eq!(applied.appended, 20);
        assert!(applied.has_more);
        assert_eq!(state.next_start_index(), 20);
        assert_eq!(state.len(), 20);
    }

    #[test]
    fn test_short_page_infers_no_more() {
        let mut state = PaginationState::new();
        let applied = state.apply_page(page("me", matches(0..7)), 0, 20);

        assert!(!applied.has_more);
        assert!(!state.has_more());
    }

    #[test]
    fn test_explicit_flags_override_heuristic() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..7));
        resp.has_more = Some(true);
        resp.next_start_index = Some(7);

        let applied = state.apply_page(resp, 0, 20);
        assert!(applied.has_more);
        assert_eq!(applied.next_start_index, 7);

        let mut resp = page("me", matches(7..27));
        resp.has_more = Some(false);
        state.apply_page(resp, 7, 20);
        assert!(!state.has_more());
        assert_eq!(state.next_start_index(), 27);
    }

    #[test]
    fn test_pages_append_in_order_without_duplicates() {
        let mut state = PaginationState::new();
        state.apply_page(page("me", matches(0..3)), 0, 3);
        let applied = state.apply_page(page("me", matches(2..5)), 3, 3);

        assert_eq!(applied.appended, 2);
        assert_eq!(applied.duplicates, 1);
        let ids: Vec<_> = state.matches().iter().map(|m| m.match_id()).collect();
        assert_eq!(ids, vec!["NA1_0", "NA1_1", "NA1_2", "NA1_3", "NA1_4"]);
    }

    #[test]
    fn test_failed_ids_are_reported_once() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..2));
        resp.failed_matches = vec!["NA1_9".to_string()];
        let applied = state.apply_page(resp.clone(), 0, 20);
        assert_eq!(applied.newly_failed, vec!["NA1_9".to_string()]);

        // Same id reported again while pending
        let applied = state.apply_page(resp, 0, 20);
        assert!(applied.newly_failed.is_empty());
        assert_eq!(
            state.resolution("NA1_9"),
            Some(MatchResolution::PendingRetry)
        );
    }

    #[test]
    fn test_retry_success_appends_and_recovers() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..2));
        resp.failed_matches = vec!["NA1_9".to_string()];
        state.apply_page(resp, 0, 20);

        let found = match_for("NA1_9", "me", "Zed", false);
        assert_eq!(
            state.resolve_retry("NA1_9", Some(found)),
            Some(MatchResolution::Recovered)
        );
        assert!(state.failed_match_ids().is_empty());
        assert_eq!(state.len(), 3);
        assert_eq!(state.resolution("NA1_9"), Some(MatchResolution::Recovered));
        assert_eq!(state.resolution("NA1_0"), Some(MatchResolution::Fetched));
    }

    #[test]
    fn test_retry_miss_is_terminal() {
        let mut state = PaginationState::new();
        let mut resp = page("me", vec![]);
        resp.failed_matches = vec!["NA1_9".to_string()];
        state.apply_page(resp.clone(), 0, 20);

        assert_eq!(
            state.resolve_retry("NA1_9", None),
            Some(MatchResolution::Unresolved)
        );
        assert!(state.unresolved_match_ids().contains("NA1_9"));

        // A second outcome for the same id is ignored
        let late = match_for("NA1_9", "me", "Zed", true);
        assert_eq!(state.resolve_retry("NA1_9", Some(late)), None);
        assert!(state.is_empty());

        // Reported again by a later page: no new retry
        let applied = state.apply_page(resp, 20, 20);
        assert!(applied.newly_failed.is_empty());
    }

    #[test]
    fn test_retry_after_is_captured_and_cleared() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..20));
        resp.retry_after = Some(30);
        state.apply_page(resp, 0, 20);
        assert_eq!(state.retry_after_secs(), Some(30));

        state.apply_page(page("me", matches(20..40)), 20, 20);
        assert_eq!(state.retry_after_secs(), None);
    }

    #[test]
    fn test_unknown_id_has_no_resolution() {
        let state = PaginationState::new();
        assert_eq!(state.resolution("NA1_404"), None);
        assert!(state.find("NA1_404").is_none());
    }

    #[test]
    fn test_failed_id_delivered_by_later_page_is_fetched() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..20));
        resp.failed_matches = vec!["NA1_25".to_string()];
        state.apply_page(resp, 0, 20);
        assert_eq!(state.resolution("NA1_25"), Some(MatchResolution::PendingRetry));

        state.apply_page(page("me", matches(20..40)), 20, 20);

        assert!(state.failed_match_ids().is_empty());
        assert_eq!(state.resolution("NA1_25"), Some(MatchResolution::Fetched));

        // The retry that was already scheduled finds nothing pending
        let late = match_for("NA1_25", "me", "Zed", true);
        assert_eq!(state.resolve_retry("NA1_25", Some(late)), None);
        assert_eq!(state.len(), 40);
        assert!(state.recovered_match_ids().is_empty());
    }

    #[test]
    fn test_unreadable_entries_count_toward_full_page() {
        let mut state = PaginationState::new();
        let mut resp = page("me", matches(0..19));
        resp.unreadable_matches = 1;
        resp.failed_matches = vec!["NA1_BAD".to_string()];

        let applied = state.apply_page(resp, 0, 20);

        assert!(applied.has_more);
        assert_eq!(applied.appended, 19);
        assert_eq!(applied.duplicates, 0);
        assert_eq!(applied.newly_failed, vec!["NA1_BAD".to_string()]);
    }
}
