//! Guard predicate for "load more" invocations.
//!
//! Lives inside a session's state, so throttling never bleeds between sessions.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

/// Fixed client-side throttle between accepted "load more" invocations.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(3000);

/// Why a "load more" invocation was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LoadMoreRejection {
    #[error("No active search")]
    NoActiveSearch,

    #[error("A fetch is already in flight")]
    InFlight,

    #[error("No more matches to load")]
    NoMoreMatches,

    #[error("Rate limited, wait {remaining_secs}s")]
    CoolingDown {
        #[serde(rename = "remainingSecs")]
        remaining_secs: u64,
    },

    #[error("Too soon after the last request ({remaining_ms}ms)")]
    Debounced {
        #[serde(rename = "remainingMs")]
        remaining_ms: u64,
    },
}

#[derive(Debug, Clone)]
pub struct LoadMoreGate {
    debounce: Duration,
    last_accepted: Option<Instant>,
    cooldown_until: Option<Instant>,
}

impl Default for LoadMoreGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl LoadMoreGate {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_accepted: None,
            cooldown_until: None,
        }
    }

    /// Evaluate the guard. Checks run in order: in-flight, exhausted, cooldown, debounce.
    pub fn check(&self, now: Instant, in_flight: bool, has_more: bool) -> Result<(), LoadMoreRejection> {
        if in_flight {
            return Err(LoadMoreRejection::InFlight);
        }
        if !has_more {
            return Err(LoadMoreRejection::NoMoreMatches);
        }
        if let Some(remaining) = self.remaining_cooldown(now) {
            return Err(LoadMoreRejection::CoolingDown {
                remaining_secs: ceil_secs(remaining),
            });
        }
        if let Some(last) = self.last_accepted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.debounce {
                return Err(LoadMoreRejection::Debounced {
                    remaining_ms: (self.debounce - elapsed).as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Record an accepted invocation.
    pub fn accept(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }

    /// Block invocations for `secs` seconds from `now`.
    pub fn start_cooldown(&mut self, now: Instant, secs: u64) {
        if secs == 0 {
            return;
        }
        let until = now + Duration::from_secs(secs);
        // Never shorten an active cooldown
        if self.cooldown_until.map_or(true, |current| until > current) {
            self.cooldown_until = Some(until);
        }
    }

    pub fn remaining_cooldown(&self, now: Instant) -> Option<Duration> {
        self.cooldown_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    /// Countdown shown next to a disabled control, in whole seconds.
    pub fn retry_after_secs(&self, now: Instant) -> Option<u64> {
        self.remaining_cooldown(now).map(ceil_secs)
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
