//! # Match History
//!
//! Match-history aggregation for a team-based online game, sourced through a
//! backend proxy.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (matches, participants, ranks, wire shapes)
//! - **calculate**: Per-match views, team rosters, summaries, rank selection
//! - **fetch**: Proxy client behind the `MatchSource` trait
//! - **session**: Search session state machine (pagination, load-more guard, single-shot retries)
//! - **assets**: Process-wide asset version and champion-name normalization
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod assets;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod session;

pub use models::*;
