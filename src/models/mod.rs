//! Core data models for match history.

mod ids;
mod match_data;
mod queue;
mod rank;
mod riot_id;
mod stats;
mod wire;

#[cfg(test)]
pub(crate) mod fixtures;

pub use ids::*;
pub use match_data::*;
pub use queue::*;
pub use rank::*;
pub use riot_id::*;
pub use stats::*;
pub use wire::*;
