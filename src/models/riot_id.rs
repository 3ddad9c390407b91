//! Riot ID ("name#tag") parsing.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static RIOT_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn riot_id_pattern() -> &'static Regex {
    RIOT_ID_PATTERN.get_or_init(|| Regex::new(r"^(.+?)\s*#(.+)$").expect("valid Riot ID pattern"))
}

/// Search text that is not a valid Riot ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiotIdError {
    #[error("expected \"name#tag\", got {0:?}")]
    MissingSeparator(String),

    #[error("game name is empty")]
    EmptyGameName,

    #[error("tagline is empty")]
    EmptyTagline,
}

/// A player's public identity: game name plus tagline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotId {
    pub game_name: String,
    /// Always upper-case
    pub tagline: String,
}

impl RiotId {
    /// Build from separate parts, applying the same normalization as `parse`.
    pub fn new(game_name: &str, tagline: &str) -> Result<Self, RiotIdError> {
        let game_name = game_name.trim();
        let tagline = tagline.trim().trim_start_matches('#').trim();

        if game_name.is_empty() {
            return Err(RiotIdError::EmptyGameName);
        }
        if tagline.is_empty() {
            return Err(RiotIdError::EmptyTagline);
        }

        Ok(Self {
            game_name: game_name.to_string(),
            tagline: tagline.to_uppercase(),
        })
    }

    /// Parse search text of the form `"God of Wind#na1"` or `"God of Wind #NA1"`.
    pub fn parse(input: &str) -> Result<Self, RiotIdError> {
        let trimmed = input.trim();
        let caps = riot_id_pattern()
            .captures(trimmed)
            .ok_or_else(|| RiotIdError::MissingSeparator(trimmed.to_string()))?;

        Self::new(&caps[1], &caps[2])
    }
}

impl std::fmt::Display for RiotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tagline)
    }
}

impl std::str::FromStr for RiotId {
    type Err = RiotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases_tagline() {
        let id = RiotId::parse("God of Wind#na1").unwrap();
        assert_eq!(id.game_name, "God of Wind");
        assert_eq!(id.tagline, "NA1");

        let id = RiotId::parse("God of Wind#NA1").unwrap();
        assert_eq!(id.tagline, "NA1");
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let id = RiotId::parse("  God of Wind  #  euw  ").unwrap();
        assert_eq!(id.game_name, "God of Wind");
        assert_eq!(id.tagline, "EUW");
        assert_eq!(id.to_string(), "God of Wind#EUW");
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            RiotId::parse("God of Wind"),
            Err(RiotIdError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(RiotId::parse("#NA1").is_err());
        assert!(RiotId::parse("Name#   ").is_err());
        assert_eq!(RiotId::new("Name", " # "), Err(RiotIdError::EmptyTagline));
        assert_eq!(RiotId::new("  ", "NA1"), Err(RiotIdError::EmptyGameName));
    }

    #[test]
    fn test_from_str() {
        let id: RiotId = "Faker#KR1".parse().unwrap();
        assert_eq!(id.tagline, "KR1");
    }
}
