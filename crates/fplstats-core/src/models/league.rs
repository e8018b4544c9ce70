use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Extra, LeagueId, ManagerId};
use crate::error::FplError;

/// Scoring format of an FPL league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueType {
    #[serde(rename = "CLASSIC")]
    Classic,
    #[serde(rename = "H2H")]
    HeadToHead,
}

impl LeagueType {
    pub const ALL: [LeagueType; 2] = [LeagueType::Classic, LeagueType::HeadToHead];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeagueType::Classic => "CLASSIC",
            LeagueType::HeadToHead => "H2H",
        }
    }

    /// Path segment of the standings endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LeagueType::Classic => "leagues-classic",
            LeagueType::HeadToHead => "leagues-h2h",
        }
    }
}

impl fmt::Display for LeagueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeagueType {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeagueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FplError::InvalidLeagueType {
                given: s.to_string(),
                allowed: LeagueType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", "),
            })
    }
}

/// Response of `/leagues-classic/{id}/standings/` and `/leagues-h2h/{id}/standings/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueStandings {
    pub league: LeagueInfo,
    #[serde(default)]
    pub standings: StandingsTable,
    #[serde(default)]
    pub new_entries: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: LeagueId,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingsTable {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<StandingEntry>,
}

/// One ranked manager. Head-to-head tables add match counts, which stay in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingEntry {
    pub entry: ManagerId,
    #[serde(default)]
    pub entry_name: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub last_rank: u32,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub event_total: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_type_parsing() {
        assert_eq!("CLASSIC".parse::<LeagueType>().unwrap(), LeagueType::Classic);
        assert_eq!("H2H".parse::<LeagueType>().unwrap(), LeagueType::HeadToHead);

        match "KNOCKOUT".parse::<LeagueType>() {
            Err(FplError::InvalidLeagueType { given, allowed }) => {
                assert_eq!(given, "KNOCKOUT");
                assert_eq!(allowed, "CLASSIC, H2H");
            }
            other => panic!("expected InvalidLeagueType, got {other:?}"),
        }
        // Not coerced
        assert!("classic".parse::<LeagueType>().is_err());
    }

    #[test]
    fn test_parse_classic_standings() {
        let json = r#"{
            "new_entries": {"has_next": false, "page": 1, "results": []},
            "last_updated_data": "2023-10-22T20:00:00Z",
            "league": {"id": 314, "name": "Office League", "created": "2023-07-01T10:00:00Z"},
            "standings": {"has_next": true, "page": 1, "results": [
                {"id": 1, "event_total": 71, "player_name": "Erwin D", "rank": 1, "last_rank": 2, "rank_sort": 1, "total": 640, "entry": 1986671, "entry_name": "Kane Train"}
            ]}
        }"#;

        let standings: LeagueStandings = serde_json::from_str(json).expect("Failed to parse standings test JSON");
        assert_eq!(standings.league.name, "Office League");
        assert!(standings.standings.has_next);
        assert_eq!(standings.standings.results[0].entry, 1986671);
        assert_eq!(standings.standings.results[0].total, 640);
    }
}
