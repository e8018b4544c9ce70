use serde::{Deserialize, Serialize};

use super::{Extra, FixtureId, GameweekId, PlayerId, TeamId};

/// Response of `/element-summary/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSummary {
    #[serde(default)]
    pub fixtures: Vec<PlayerFixture>,
    #[serde(default)]
    pub history: Vec<PlayerHistoryEntry>,
    #[serde(default)]
    pub history_past: Vec<serde_json::Value>,
}

/// An upcoming fixture from a player's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFixture {
    pub id: FixtureId,
    #[serde(default)]
    pub event: Option<GameweekId>,
    #[serde(default)]
    pub team_h: TeamId,
    #[serde(default)]
    pub team_a: TeamId,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default)]
    pub difficulty: u32,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A player's performance in one fixture.
///
/// Advanced metrics (influence, creativity, threat, expected goals, ...) are
/// served as strings and stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistoryEntry {
    pub element: PlayerId,
    #[serde(default)]
    pub fixture: FixtureId,
    #[serde(default)]
    pub opponent_team: TeamId,
    pub round: GameweekId,
    #[serde(default)]
    pub was_home: bool,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub goals_scored: i64,
    #[serde(default)]
    pub assists: i64,
    #[serde(default)]
    pub clean_sheets: i64,
    #[serde(default)]
    pub goals_conceded: i64,
    #[serde(default)]
    pub own_goals: i64,
    #[serde(default)]
    pub penalties_saved: i64,
    #[serde(default)]
    pub penalties_missed: i64,
    #[serde(default)]
    pub yellow_cards: i64,
    #[serde(default)]
    pub red_cards: i64,
    #[serde(default)]
    pub saves: i64,
    #[serde(default)]
    pub bonus: i64,
    #[serde(default)]
    pub bps: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PlayerHistoryEntry {
    pub fn played(&self) -> bool {
        self.minutes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_element_summary() {
        let json = r#"{
            "fixtures": [{"id": 120, "code": 1, "team_h": 3, "team_a": 1, "event": 13, "is_home": false, "difficulty": 2, "kickoff_time": "2023-11-25T15:00:00Z"}],
            "history": [
                {"element": 7, "fixture": 2, "opponent_team": 16, "total_points": 9, "was_home": true, "kickoff_time": "2023-08-12T12:00:00Z", "round": 1, "minutes": 90, "goals_scored": 1, "assists": 1, "clean_sheets": 0, "goals_conceded": 1, "own_goals": 0, "penalties_saved": 0, "penalties_missed": 0, "yellow_cards": 0, "red_cards": 0, "saves": 0, "bonus": 2, "bps": 31, "influence": "45.2", "expected_goals": "0.42"}
            ],
            "history_past": [{"season_name": "2022/23", "total_points": 202}]
        }"#;

        let summary: ElementSummary = serde_json::from_str(json).expect("Failed to parse summary test JSON");
        assert_eq!(summary.fixtures[0].event, Some(13));
        let entry = &summary.history[0];
        assert_eq!(entry.round, 1);
        assert_eq!(entry.total_points, 9);
        assert!(entry.played());
        assert_eq!(entry.extra.get("expected_goals").and_then(|v| v.as_str()), Some("0.42"));
        assert_eq!(summary.history_past.len(), 1);
    }
}
