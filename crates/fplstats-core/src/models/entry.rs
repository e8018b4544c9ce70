use serde::{Deserialize, Serialize};

use super::{EntryHistory, Extra, GameweekId, ManagerId};

/// Response of `/entry/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub id: ManagerId,
    #[serde(default)]
    pub player_first_name: String,
    #[serde(default)]
    pub player_last_name: String,
    /// Squad name chosen by the manager
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary_overall_points: Option<i64>,
    #[serde(default)]
    pub summary_overall_rank: Option<u64>,
    #[serde(default)]
    pub current_event: Option<GameweekId>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `/entry/{id}/history/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerHistory {
    #[serde(default)]
    pub current: Vec<EntryHistory>,
    #[serde(default)]
    pub past: Vec<PastSeason>,
    #[serde(default)]
    pub chips: Vec<ChipUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastSeason {
    pub season_name: String,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub rank: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipUsage {
    pub name: String,
    #[serde(default)]
    pub time: Option<String>,
    pub event: GameweekId,
}

impl ManagerHistory {
    /// Gameweek in which the triple-captain chip was played, if any.
    pub fn triple_captain_gameweek(&self) -> Option<GameweekId> {
        self.chips.iter().find(|c| c.name == "3xc").map(|c| c.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_response() {
        let json = r#"{
            "current": [{"event": 1, "points": 54, "total_points": 54, "rank": 4000000, "overall_rank": 4000000, "bank": 0, "value": 1000, "event_transfers": 0, "event_transfers_cost": 0, "points_on_bench": 6}],
            "past": [{"season_name": "2021/22", "total_points": 2201, "rank": 310000}],
            "chips": [{"name": "wildcard", "time": "2023-09-01T10:00:00Z", "event": 4}, {"name": "3xc", "time": "2023-10-20T10:00:00Z", "event": 9}]
        }"#;

        let history: ManagerHistory = serde_json::from_str(json).expect("Failed to parse history test JSON");
        assert_eq!(history.current.len(), 1);
        assert_eq!(history.past[0].season_name, "2021/22");
        assert_eq!(history.triple_captain_gameweek(), Some(9));
    }
}
