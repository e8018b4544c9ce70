use serde::{Deserialize, Serialize};

use super::{Extra, GameweekId, PlayerId};

/// Response of `/entry/{id}/event/{gw}/picks/`: one manager's squad for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerPicks {
    #[serde(default)]
    pub active_chip: Option<String>,
    #[serde(default)]
    pub automatic_subs: Vec<serde_json::Value>,
    pub entry_history: EntryHistory,
    #[serde(default)]
    pub picks: Vec<Pick>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ManagerPicks {
    pub fn gameweek(&self) -> GameweekId {
        self.entry_history.event
    }

    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_vice_captain)
    }
}

/// A manager's score summary for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryHistory {
    pub event: GameweekId,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub overall_rank: Option<u64>,
    #[serde(default)]
    pub bank: i64,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub event_transfers: u32,
    #[serde(default)]
    pub event_transfers_cost: i64,
    #[serde(default)]
    pub points_on_bench: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One squad slot.
///
/// `multiplier` is 0 for benched players, 1 for starters, 2 for the playing
/// captain and 3 when the triple-captain chip is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub element: PlayerId,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub multiplier: u32,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_picks_response() {
        let json = r#"{
            "active_chip": "3xc",
            "automatic_subs": [],
            "entry_history": {"event": 5, "points": 71, "total_points": 320, "rank": 120000, "overall_rank": 450000, "bank": 5, "value": 1012, "event_transfers": 1, "event_transfers_cost": 0, "points_on_bench": 4},
            "picks": [
                {"element": 10, "position": 1, "multiplier": 1, "is_captain": false, "is_vice_captain": false},
                {"element": 11, "position": 2, "multiplier": 3, "is_captain": true, "is_vice_captain": false},
                {"element": 12, "position": 3, "multiplier": 1, "is_captain": false, "is_vice_captain": true}
            ]
        }"#;

        let picks: ManagerPicks = serde_json::from_str(json).expect("Failed to parse picks test JSON");
        assert_eq!(picks.gameweek(), 5);
        assert_eq!(picks.active_chip.as_deref(), Some("3xc"));
        assert_eq!(picks.captain().map(|p| p.element), Some(11));
        assert_eq!(picks.vice_captain().map(|p| p.element), Some(12));
        assert_eq!(picks.entry_history.overall_rank, Some(450000));
    }

    #[test]
    fn test_pick_keeps_unknown_fields() {
        let json = serde_json::json!({
            "active_chip": null,
            "entry_history": {"event": 1, "points": 60},
            "picks": [
                {"element": 7, "position": 1, "multiplier": 2, "is_captain": true, "is_vice_captain": false,
                 "element_type": 3, "selling_price": 85}
            ]
        });

        let picks: ManagerPicks = serde_json::from_value(json).unwrap();
        assert_eq!(picks.picks[0].extra.get("selling_price"), Some(&serde_json::json!(85)));

        let back = serde_json::to_value(&picks).unwrap();
        assert_eq!(back["picks"][0]["element_type"], 3);
        assert_eq!(back["picks"][0]["selling_price"], 85);
        assert_eq!(back["picks"][0]["multiplier"], 2);
    }
}
