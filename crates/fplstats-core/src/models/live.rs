use serde::{Deserialize, Serialize};

use super::{Extra, PlayerId};

/// Response of `/event/{gw}/live/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveGameweek {
    #[serde(default)]
    pub elements: Vec<LiveElement>,
}

impl LiveGameweek {
    pub fn stats_for(&self, player: PlayerId) -> Option<&LiveStats> {
        self.elements
            .iter()
            .find(|e| e.id == player)
            .map(|e| &e.stats)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveElement {
    pub id: PlayerId,
    pub stats: LiveStats,
    #[serde(default)]
    pub explain: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub bonus: i64,
    #[serde(default)]
    pub bps: i64,
    #[serde(default)]
    pub in_dreamteam: bool,
    #[serde(flatten)]
    pub extra: Extra,
}
