use serde::{Deserialize, Serialize};

use super::{Extra, FixtureId, GameweekId, PlayerId, TeamId};

/// One entry of the `/fixtures/` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFixture {
    pub id: FixtureId,
    #[serde(default)]
    pub event: Option<GameweekId>,
    pub team_h: TeamId,
    pub team_a: TeamId,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    #[serde(default)]
    pub started: Option<bool>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub finished_provisional: bool,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub team_h_difficulty: Option<u32>,
    #[serde(default)]
    pub team_a_difficulty: Option<u32>,
    #[serde(default)]
    pub stats: Vec<FixtureStat>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A named stat event (`goals_scored`, `assists`, `bps`, ...) split by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureStat {
    pub identifier: String,
    #[serde(default)]
    pub a: Vec<StatEntry>,
    #[serde(default)]
    pub h: Vec<StatEntry>,
}

impl FixtureStat {
    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.h.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub value: i64,
    pub element: PlayerId,
}
