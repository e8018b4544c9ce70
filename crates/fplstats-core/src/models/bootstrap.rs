use serde::{Deserialize, Serialize};

use super::{Extra, GameweekId, PlayerId, TeamId, GAMEWEEKS_PER_SEASON};

/// Response of `/bootstrap-static/`: the season-wide reference data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapStatic {
    #[serde(default)]
    pub events: Vec<EventInfo>,
    #[serde(default)]
    pub teams: Vec<TeamInfo>,
    #[serde(default)]
    pub elements: Vec<ElementInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Scheduling flags of one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub id: GameweekId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub data_checked: bool,
    #[serde(default)]
    pub is_previous: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

impl EventInfo {
    /// A gameweek whose results are final and will not be revised.
    pub fn is_settled(&self) -> bool {
        self.finished && self.data_checked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub id: PlayerId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub web_name: String,
    #[serde(default)]
    pub team: TeamId,
    #[serde(default)]
    pub element_type: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

impl BootstrapStatic {
    pub fn player(&self, id: PlayerId) -> Option<&ElementInfo> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn player_web_name(&self, id: PlayerId) -> Option<&str> {
        self.player(id).map(|e| e.web_name.as_str())
    }

    /// Look up a player id by exact web name.
    pub fn player_id_by_web_name(&self, web_name: &str) -> Option<PlayerId> {
        self.elements
            .iter()
            .find(|e| e.web_name == web_name)
            .map(|e| e.id)
    }

    /// Players whose web name or surname contains `query`, ignoring case.
    pub fn search_players(&self, query: &str) -> Vec<&ElementInfo> {
        let needle = query.to_uppercase();
        self.elements
            .iter()
            .filter(|e| {
                e.web_name.to_uppercase().contains(&needle)
                    || e.second_name.to_uppercase().contains(&needle)
            })
            .collect()
    }

    pub fn team(&self, id: TeamId) -> Option<&TeamInfo> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn current_gameweek(&self) -> Option<GameweekId> {
        self.events.iter().find(|e| e.is_current).map(|e| e.id)
    }

    /// Highest gameweek that is both finished and data-checked.
    pub fn last_settled_gameweek(&self) -> Option<GameweekId> {
        self.events
            .iter()
            .filter(|e| e.is_settled())
            .map(|e| e.id)
            .max()
    }

    /// Season identifier, taken from the year of the final gameweek's deadline.
    pub fn season_year(&self) -> Option<String> {
        self.events
            .iter()
            .find(|e| e.id == GAMEWEEKS_PER_SEASON)
            .and_then(|e| e.deadline_time.as_deref())
            .and_then(|d| d.get(..4))
            .map(str::to_string)
    }
}
