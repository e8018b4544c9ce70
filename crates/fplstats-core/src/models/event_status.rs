use serde::{Deserialize, Serialize};

use super::GameweekId;

/// League tables have been recalculated for the current gameweek.
const LEAGUES_UPDATED: &str = "Updated";

/// Points for a match day are final.
const POINTS_READY: &str = "r";

/// Response of `/event-status/`: per-day processing state of the current gameweek.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStatus {
    #[serde(default)]
    pub status: Vec<EventStatusDay>,
    #[serde(default)]
    pub leagues: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStatusDay {
    #[serde(default)]
    pub bonus_added: bool,
    #[serde(default)]
    pub date: String,
    pub event: GameweekId,
    #[serde(default)]
    pub points: String,
}

impl EventStatus {
    pub fn current_gameweek(&self) -> Option<GameweekId> {
        self.status.iter().map(|d| d.event).max()
    }

    /// Every match day has bonus added and final points, and leagues are updated.
    pub fn is_current_complete(&self) -> bool {
        !self.status.is_empty()
            && self.leagues == LEAGUES_UPDATED
            && self
                .status
                .iter()
                .all(|d| d.bonus_added && d.points == POINTS_READY)
    }

    /// Most recent gameweek whose results are complete; 0 before the season starts.
    pub fn latest_completed_gameweek(&self) -> GameweekId {
        match self.current_gameweek() {
            None => 0,
            Some(current) if self.is_current_complete() => current,
            Some(current) => current.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(days: &[(bool, &str)], leagues: &str) -> EventStatus {
        EventStatus {
            status: days
                .iter()
                .enumerate()
                .map(|(i, (bonus, points))| EventStatusDay {
                    bonus_added: *bonus,
                    date: format!("2023-10-{:02}", 20 + i),
                    event: 9,
                    points: points.to_string(),
                })
                .collect(),
            leagues: leagues.to_string(),
        }
    }

    #[test]
    fn test_completed_gameweek_when_everything_final() {
        let s = status(&[(true, "r"), (true, "r")], "Updated");
        assert_eq!(s.current_gameweek(), Some(9));
        assert_eq!(s.latest_completed_gameweek(), 9);
    }

    #[test]
    fn test_completed_gameweek_while_in_progress() {
        let s = status(&[(true, "r"), (false, "l")], "Updated");
        assert_eq!(s.latest_completed_gameweek(), 8);

        let s = status(&[(true, "r"), (true, "r")], "Updating");
        assert_eq!(s.latest_completed_gameweek(), 8);
    }

    #[test]
    fn test_completed_gameweek_before_season() {
        assert_eq!(EventStatus::default().latest_completed_gameweek(), 0);
    }

    #[test]
    fn test_parse_event_status() {
        let json = r#"{"status": [{"bonus_added": true, "date": "2023-10-21", "event": 9, "points": "r"}], "leagues": "Updated"}"#;
        let parsed: EventStatus = serde_json::from_str(json).expect("Failed to parse event status JSON");
        assert_eq!(parsed.latest_completed_gameweek(), 9);
    }
}
