//! Scripted in-memory `FplSource` for tests.
//!
//! Responses are looked up in plain maps; anything not scripted comes back as
//! `FetchError::NotFound`. Every call is recorded by its API path so tests can
//! count remote fetches.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FetchError, FixtureFilter, FplSource, StandingsQuery};
use crate::models::{
    ApiFixture, BootstrapStatic, ElementSummary, EntryHistory, EventInfo, EventStatus,
    EventStatusDay, GameweekId, LeagueId, LeagueStandings, LeagueType, LiveGameweek,
    ManagerHistory, ManagerId, ManagerPicks, ManagerProfile, Pick, PlayerHistoryEntry, PlayerId,
};

#[derive(Default)]
pub(crate) struct MockSource {
    pub bootstrap: Option<BootstrapStatic>,
    pub event_status: Option<EventStatus>,
    pub picks: HashMap<(ManagerId, GameweekId), ManagerPicks>,
    pub summaries: HashMap<PlayerId, ElementSummary>,
    pub live: HashMap<GameweekId, LiveGameweek>,
    pub fixtures: Option<Vec<ApiFixture>>,
    pub standings: HashMap<LeagueId, LeagueStandings>,
    pub profiles: HashMap<ManagerId, ManagerProfile>,
    pub histories: HashMap<ManagerId, ManagerHistory>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    fn record(&self, path: String) -> String {
        self.calls.lock().unwrap().push(path.clone());
        path
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Script an event-status response whose latest completed gameweek is `gameweek`.
    pub fn set_completed_gameweek(&mut self, gameweek: GameweekId) {
        self.event_status = Some(EventStatus {
            status: vec![EventStatusDay {
                bonus_added: true,
                date: "2023-10-21".to_string(),
                event: gameweek,
                points: "r".to_string(),
            }],
            leagues: "Updated".to_string(),
        });
    }
}

fn found<T: Clone>(value: Option<&T>, path: String) -> Result<T, FetchError> {
    value.cloned().ok_or(FetchError::NotFound(path))
}

#[async_trait]
impl FplSource for MockSource {
    async fn bootstrap_static(&self) -> Result<BootstrapStatic, FetchError> {
        let path = self.record("bootstrap-static/".to_string());
        found(self.bootstrap.as_ref(), path)
    }

    async fn event_status(&self) -> Result<EventStatus, FetchError> {
        let path = self.record("event-status/".to_string());
        found(self.event_status.as_ref(), path)
    }

    async fn manager_picks(
        &self,
        manager: ManagerId,
        gameweek: GameweekId,
    ) -> Result<ManagerPicks, FetchError> {
        let path = self.record(format!("entry/{}/event/{}/picks/", manager, gameweek));
        found(self.picks.get(&(manager, gameweek)), path)
    }

    async fn element_summary(&self, player: PlayerId) -> Result<ElementSummary, FetchError> {
        let path = self.record(format!("element-summary/{}/", player));
        found(self.summaries.get(&player), path)
    }

    async fn live_gameweek(&self, gameweek: GameweekId) -> Result<LiveGameweek, FetchError> {
        let path = self.record(format!("event/{}/live/", gameweek));
        found(self.live.get(&gameweek), path)
    }

    async fn fixtures(&self, filter: FixtureFilter) -> Result<Vec<ApiFixture>, FetchError> {
        let path = self.record("fixtures/".to_string());
        let all = found(self.fixtures.as_ref(), path)?;
        Ok(match filter {
            FixtureFilter::All => all,
            FixtureFilter::Gameweek(gw) => all.into_iter().filter(|f| f.event == Some(gw)).collect(),
            FixtureFilter::FutureOnly => all.into_iter().filter(|f| f.started != Some(true)).collect(),
        })
    }

    async fn league_standings(
        &self,
        league: LeagueId,
        league_type: LeagueType,
        _query: StandingsQuery,
    ) -> Result<LeagueStandings, FetchError> {
        let path = self.record(format!("{}/{}/standings/", league_type.endpoint(), league));
        found(self.standings.get(&league), path)
    }

    async fn manager_profile(&self, manager: ManagerId) -> Result<ManagerProfile, FetchError> {
        let path = self.record(format!("entry/{}/", manager));
        found(self.profiles.get(&manager), path)
    }

    async fn manager_history(&self, manager: ManagerId) -> Result<ManagerHistory, FetchError> {
        let path = self.record(format!("entry/{}/history/", manager));
        found(self.histories.get(&manager), path)
    }
}

// ===== Fixture builders =====

pub(crate) fn pick(element: PlayerId, multiplier: u32, is_captain: bool, is_vice_captain: bool) -> Pick {
    Pick {
        element,
        position: 0,
        multiplier,
        is_captain,
        is_vice_captain,
        extra: Default::default(),
    }
}

pub(crate) fn manager_picks(gameweek: GameweekId, picks: Vec<Pick>) -> ManagerPicks {
    let entry_history: EntryHistory =
        serde_json::from_value(serde_json::json!({ "event": gameweek, "points": 50 })).unwrap();
    ManagerPicks {
        active_chip: None,
        automatic_subs: vec![],
        entry_history,
        picks,
        extra: Default::default(),
    }
}

pub(crate) fn history_entry(
    element: PlayerId,
    round: GameweekId,
    minutes: u32,
    total_points: i64,
) -> PlayerHistoryEntry {
    serde_json::from_value(serde_json::json!({
        "element": element,
        "fixture": round,
        "round": round,
        "minutes": minutes,
        "total_points": total_points
    }))
    .unwrap()
}

pub(crate) fn event(id: GameweekId, finished: bool, data_checked: bool) -> EventInfo {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Gameweek {}", id),
        "finished": finished,
        "data_checked": data_checked
    }))
    .unwrap()
}
