use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::cache::{CacheStore, EntityKind};
use crate::error::FplError;
use crate::models::{BootstrapStatic, FixtureId, StatEntry};

use super::{Player, Team};

/// Stat identifiers resolved into `FixtureEvent`s.
pub const FIXTURE_STATS: [&str; 10] = [
    "goals_scored",
    "assists",
    "own_goals",
    "penalties_saved",
    "penalties_missed",
    "yellow_cards",
    "red_cards",
    "saves",
    "bonus",
    "bps",
];

/// One player's contribution to a stat event.
#[derive(Debug, Clone, PartialEq)]
pub struct StatEvent {
    pub value: i64,
    pub player: Player,
}

/// A stat event of a fixture with every player resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureEvent {
    pub identifier: String,
    pub home: Vec<StatEvent>,
    pub away: Vec<StatEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub started: Option<bool>,
    pub finished: Option<bool>,
    pub team_h_difficulty: Option<u32>,
    pub team_a_difficulty: Option<u32>,
    /// Non-empty stat events keyed by identifier
    pub events: BTreeMap<String, FixtureEvent>,
}

impl Fixture {
    pub fn new(id: FixtureId) -> Self {
        Self {
            id,
            home_team: None,
            away_team: None,
            home_score: None,
            away_score: None,
            started: None,
            finished: None,
            team_h_difficulty: None,
            team_a_difficulty: None,
            events: BTreeMap::new(),
        }
    }

    /// Load the cached fixture, resolving both teams and every player named in
    /// its stat events. Resolving players needs the bootstrap snapshot.
    pub fn hydrate(&mut self, store: &CacheStore) -> Result<(), FplError> {
        let Some(fixture) = store.load_fixture(self.id)? else {
            *self = Self::new(self.id);
            return Ok(());
        };

        let mut home = Team::new(fixture.team_h);
        home.hydrate(store)?;
        let mut away = Team::new(fixture.team_a);
        away.hydrate(store)?;
        for team in [&home, &away].into_iter().filter(|t| !t.is_resolved()) {
            debug!(fixture = self.id, team = team.id, "Fixture team not in the cached team list");
        }

        let stats: Vec<_> = fixture
            .stats
            .iter()
            .filter(|s| !s.is_empty() && FIXTURE_STATS.contains(&s.identifier.as_str()))
            .collect();

        let mut events = BTreeMap::new();
        if !stats.is_empty() {
            let bootstrap = store.load_bootstrap()?.ok_or_else(|| {
                FplError::MissingCacheFile(store.expected_path(EntityKind::Bootstrap).display().to_string())
            })?;
            for stat in stats {
                events.insert(
                    stat.identifier.clone(),
                    FixtureEvent {
                        identifier: stat.identifier.clone(),
                        home: resolve_entries(&stat.h, &bootstrap),
                        away: resolve_entries(&stat.a, &bootstrap),
                    },
                );
            }
        }

        self.home_team = Some(home);
        self.away_team = Some(away);
        self.home_score = fixture.team_h_score;
        self.away_score = fixture.team_a_score;
        self.started = fixture.started;
        self.finished = Some(fixture.finished);
        self.team_h_difficulty = fixture.team_h_difficulty;
        self.team_a_difficulty = fixture.team_a_difficulty;
        self.events = events;
        Ok(())
    }

    pub fn event(&self, identifier: &str) -> Option<&FixtureEvent> {
        self.events.get(identifier)
    }

    pub fn goals_scored(&self) -> Option<&FixtureEvent> {
        self.event("goals_scored")
    }

    pub fn assists(&self) -> Option<&FixtureEvent> {
        self.event("assists")
    }

    pub fn bonus(&self) -> Option<&FixtureEvent> {
        self.event("bonus")
    }

    pub fn score(&self) -> (Option<u32>, Option<u32>) {
        (self.home_score, self.away_score)
    }
}

fn resolve_entries(entries: &[StatEntry], bootstrap: &BootstrapStatic) -> Vec<StatEvent> {
    entries
        .iter()
        .map(|entry| {
            let mut player = Player::new(entry.element);
            player.hydrate_from(bootstrap);
            StatEvent {
                value: entry.value,
                player,
            }
        })
        .collect()
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(home), Some(away)) = (&self.home_team, &self.away_team) else {
            return write!(f, "Fixture with ID {}: No teams found", self.id);
        };
        match (self.finished, self.home_score, self.away_score) {
            (Some(true), Some(h), Some(a)) => write!(
                f,
                "Fixture with ID {}: {}-{}: {}-{}",
                self.id,
                home.label(),
                away.label(),
                h,
                a
            ),
            _ => write!(
                f,
                "Fixture with ID {}: {} - {}: Not finished yet",
                self.id,
                home.label(),
                away.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiFixture, TeamInfo};
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> CacheStore {
        let mut store = CacheStore::open(dir.path()).unwrap();
        let bootstrap: BootstrapStatic = serde_json::from_value(serde_json::json!({
            "events": [],
            "teams": [],
            "elements": [
                {"id": 355, "first_name": "Erling", "second_name": "Haaland", "web_name": "Haaland", "team": 13},
                {"id": 349, "first_name": "Kevin", "second_name": "De Bruyne", "web_name": "De Bruyne", "team": 13}
            ]
        }))
        .unwrap();
        store.save_bootstrap(&bootstrap).unwrap();
        for (id, name, short) in [(13, "Man City", "MCI"), (4, "Brentford", "BRE")] {
            store
                .save_team(&TeamInfo {
                    id,
                    name: name.to_string(),
                    short_name: short.to_string(),
                    extra: Default::default(),
                })
                .unwrap();
        }
        store
    }

    fn finished_fixture() -> ApiFixture {
        serde_json::from_value(serde_json::json!({
            "id": 120, "event": 12, "team_h": 13, "team_a": 4,
            "team_h_score": 1, "team_a_score": 0,
            "started": true, "finished": true,
            "team_h_difficulty": 3, "team_a_difficulty": 5,
            "stats": [
                {"identifier": "goals_scored", "a": [], "h": [{"value": 1, "element": 355}]},
                {"identifier": "assists", "a": [], "h": [{"value": 1, "element": 349}]},
                {"identifier": "own_goals", "a": [], "h": []}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_hydrate_resolves_scorers_into_players() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded_store(&dir);
        store.save_fixture(&finished_fixture()).unwrap();

        let mut fixture = Fixture::new(120);
        fixture.hydrate(&store).unwrap();

        let goals = fixture.goals_scored().expect("goals_scored event");
        assert!(goals.away.is_empty());
        assert_eq!(goals.home.len(), 1);
        assert_eq!(goals.home[0].player.web_name.as_deref(), Some("Haaland"));
        assert_eq!(goals.home[0].player.first_name.as_deref(), Some("Erling"));
        assert_eq!(fixture.assists().map(|e| e.home[0].player.id), Some(349));

        // Events with no entries on either side are dropped
        assert!(fixture.event("own_goals").is_none());

        assert_eq!(fixture.score(), (Some(1), Some(0)));
        assert_eq!(fixture.to_string(), "Fixture with ID 120: MCI-BRE: 1-0");
    }

    #[test]
    fn test_unknown_team_id_stays_unresolved() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded_store(&dir);
        let fixture: ApiFixture = serde_json::from_value(serde_json::json!({
            "id": 121, "event": 12, "team_h": 13, "team_a": 99,
            "team_h_score": 2, "team_a_score": 0,
            "started": true, "finished": true
        }))
        .unwrap();
        store.save_fixture(&fixture).unwrap();

        let mut fixture = Fixture::new(121);
        fixture.hydrate(&store).unwrap();

        let away = fixture.away_team.as_ref().unwrap();
        assert_eq!(away.id, 99);
        assert!(!away.is_resolved());
        assert!(fixture.home_team.as_ref().unwrap().is_resolved());
        assert_eq!(fixture.to_string(), "Fixture with ID 121: MCI-#99: 2-0");
    }

    #[test]
    fn test_uncached_fixture_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let mut fixture = Fixture::new(7);
        fixture.hydrate(&store).unwrap();
        assert!(fixture.home_team.is_none());
        assert!(fixture.finished.is_none());
        assert_eq!(fixture.to_string(), "Fixture with ID 7: No teams found");
    }

    #[test]
    fn test_in_progress_display() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded_store(&dir);
        let mut live = finished_fixture();
        live.finished = false;
        store.save_fixture(&live).unwrap();

        let mut fixture = Fixture::new(120);
        fixture.hydrate(&store).unwrap();
        assert_eq!(fixture.to_string(), "Fixture with ID 120: MCI - BRE: Not finished yet");
    }
}
