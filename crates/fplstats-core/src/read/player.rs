use std::fmt;

use crate::cache::{CacheStore, EntityKind};
use crate::error::FplError;
use crate::models::{BootstrapStatic, PlayerHistoryEntry, PlayerId};

use super::missing_file;

/// A Premier League player, named from the season's bootstrap list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub web_name: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            first_name: None,
            second_name: None,
            web_name: None,
        }
    }

    /// Resolve names from the cached bootstrap snapshot.
    ///
    /// The bootstrap file is required; a player missing from it stays unresolved.
    pub fn hydrate(&mut self, store: &CacheStore) -> Result<(), FplError> {
        let bootstrap = store.load_bootstrap()?.ok_or_else(|| {
            FplError::MissingCacheFile(store.expected_path(EntityKind::Bootstrap).display().to_string())
        })?;
        self.hydrate_from(&bootstrap);
        Ok(())
    }

    /// Resolve names from an already-loaded bootstrap snapshot.
    pub fn hydrate_from(&mut self, bootstrap: &BootstrapStatic) {
        let element = bootstrap.player(self.id);
        self.first_name = element.map(|e| e.first_name.clone());
        self.second_name = element.map(|e| e.second_name.clone());
        self.web_name = element.map(|e| e.web_name.clone());
    }

    pub fn is_resolved(&self) -> bool {
        self.web_name.is_some()
    }

    /// Cached per-gameweek history.
    pub fn history(&self, store: &CacheStore) -> Result<Vec<PlayerHistoryEntry>, FplError> {
        let web_name = self
            .web_name
            .as_deref()
            .ok_or(FplError::UnresolvedPlayer(self.id))?;
        store
            .load_player_history(self.id)?
            .ok_or_else(|| missing_file(store, &format!("players/{}_{}.json", self.id, web_name)))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.web_name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "Player #{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bootstrap() -> BootstrapStatic {
        serde_json::from_value(serde_json::json!({
            "events": [],
            "teams": [],
            "elements": [
                {"id": 233, "first_name": "Mohamed", "second_name": "Salah", "web_name": "M.Salah", "team": 12, "element_type": 3}
            ]
        }))
        .unwrap()
    }

    fn history_entry(round: u32, points: i64) -> PlayerHistoryEntry {
        serde_json::from_value(serde_json::json!({
            "element": 233, "fixture": round * 10, "opponent_team": 1, "round": round,
            "was_home": true, "minutes": 90, "total_points": points
        }))
        .unwrap()
    }

    #[test]
    fn test_hydrate_requires_bootstrap() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();
        let mut player = Player::new(233);
        assert!(matches!(player.hydrate(&store), Err(FplError::MissingCacheFile(_))));
    }

    #[test]
    fn test_hydrate_and_history() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::open(dir.path()).unwrap();
        store.save_bootstrap(&bootstrap()).unwrap();

        let mut player = Player::new(233);
        player.hydrate(&store).unwrap();
        assert_eq!(player.web_name.as_deref(), Some("M.Salah"));
        assert_eq!(player.second_name.as_deref(), Some("Salah"));

        // History not synced yet
        assert!(matches!(player.history(&store), Err(FplError::MissingCacheFile(_))));

        store
            .save_player_history(233, "M.Salah", &[history_entry(1, 8), history_entry(2, 13)])
            .unwrap();
        let history = player.history(&store).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].total_points, 13);
    }

    #[test]
    fn test_unknown_player_is_unresolved() {
        let mut player = Player::new(1);
        player.hydrate_from(&bootstrap());
        assert!(!player.is_resolved());
        assert_eq!(player.to_string(), "Player #1");

        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();
        assert!(matches!(player.history(&store), Err(FplError::UnresolvedPlayer(1))));
    }
}
