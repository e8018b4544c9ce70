use std::fmt;

use crate::cache::CacheStore;
use crate::error::FplError;
use crate::models::TeamId;

use super::missing_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

impl Team {
    pub fn new(id: TeamId) -> Self {
        Self {
            id,
            name: None,
            short_name: None,
        }
    }

    /// Resolve names from the per-team cache file; unresolved if it is absent.
    pub fn hydrate(&mut self, store: &CacheStore) -> Result<(), FplError> {
        match store.load_team(self.id)? {
            Some(info) => {
                self.name = Some(info.name);
                self.short_name = Some(info.short_name);
            }
            None => {
                self.name = None;
                self.short_name = None;
            }
        }
        Ok(())
    }

    /// Look a team up by short name (case-insensitive) in the all-teams file.
    ///
    /// Fails with `MissingCacheFile` when that file has not been synced yet and
    /// with `UnknownTeam` when no team carries the name.
    pub fn from_short_name(store: &CacheStore, short_name: &str) -> Result<Self, FplError> {
        let teams = store
            .load_all_teams()?
            .ok_or_else(|| missing_file(store, "teams/all_teams.json"))?;

        let wanted = short_name.to_uppercase();
        teams
            .into_iter()
            .find(|t| t.short_name == wanted)
            .map(|t| Self {
                id: t.id,
                name: Some(t.name),
                short_name: Some(t.short_name),
            })
            .ok_or_else(|| FplError::UnknownTeam(short_name.to_string()))
    }

    pub fn is_resolved(&self) -> bool {
        self.name.is_some()
    }

    /// Short name if resolved, the numeric id otherwise.
    pub fn label(&self) -> String {
        self.short_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Team {} with ID {}", name, self.id),
            None => write!(f, "Unresolved team with ID {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamInfo;
    use tempfile::TempDir;

    fn info(id: TeamId, name: &str, short: &str) -> TeamInfo {
        TeamInfo {
            id,
            name: name.to_string(),
            short_name: short.to_string(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_hydrate_from_cache() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::open(dir.path()).unwrap();
        store.save_team(&info(6, "Chelsea", "CHE")).unwrap();

        let mut team = Team::new(6);
        assert!(!team.is_resolved());
        team.hydrate(&store).unwrap();
        assert_eq!(team.name.as_deref(), Some("Chelsea"));
        assert_eq!(team.to_string(), "Team Chelsea with ID 6");

        let mut unknown = Team::new(99);
        unknown.hydrate(&store).unwrap();
        assert!(!unknown.is_resolved());
        assert_eq!(unknown.label(), "#99");
    }

    #[test]
    fn test_from_short_name() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::open(dir.path()).unwrap();

        assert!(matches!(
            Team::from_short_name(&store, "ars"),
            Err(FplError::MissingCacheFile(_))
        ));

        store
            .save_all_teams(&[info(1, "Arsenal", "ARS"), info(7, "Crystal Palace", "CRY")])
            .unwrap();

        let team = Team::from_short_name(&store, "cry").unwrap();
        assert_eq!(team.id, 7);
        assert_eq!(team.short_name.as_deref(), Some("CRY"));

        match Team::from_short_name(&store, "XYZ") {
            Err(FplError::UnknownTeam(name)) => assert_eq!(name, "XYZ"),
            other => panic!("expected UnknownTeam, got {:?}", other),
        }
    }
}
