use std::fmt;

use tracing::debug;

use crate::api::{FplSource, StandingsQuery};
use crate::error::FplError;
use crate::models::{LeagueId, LeagueStandings, LeagueType, StandingEntry};

/// A classic or head-to-head league. Standings are always fetched fresh.
#[derive(Debug, Clone)]
pub struct League {
    pub id: LeagueId,
    league_type: LeagueType,
    pub name: Option<String>,
    pub standings: Option<LeagueStandings>,
}

impl League {
    pub fn new(id: LeagueId, league_type: LeagueType) -> Self {
        Self {
            id,
            league_type,
            name: None,
            standings: None,
        }
    }

    /// Build from a type name, rejecting anything but `CLASSIC` and `H2H`.
    pub fn with_type_name(id: LeagueId, league_type: &str) -> Result<Self, FplError> {
        Ok(Self::new(id, league_type.parse()?))
    }

    pub fn league_type(&self) -> LeagueType {
        self.league_type
    }

    /// Change the league type; an invalid name leaves the current type in place.
    pub fn set_league_type(&mut self, league_type: &str) -> Result<(), FplError> {
        self.league_type = league_type.parse()?;
        Ok(())
    }

    pub async fn hydrate<S: FplSource + ?Sized>(
        &mut self,
        source: &S,
        query: StandingsQuery,
    ) -> Result<(), FplError> {
        match source.league_standings(self.id, self.league_type, query).await {
            Ok(standings) => {
                self.name = Some(standings.league.name.clone());
                self.standings = Some(standings);
            }
            Err(e) => {
                debug!(league = self.id, error = %e, "League standings unavailable");
                self.name = None;
                self.standings = None;
            }
        }
        Ok(())
    }

    /// Ranked entries of the loaded standings page.
    pub fn entries(&self) -> &[StandingEntry] {
        self.standings
            .as_ref()
            .map(|s| s.standings.results.as_slice())
            .unwrap_or_default()
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "League {} with ID {}", name, self.id),
            None => write!(f, "Unresolved {} league with ID {}", self.league_type, self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockSource;

    fn standings() -> LeagueStandings {
        serde_json::from_value(serde_json::json!({
            "league": {"id": 314, "name": "Office League"},
            "standings": {
                "has_next": false,
                "page": 1,
                "results": [
                    {"entry": 1986671, "entry_name": "Erwin's XI", "player_name": "Erwin Visser", "rank": 1, "last_rank": 2, "total": 640, "event_total": 71},
                    {"entry": 435872, "entry_name": "Arthur FC", "player_name": "Arthur Jansen", "rank": 2, "last_rank": 1, "total": 633, "event_total": 48}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_invalid_type_is_rejected() {
        assert!(matches!(
            League::with_type_name(314, "KNOCKOUT"),
            Err(FplError::InvalidLeagueType { .. })
        ));

        let mut league = League::with_type_name(314, "H2H").unwrap();
        assert!(league.set_league_type("classic").is_err());
        assert_eq!(league.league_type(), LeagueType::HeadToHead);
        league.set_league_type("CLASSIC").unwrap();
        assert_eq!(league.league_type(), LeagueType::Classic);
    }

    #[tokio::test]
    async fn test_hydrate_fetches_standings() {
        let mut source = MockSource::default();
        source.standings.insert(314, standings());

        let mut league = League::new(314, LeagueType::Classic);
        league.hydrate(&source, StandingsQuery::default()).await.unwrap();
        assert_eq!(league.name.as_deref(), Some("Office League"));
        assert_eq!(league.entries().len(), 2);
        assert_eq!(league.entries()[0].entry, 1986671);
        assert_eq!(source.calls(), vec!["leagues-classic/314/standings/".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_unresolved() {
        let source = MockSource::default();
        let mut league = League::new(9, LeagueType::HeadToHead);
        league.hydrate(&source, StandingsQuery::default()).await.unwrap();
        assert!(league.name.is_none());
        assert!(league.entries().is_empty());
        assert_eq!(league.to_string(), "Unresolved H2H league with ID 9");
    }
}
