use std::fmt;

use tracing::debug;

use crate::api::FplSource;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::FplError;
use crate::models::{GameweekId, ManagerId, ManagerPicks, ManagerProfile};

use super::missing_file;

/// An FPL manager followed through the configuration.
#[derive(Debug, Clone)]
pub struct Manager {
    pub id: ManagerId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub profile: Option<ManagerProfile>,
}

impl Manager {
    pub fn new(id: ManagerId) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            nickname: None,
            profile: None,
        }
    }

    /// Resolve the nickname from the configuration and the names from the
    /// remote profile. Profiles are not cached; a failed fetch leaves the
    /// names unresolved.
    pub async fn hydrate<S: FplSource + ?Sized>(
        &mut self,
        config: &Config,
        source: &S,
    ) -> Result<(), FplError> {
        self.nickname = config.manager_nickname(self.id).map(String::from);

        match source.manager_profile(self.id).await {
            Ok(profile) => {
                self.first_name = Some(profile.player_first_name.clone());
                self.last_name = Some(profile.player_last_name.clone());
                self.profile = Some(profile);
            }
            Err(e) => {
                debug!(manager = self.id, error = %e, "Manager profile unavailable");
                self.first_name = None;
                self.last_name = None;
                self.profile = None;
            }
        }
        Ok(())
    }

    /// Picks snapshot for one gameweek from the cached pick history.
    pub fn picks_for_gameweek(
        &self,
        store: &CacheStore,
        gameweek: GameweekId,
    ) -> Result<ManagerPicks, FplError> {
        let history = store.load_manager_picks(self.id)?.ok_or_else(|| {
            let nickname = self.nickname.as_deref().unwrap_or("unknown");
            missing_file(store, &format!("managers/{}_{}.json", nickname, self.id))
        })?;

        history
            .into_iter()
            .find(|p| p.gameweek() == gameweek)
            .ok_or(FplError::GameweekNotInHistory {
                manager: self.id,
                gameweek,
            })
    }

    /// "First Last" when resolved.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        }
    }
}

impl fmt::Display for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.full_name().unwrap_or_else(|| "Unknown manager".to_string());
        match &self.nickname {
            Some(nick) => write!(f, "{} ({}) with ID {}", name, nick, self.id),
            None => write!(f, "{} with ID {}", name, self.id),
        }
    }
}
