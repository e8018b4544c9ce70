use std::fmt;

use tracing::debug;

use crate::api::FplSource;
use crate::cache::CacheStore;
use crate::error::FplError;
use crate::models::{EventInfo, GameweekId, LiveGameweek, LiveStats, PlayerId, GAMEWEEKS_PER_SEASON};

/// One gameweek: schedule flags plus live per-player stats.
#[derive(Debug, Clone)]
pub struct Gameweek {
    pub id: GameweekId,
    pub general: Option<EventInfo>,
    pub live: Option<LiveGameweek>,
}

impl Gameweek {
    pub fn new(id: GameweekId) -> Self {
        Self {
            id,
            general: None,
            live: None,
        }
    }

    /// Load general properties from the cache, and live stats from the cache
    /// with a remote fallback for gameweeks that are not settled yet.
    pub async fn hydrate<S: FplSource + ?Sized>(
        &mut self,
        store: &CacheStore,
        source: &S,
    ) -> Result<(), FplError> {
        if !(1..=GAMEWEEKS_PER_SEASON).contains(&self.id) {
            return Err(FplError::InvalidGameweek(self.id));
        }

        let id = self.id;
        self.general = store.load_gameweek_general(id)?;
        self.live = match store.load_gameweek_live(id)? {
            Some(live) => Some(live),
            None => source
                .live_gameweek(id)
                .await
                .inspect_err(|e| debug!(gameweek = id, error = %e, "Live stats unavailable"))
                .ok(),
        };
        Ok(())
    }

    pub fn finished(&self) -> Option<bool> {
        self.general.as_ref().map(|g| g.finished)
    }

    pub fn data_checked(&self) -> Option<bool> {
        self.general.as_ref().map(|g| g.data_checked)
    }

    pub fn player_stats(&self, player: PlayerId) -> Option<&LiveStats> {
        self.live.as_ref()?.stats_for(player)
    }

    /// Players by live total points, best first.
    pub fn top_scorers(&self, limit: usize) -> Vec<(PlayerId, i64)> {
        let mut scores: Vec<_> = self
            .live
            .iter()
            .flat_map(|l| l.elements.iter())
            .map(|e| (e.id, e.stats.total_points))
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scores.truncate(limit);
        scores
    }
}

impl fmt::Display for Gameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gameweek {}", self.id)
    }
}
