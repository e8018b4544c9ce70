//! Derived statistics over cached and remote FPL data.
//!
//! Everything here works on cached data through the read models, apart from
//! `extra_captaincy_points_remote`, which asks an `FplSource` instead.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use tracing::warn;

use crate::api::{FetchError, FplSource};
use crate::cache::CacheStore;
use crate::error::FplError;
use crate::models::{
    BootstrapStatic, GameweekId, ManagerId, ManagerPicks, Pick, PlayerHistoryEntry, PlayerId,
};
use crate::read::{Manager, Player};

/// Multiplier of a captain who played normally.
const CAPTAIN_MULTIPLIER: u32 = 2;

/// Multiplier under the triple-captain chip.
const TRIPLE_CAPTAIN_MULTIPLIER: u32 = 3;

/// Numeric per-gameweek statistics a rate can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    TotalPoints,
    GoalsScored,
    Assists,
    CleanSheets,
    GoalsConceded,
    Saves,
    RedCards,
    YellowCards,
    PenaltiesSaved,
    PenaltiesMissed,
    OwnGoals,
    Bonus,
    Bps,
}

impl Statistic {
    pub const ALL: [Statistic; 13] = [
        Statistic::TotalPoints,
        Statistic::GoalsScored,
        Statistic::Assists,
        Statistic::CleanSheets,
        Statistic::GoalsConceded,
        Statistic::Saves,
        Statistic::RedCards,
        Statistic::YellowCards,
        Statistic::PenaltiesSaved,
        Statistic::PenaltiesMissed,
        Statistic::OwnGoals,
        Statistic::Bonus,
        Statistic::Bps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::TotalPoints => "total_points",
            Statistic::GoalsScored => "goals_scored",
            Statistic::Assists => "assists",
            Statistic::CleanSheets => "clean_sheets",
            Statistic::GoalsConceded => "goals_conceded",
            Statistic::Saves => "saves",
            Statistic::RedCards => "red_cards",
            Statistic::YellowCards => "yellow_cards",
            Statistic::PenaltiesSaved => "penalties_saved",
            Statistic::PenaltiesMissed => "penalties_missed",
            Statistic::OwnGoals => "own_goals",
            Statistic::Bonus => "bonus",
            Statistic::Bps => "bps",
        }
    }

    pub fn value(&self, entry: &PlayerHistoryEntry) -> i64 {
        match self {
            Statistic::TotalPoints => entry.total_points,
            Statistic::GoalsScored => entry.goals_scored,
            Statistic::Assists => entry.assists,
            Statistic::CleanSheets => entry.clean_sheets,
            Statistic::GoalsConceded => entry.goals_conceded,
            Statistic::Saves => entry.saves,
            Statistic::RedCards => entry.red_cards,
            Statistic::YellowCards => entry.yellow_cards,
            Statistic::PenaltiesSaved => entry.penalties_saved,
            Statistic::PenaltiesMissed => entry.penalties_missed,
            Statistic::OwnGoals => entry.own_goals,
            Statistic::Bonus => entry.bonus,
            Statistic::Bps => entry.bps,
        }
    }

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| FplError::UnknownStatistic {
                given: s.to_string(),
                allowed: Self::allowed(),
            })
    }
}

// ===== Captaincy =====

/// The squad member whose points were actually multiplied in a gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captaincy {
    pub player: PlayerId,
    pub vice_captain_stood_in: bool,
    pub triple_captain: bool,
}

impl Captaincy {
    /// Factor applied to raw points for the extra captaincy contribution.
    pub fn extra_points_factor(&self) -> i64 {
        if self.triple_captain {
            4
        } else {
            2
        }
    }
}

fn played_as_captain(pick: &Pick) -> bool {
    pick.multiplier >= CAPTAIN_MULTIPLIER
}

/// Captain if they played, else the vice-captain if they played, else nobody.
pub fn effective_captain(picks: &ManagerPicks) -> Option<Captaincy> {
    let captaincy = |pick: &Pick, vice_captain_stood_in| Captaincy {
        player: pick.element,
        vice_captain_stood_in,
        triple_captain: pick.multiplier == TRIPLE_CAPTAIN_MULTIPLIER,
    };

    if let Some(captain) = picks.captain().filter(|p| played_as_captain(p)) {
        return Some(captaincy(captain, false));
    }
    picks
        .vice_captain()
        .filter(|p| played_as_captain(p))
        .map(|vice| captaincy(vice, true))
}

/// Sum of `total_points` over every history entry of the gameweek.
/// Double gameweeks produce more than one entry.
pub fn points_for_player_in_gameweek(history: &[PlayerHistoryEntry], gameweek: GameweekId) -> i64 {
    history
        .iter()
        .filter(|h| h.round == gameweek)
        .map(|h| h.total_points)
        .sum()
}

/// Extra points earned through captaincy, one value per gameweek in `gameweeks`,
/// from the cached pick history and player histories.
///
/// Weeks without an effective captain contribute 0. A gameweek missing from
/// the manager's cached history, or a captain without a cached history, makes
/// the whole range unavailable.
pub fn extra_captaincy_points(
    store: &CacheStore,
    manager: &Manager,
    gameweeks: RangeInclusive<GameweekId>,
) -> Result<Vec<i64>, FplError> {
    let bootstrap = store.load_bootstrap()?;
    let mut histories: HashMap<PlayerId, Vec<PlayerHistoryEntry>> = HashMap::new();
    let mut result = Vec::new();

    for gameweek in gameweeks {
        let picks = manager.picks_for_gameweek(store, gameweek).inspect_err(
            |e| warn!(manager = manager.id, gameweek, error = %e, "Captain resolution failed"),
        )?;

        let Some(captain) = effective_captain(&picks) else {
            result.push(0);
            continue;
        };

        if !histories.contains_key(&captain.player) {
            let history = cached_history(store, bootstrap.as_ref(), captain.player).inspect_err(
                |e| warn!(player = captain.player, gameweek, error = %e, "Captain points unavailable"),
            )?;
            histories.insert(captain.player, history);
        }
        let history = histories.get(&captain.player).map(Vec::as_slice).unwrap_or_default();
        result.push(points_for_player_in_gameweek(history, gameweek) * captain.extra_points_factor());
    }

    Ok(result)
}

/// History of a player through the read model, by id alone when the
/// bootstrap cannot name them.
fn cached_history(
    store: &CacheStore,
    bootstrap: Option<&BootstrapStatic>,
    id: PlayerId,
) -> Result<Vec<PlayerHistoryEntry>, FplError> {
    let mut player = Player::new(id);
    if let Some(bootstrap) = bootstrap {
        player.hydrate_from(bootstrap);
    }
    if player.is_resolved() {
        return player.history(store);
    }
    store
        .load_player_history(id)?
        .ok_or(FplError::UnresolvedPlayer(id))
}

/// Same computation as `extra_captaincy_points`, fetching picks and player
/// summaries from `source`. Used when the cache does not cover the range.
/// Any failed fetch makes the whole range unavailable.
pub async fn extra_captaincy_points_remote<S: FplSource + ?Sized>(
    source: &S,
    manager: ManagerId,
    gameweeks: RangeInclusive<GameweekId>,
) -> Result<Vec<i64>, FetchError> {
    let mut summaries: HashMap<PlayerId, Vec<PlayerHistoryEntry>> = HashMap::new();
    let mut result = Vec::new();

    for gameweek in gameweeks {
        let picks = source
            .manager_picks(manager, gameweek)
            .await
            .inspect_err(|e| warn!(manager, gameweek, error = %e, "Captain resolution failed"))?;

        let Some(captain) = effective_captain(&picks) else {
            result.push(0);
            continue;
        };

        if !summaries.contains_key(&captain.player) {
            let summary = source.element_summary(captain.player).await.inspect_err(
                |e| warn!(player = captain.player, gameweek, error = %e, "Captain points unavailable"),
            )?;
            summaries.insert(captain.player, summary.history);
        }
        let history = summaries.get(&captain.player).map(Vec::as_slice).unwrap_or_default();
        result.push(points_for_player_in_gameweek(history, gameweek) * captain.extra_points_factor());
    }

    Ok(result)
}

// ===== Rates =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Per90Minutes,
    PerGame,
}

/// `sum(stat) / sum(minutes) * 90`; `None` when the player has no minutes.
pub fn per_90_minutes(history: &[PlayerHistoryEntry], stat: Statistic) -> Option<f64> {
    let minutes: u64 = history.iter().map(|h| u64::from(h.minutes)).sum();
    if minutes == 0 {
        return None;
    }
    let total: i64 = history.iter().map(|h| stat.value(h)).sum();
    Some(total as f64 / minutes as f64 * 90.0)
}

/// Mean of `stat` over the games the player featured in.
pub fn per_game(history: &[PlayerHistoryEntry], stat: Statistic) -> Option<f64> {
    let played: Vec<_> = history.iter().filter(|h| h.played()).collect();
    if played.is_empty() {
        return None;
    }
    let total: i64 = played.iter().map(|h| stat.value(h)).sum();
    Some(total as f64 / played.len() as f64)
}

/// Rate of a statistic given by name; unknown names are rejected.
pub fn rate(
    history: &[PlayerHistoryEntry],
    stat: &str,
    kind: RateKind,
) -> Result<Option<f64>, FplError> {
    let stat: Statistic = stat.parse()?;
    Ok(match kind {
        RateKind::Per90Minutes => per_90_minutes(history, stat),
        RateKind::PerGame => per_game(history, stat),
    })
}

/// Sum of `stat` over the last `entries` history entries.
pub fn total_over_last(history: &[PlayerHistoryEntry], stat: Statistic, entries: usize) -> i64 {
    let start = history.len().saturating_sub(entries);
    history[start..].iter().map(|h| stat.value(h)).sum()
}

/// Players ranked by the mean of `stat` over their last `entries` history
/// entries, best first. Players without history are skipped.
pub fn leaderboard<'a>(
    histories: impl IntoIterator<Item = (PlayerId, &'a [PlayerHistoryEntry])>,
    stat: Statistic,
    entries: usize,
    limit: usize,
) -> Vec<(PlayerId, f64)> {
    let mut ranked: Vec<(PlayerId, f64)> = histories
        .into_iter()
        .filter_map(|(player, history)| {
            let considered = history.len().min(entries);
            if considered == 0 {
                return None;
            }
            let mean = total_over_last(history, stat, entries) as f64 / considered as f64;
            Some((player, mean))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
