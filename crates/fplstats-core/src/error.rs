use thiserror::Error;

use crate::models::{GameweekId, ManagerId, PlayerId};

/// Domain and validation failures raised by read models and derived stats.
///
/// These are distinct from "unresolved" state: a read model whose cache entry
/// is simply absent hydrates with empty fields instead of returning one of these.
#[derive(Error, Debug)]
pub enum FplError {
    #[error("Required cache file missing: {0}")]
    MissingCacheFile(String),

    #[error("Team short name {0} not found in teams")]
    UnknownTeam(String),

    #[error("Invalid league type {given}. Expected one of: {allowed}")]
    InvalidLeagueType { given: String, allowed: String },

    #[error("Gameweek {gameweek} not found in cached history of manager {manager}")]
    GameweekNotInHistory {
        manager: ManagerId,
        gameweek: GameweekId,
    },

    #[error("Unknown statistic {given}. Expected one of: {allowed}")]
    UnknownStatistic { given: String, allowed: String },

    #[error("Gameweek {0} is outside 1..=38")]
    InvalidGameweek(GameweekId),

    #[error("Player with ID {0} does not have a valid web name")]
    UnresolvedPlayer(PlayerId),

    #[error(transparent)]
    Cache(#[from] anyhow::Error),
}
