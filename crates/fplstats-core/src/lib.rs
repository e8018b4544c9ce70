//! fplstats core - Fantasy Premier League data sync and statistics.
//!
//! This crate pulls documents from the public FPL API, keeps them in a
//! per-season JSON cache, and derives statistics from them:
//!
//! - `api`: the `FplSource` seam and its reqwest client
//! - `cache`: the indexed per-season snapshot store
//! - `sync`: incremental cache refresh, foreground or on a tokio task
//! - `read`: two-phase read models (Team, Player, Manager, Fixture, League, Gameweek)
//! - `stats`: captaincy, per-90 and per-game rates, recent-form rankings
//! - `config`: season, last finished gameweek and nickname mappings

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod read;
pub mod stats;
pub mod sync;

pub use api::{FetchError, FixtureFilter, FplClient, FplSource, StandingsQuery};
pub use cache::{CacheStore, EntityKind};
pub use config::{Config, ConfigError};
pub use error::FplError;
pub use sync::{spawn_refresh, RefreshEvent, RefreshReport, SyncEngine, SyncKind, SyncOutcome, SyncStatus};
