//! Data models for Fantasy Premier League documents.
//!
//! This module contains the serde types for every document the FPL API
//! serves, which are also the shapes written to the season cache:
//!
//! - `BootstrapStatic`: season-wide players, teams and gameweek schedule
//! - `EventStatus`: processing status of the current gameweek
//! - `ManagerPicks`, `Pick`, `EntryHistory`: one manager's squad for one gameweek
//! - `ElementSummary`, `PlayerHistoryEntry`: a player's per-gameweek history
//! - `LiveGameweek`: live per-player stats for one gameweek
//! - `ApiFixture`, `FixtureStat`: fixtures and their stat events
//! - `LeagueStandings`: classic and head-to-head league tables
//! - `ManagerProfile`, `ManagerHistory`: a manager's profile and season summary
//!
//! Fields the crate does not interpret are kept in `extra` maps so a cached
//! snapshot carries the whole remote payload.

pub mod bootstrap;
pub mod entry;
pub mod event_status;
pub mod fixture;
pub mod league;
pub mod live;
pub mod picks;
pub mod player;

pub use bootstrap::{BootstrapStatic, ElementInfo, EventInfo, TeamInfo};
pub use entry::{ChipUsage, ManagerHistory, ManagerProfile, PastSeason};
pub use event_status::{EventStatus, EventStatusDay};
pub use fixture::{ApiFixture, FixtureStat, StatEntry};
pub use league::{LeagueInfo, LeagueStandings, LeagueType, StandingEntry, StandingsTable};
pub use live::{LiveElement, LiveGameweek, LiveStats};
pub use picks::{EntryHistory, ManagerPicks, Pick};
pub use player::{ElementSummary, PlayerFixture, PlayerHistoryEntry};

/// Premier League player ("element") id.
pub type PlayerId = u32;
/// Premier League team id.
pub type TeamId = u32;
/// Fixture id.
pub type FixtureId = u32;
/// Gameweek ("event") number, 1..=38.
pub type GameweekId = u32;
/// FPL manager ("entry") id.
pub type ManagerId = u64;
/// FPL league id.
pub type LeagueId = u64;

/// Number of gameweeks in a Premier League season.
pub const GAMEWEEKS_PER_SEASON: GameweekId = 38;

/// Remote fields this crate does not model explicitly.
pub type Extra = serde_json::Map<String, serde_json::Value>;
