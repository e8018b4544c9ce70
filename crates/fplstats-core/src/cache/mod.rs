//! Season cache of FPL documents.
//!
//! This module provides the `CacheStore`, a directory-per-season tree of JSON
//! snapshots keyed by entity id. Layout under the season directory:
//!
//! - `bootstrap_static.json`
//! - `managers/{nickname}_{id}.json`: ordered per-gameweek picks
//! - `players/{id}_{web_name}.json`: ordered per-gameweek history
//! - `teams/{id}_{name}.json` and `teams/all_teams.json`
//! - `gameweeks/general/gameweek_{n}.json` and `gameweeks/live/gameweek_{n}.json`
//! - `fixtures/{id}-{home}-{away}.json`, with a `-finished` suffix once final
//!
//! An `index.json` maps every kind and key to its file so lookups never scan
//! directories.

pub mod store;

pub use store::{CacheStore, EntityKind, IndexEntry};
