//! Read models over the season cache.
//!
//! Every model is built in two phases: `new` creates an identifier-only
//! handle and never fails, then `hydrate` fills the descriptive fields from
//! the cache (or from the remote source for data that is never cached, such
//! as league standings). A cache entry that is simply absent leaves the
//! fields unresolved (`None`); only the validation paths documented on each
//! model return an `FplError`.

pub mod fixture;
pub mod gameweek;
pub mod league;
pub mod manager;
pub mod player;
pub mod team;

pub use fixture::{Fixture, FixtureEvent, StatEvent};
pub use gameweek::Gameweek;
pub use league::League;
pub use manager::Manager;
pub use player::Player;
pub use team::Team;

use crate::cache::CacheStore;
use crate::error::FplError;

/// Build the error for a cache file a model cannot work without.
fn missing_file(store: &CacheStore, relative: &str) -> FplError {
    FplError::MissingCacheFile(store.root().join(relative).display().to_string())
}
