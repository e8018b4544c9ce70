//! Remote data source for the Fantasy Premier League API.
//!
//! `FplSource` is the seam between the sync engine and the network: one
//! method per remote resource, each issuing a single request and returning
//! either the parsed document or a `FetchError`. Nothing here caches or
//! retries. `FplClient` is the reqwest-backed implementation.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::models::{
    ApiFixture, BootstrapStatic, ElementSummary, EventStatus, GameweekId, LeagueId, LeagueStandings,
    LeagueType, LiveGameweek, ManagerHistory, ManagerId, ManagerPicks, ManagerProfile, PlayerId,
};

pub use client::FplClient;
pub use error::FetchError;

/// Which fixtures `/fixtures/` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureFilter {
    #[default]
    All,
    Gameweek(GameweekId),
    FutureOnly,
}

/// Paging and phase selection for league standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StandingsQuery {
    pub page_new_entries: Option<u32>,
    pub page_standings: Option<u32>,
    pub phase: Option<u32>,
}

#[async_trait]
pub trait FplSource: Send + Sync {
    /// Season-wide players, teams and gameweek schedule.
    async fn bootstrap_static(&self) -> Result<BootstrapStatic, FetchError>;

    /// Processing state of the current gameweek.
    async fn event_status(&self) -> Result<EventStatus, FetchError>;

    async fn manager_picks(
        &self,
        manager: ManagerId,
        gameweek: GameweekId,
    ) -> Result<ManagerPicks, FetchError>;

    /// Per-gameweek history and remaining fixtures of one player.
    async fn element_summary(&self, player: PlayerId) -> Result<ElementSummary, FetchError>;

    async fn live_gameweek(&self, gameweek: GameweekId) -> Result<LiveGameweek, FetchError>;

    async fn fixtures(&self, filter: FixtureFilter) -> Result<Vec<ApiFixture>, FetchError>;

    async fn league_standings(
        &self,
        league: LeagueId,
        league_type: LeagueType,
        query: StandingsQuery,
    ) -> Result<LeagueStandings, FetchError>;

    async fn manager_profile(&self, manager: ManagerId) -> Result<ManagerProfile, FetchError>;

    async fn manager_history(&self, manager: ManagerId) -> Result<ManagerHistory, FetchError>;
}
