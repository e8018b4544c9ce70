//! HTTP client for the public Fantasy Premier League API.
//!
//! Every method issues exactly one GET. Failures of any kind come back as a
//! `FetchError`; there is no retry loop, callers decide when to try again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{FetchError, FixtureFilter, FplSource, StandingsQuery};
use crate::models::{
    ApiFixture, BootstrapStatic, ElementSummary, EventStatus, GameweekId, LeagueId, LeagueStandings,
    LeagueType, LiveGameweek, ManagerHistory, ManagerId, ManagerPicks, ManagerProfile, PlayerId,
};

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the FPL API
pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("fplstats/", env!("CARGO_PKG_VERSION"));

/// API client for fantasy.premierleague.com.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FplClient {
    client: Client,
    base_url: String,
}

impl FplClient {
    /// Create a client against the public API
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against another base URL (mirrors, proxies, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        debug!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "Request failed"))?;

        let response = Self::check_response(response)
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "Request returned an error status"))?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            FetchError::InvalidResponse(format!("{}: {}", url, e))
        })
    }
}

fn fixtures_query(filter: FixtureFilter) -> Vec<(&'static str, String)> {
    match filter {
        FixtureFilter::All => vec![],
        FixtureFilter::Gameweek(gw) => vec![("event", gw.to_string())],
        FixtureFilter::FutureOnly => vec![("future", "1".to_string())],
    }
}

fn standings_query(query: StandingsQuery) -> Vec<(&'static str, String)> {
    [
        ("page_new_entries", query.page_new_entries),
        ("page_standings", query.page_standings),
        ("phase", query.phase),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
    .collect()
}

#[async_trait]
impl FplSource for FplClient {
    async fn bootstrap_static(&self) -> Result<BootstrapStatic, FetchError> {
        self.get("bootstrap-static/", &[]).await
    }

    async fn event_status(&self) -> Result<EventStatus, FetchError> {
        self.get("event-status/", &[]).await
    }

    async fn manager_picks(
        &self,
        manager: ManagerId,
        gameweek: GameweekId,
    ) -> Result<ManagerPicks, FetchError> {
        self.get(&format!("entry/{}/event/{}/picks/", manager, gameweek), &[])
            .await
    }

    async fn element_summary(&self, player: PlayerId) -> Result<ElementSummary, FetchError> {
        self.get(&format!("element-summary/{}/", player), &[]).await
    }

    async fn live_gameweek(&self, gameweek: GameweekId) -> Result<LiveGameweek, FetchError> {
        self.get(&format!("event/{}/live/", gameweek), &[]).await
    }

    async fn fixtures(&self, filter: FixtureFilter) -> Result<Vec<ApiFixture>, FetchError> {
        self.get("fixtures/", &fixtures_query(filter)).await
    }

    async fn league_standings(
        &self,
        league: LeagueId,
        league_type: LeagueType,
        query: StandingsQuery,
    ) -> Result<LeagueStandings, FetchError> {
        let path = format!("{}/{}/standings/", league_type.endpoint(), league);
        self.get(&path, &standings_query(query)).await
    }

    async fn manager_profile(&self, manager: ManagerId) -> Result<ManagerProfile, FetchError> {
        self.get(&format!("entry/{}/", manager), &[]).await
    }

    async fn manager_history(&self, manager: ManagerId) -> Result<ManagerHistory, FetchError> {
        self.get(&format!("entry/{}/history/", manager), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = FplClient::with_base_url("https://example.test/api/").expect("client");
        assert_eq!(client.base_url(), "https://example.test/api");
        assert_eq!(client.url("bootstrap-static/"), "https://example.test/api/bootstrap-static/");
        assert_eq!(client.url("/fixtures/"), "https://example.test/api/fixtures/");
    }

    #[test]
    fn test_fixtures_query() {
        assert!(fixtures_query(FixtureFilter::All).is_empty());
        assert_eq!(fixtures_query(FixtureFilter::Gameweek(7)), vec![("event", "7".to_string())]);
        assert_eq!(fixtures_query(FixtureFilter::FutureOnly), vec![("future", "1".to_string())]);
    }

    #[test]
    fn test_standings_query_skips_unset_parameters() {
        assert!(standings_query(StandingsQuery::default()).is_empty());

        let query = StandingsQuery {
            page_new_entries: None,
            page_standings: Some(2),
            phase: Some(1),
        };
        assert_eq!(
            standings_query(query),
            vec![("page_standings", "2".to_string()), ("phase", "1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_fetch_error() {
        // Nothing listens on the discard port locally
        let client = FplClient::with_base_url("http://127.0.0.1:9").expect("client");
        let result = client.bootstrap_static().await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
