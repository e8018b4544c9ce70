use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::background::{send_event, RefreshEvent};
use super::{RefreshReport, SyncKind, SyncOutcome, SyncStatus};
use crate::api::{FixtureFilter, FplSource};
use crate::cache::{CacheStore, EntityKind};
use crate::config::Config;
use crate::models::{BootstrapStatic, GameweekId};

/// Brings a season cache up to date with an `FplSource`.
///
/// Remote calls are awaited one at a time. `Err` from a step means a local
/// failure (cache or config I/O); remote failures come back as an aborted
/// `SyncOutcome` instead.
pub struct SyncEngine<S: FplSource> {
    source: S,
    store: CacheStore,
    config: Config,
}

impl<S: FplSource> SyncEngine<S> {
    pub fn new(source: S, store: CacheStore, config: Config) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_parts(self) -> (S, CacheStore, Config) {
        (self.source, self.store, self.config)
    }

    /// Run a single step by kind.
    pub async fn sync(&mut self, kind: SyncKind) -> Result<SyncOutcome> {
        match kind {
            SyncKind::Bootstrap => self.sync_bootstrap().await,
            SyncKind::Teams => self.sync_teams().await,
            SyncKind::Gameweeks => self.sync_gameweeks().await,
            SyncKind::Fixtures => self.sync_fixtures().await,
            SyncKind::Managers => self.sync_managers().await,
            SyncKind::Players => self.sync_players().await,
        }
    }

    /// Run every step in order. Not transactional: a failed step is reported
    /// and the remaining steps still run.
    pub async fn refresh_all(&mut self) -> RefreshReport {
        self.run_refresh(None).await
    }

    pub(super) async fn run_refresh(
        &mut self,
        events: Option<&mpsc::Sender<RefreshEvent>>,
    ) -> RefreshReport {
        info!(season = %self.config.season, "Refresh started");
        let mut report = RefreshReport::default();

        // One bootstrap fetch feeds every step that derives from it
        let mut outcome = SyncOutcome::new(SyncKind::Bootstrap);
        if let Some(tx) = events {
            send_event(tx, RefreshEvent::Started(SyncKind::Bootstrap)).await;
        }
        let bootstrap = match self.fetch_bootstrap(&mut outcome).await {
            Some(bootstrap) => {
                outcome = step_result(SyncKind::Bootstrap, self.write_bootstrap(outcome, &bootstrap));
                Some(bootstrap)
            }
            None => None,
        };
        record(&mut report, outcome, events).await;

        for kind in SyncKind::ALL.into_iter().skip(1) {
            if let Some(tx) = events {
                send_event(tx, RefreshEvent::Started(kind)).await;
            }
            let outcome = match (kind, &bootstrap) {
                (SyncKind::Fixtures, _) => step_result(kind, self.sync_fixtures().await),
                (SyncKind::Managers, _) => step_result(kind, self.sync_managers().await),
                (_, None) => SyncOutcome::new(kind).abort("bootstrap data unavailable"),
                (SyncKind::Teams, Some(b)) => {
                    step_result(kind, self.write_teams(SyncOutcome::new(kind), b))
                }
                (SyncKind::Gameweeks, Some(b)) => {
                    step_result(kind, self.write_gameweeks(SyncOutcome::new(kind), b).await)
                }
                (SyncKind::Players, Some(b)) => {
                    step_result(kind, self.write_players(SyncOutcome::new(kind), b).await)
                }
                (SyncKind::Bootstrap, Some(_)) => continue,
            };
            record(&mut report, outcome, events).await;
        }

        info!(
            fetched = report.total_fetched(),
            written = report.total_written(),
            complete = report.is_complete(),
            "Refresh finished"
        );
        report
    }

    async fn fetch_bootstrap(&self, outcome: &mut SyncOutcome) -> Option<BootstrapStatic> {
        outcome.fetched += 1;
        match self.source.bootstrap_static().await {
            Ok(bootstrap) => Some(bootstrap),
            Err(e) => {
                warn!(kind = %outcome.kind, error = %e, "Bootstrap fetch failed");
                outcome.status = SyncStatus::Aborted {
                    reason: e.to_string(),
                };
                None
            }
        }
    }

    // ===== Bootstrap =====

    pub async fn sync_bootstrap(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Bootstrap);
        match self.fetch_bootstrap(&mut outcome).await {
            Some(bootstrap) => self.write_bootstrap(outcome, &bootstrap),
            None => Ok(outcome),
        }
    }

    fn write_bootstrap(&mut self, mut outcome: SyncOutcome, bootstrap: &BootstrapStatic) -> Result<SyncOutcome> {
        if self.store.load_bootstrap()?.as_ref() != Some(bootstrap) {
            self.store.save_bootstrap(bootstrap)?;
            outcome.written += 1;
        }
        Ok(outcome.finish())
    }

    // ===== Teams =====

    /// One file per team plus the consolidated all-teams file.
    pub async fn sync_teams(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Teams);
        match self.fetch_bootstrap(&mut outcome).await {
            Some(bootstrap) => self.write_teams(outcome, &bootstrap),
            None => Ok(outcome),
        }
    }

    fn write_teams(&mut self, mut outcome: SyncOutcome, bootstrap: &BootstrapStatic) -> Result<SyncOutcome> {
        for team in &bootstrap.teams {
            if self.store.load_team(team.id)?.as_ref() != Some(team) {
                self.store.save_team(team)?;
                outcome.written += 1;
            }
        }
        if self.store.load_all_teams()?.as_deref() != Some(bootstrap.teams.as_slice()) {
            self.store.save_all_teams(&bootstrap.teams)?;
            outcome.written += 1;
        }
        debug!(teams = bootstrap.teams.len(), written = outcome.written, "Teams synced");
        Ok(outcome.finish())
    }

    // ===== Gameweeks =====

    /// General properties of every finished and data-checked gameweek, plus
    /// live player stats for those not cached yet. The highest such gameweek
    /// is persisted to the configuration as the last finished gameweek.
    pub async fn sync_gameweeks(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Gameweeks);
        match self.fetch_bootstrap(&mut outcome).await {
            Some(bootstrap) => self.write_gameweeks(outcome, &bootstrap).await,
            None => Ok(outcome),
        }
    }

    async fn write_gameweeks(
        &mut self,
        mut outcome: SyncOutcome,
        bootstrap: &BootstrapStatic,
    ) -> Result<SyncOutcome> {
        let settled: Vec<_> = bootstrap.events.iter().filter(|e| e.is_settled()).collect();

        for event in &settled {
            if self.store.load_gameweek_general(event.id)?.as_ref() != Some(*event) {
                self.store.save_gameweek_general(event)?;
                outcome.written += 1;
            }
        }

        let last_finished = settled.iter().map(|e| e.id).max().unwrap_or(0);
        if last_finished != self.config.last_finished_gameweek {
            info!(
                previous = self.config.last_finished_gameweek,
                last_finished, "Last finished gameweek changed"
            );
            self.config.last_finished_gameweek = last_finished;
            self.config.save()?;
        }

        for event in &settled {
            if self.store.exists(EntityKind::GameweekLive, event.id.into()) {
                continue;
            }
            outcome.fetched += 1;
            match self.source.live_gameweek(event.id).await {
                Ok(live) => {
                    self.store.save_gameweek_live(event.id, &live)?;
                    outcome.written += 1;
                }
                Err(e) => {
                    warn!(gameweek = event.id, error = %e, "Live gameweek fetch failed");
                    return Ok(outcome.abort(e));
                }
            }
        }
        Ok(outcome.finish())
    }

    // ===== Fixtures =====

    /// Every fixture of the season. Fixtures already cached as finished are
    /// final and skipped.
    pub async fn sync_fixtures(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Fixtures);
        outcome.fetched += 1;
        let fixtures = match self.source.fixtures(FixtureFilter::All).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!(error = %e, "Fixtures fetch failed");
                return Ok(outcome.abort(e));
            }
        };

        for fixture in &fixtures {
            if self.store.is_fixture_final(fixture.id) {
                continue;
            }
            if self.store.load_fixture(fixture.id)?.as_ref() == Some(fixture) {
                continue;
            }
            self.store.save_fixture(fixture)?;
            outcome.written += 1;
        }
        debug!(fixtures = fixtures.len(), written = outcome.written, "Fixtures synced");
        Ok(outcome.finish())
    }

    // ===== Managers =====

    /// Extend each configured manager's pick history up to the latest
    /// completed gameweek, fetching the missing gameweeks in increasing order.
    pub async fn sync_managers(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Managers);
        outcome.fetched += 1;
        let completed = match self.source.event_status().await {
            Ok(status) => status.latest_completed_gameweek(),
            Err(e) => {
                warn!(error = %e, "Event status fetch failed");
                return Ok(outcome.abort(e));
            }
        };
        debug!(completed, "Latest completed gameweek");

        let managers: Vec<_> = self
            .config
            .managers
            .iter()
            .map(|(nickname, id)| (nickname.clone(), *id))
            .collect();

        for (nickname, manager) in managers {
            let mut history = self.store.load_manager_picks(manager)?.unwrap_or_default();
            let cached = history.len() as GameweekId;
            if cached >= completed {
                debug!(manager, cached, "Manager history up to date");
                continue;
            }

            let mut failure = None;
            for gameweek in cached + 1..=completed {
                outcome.fetched += 1;
                match self.source.manager_picks(manager, gameweek).await {
                    Ok(picks) => history.push(picks),
                    Err(e) => {
                        warn!(manager, gameweek, error = %e, "Picks fetch failed");
                        failure = Some(e);
                        break;
                    }
                }
            }

            // Whatever was fetched is a gap-free extension of the cached prefix
            if history.len() as GameweekId > cached {
                self.store.save_manager_picks(&nickname, manager, &history)?;
                outcome.written += 1;
                info!(manager, nickname = %nickname, gameweeks = history.len(), "Manager history extended");
            }
            if let Some(e) = failure {
                return Ok(outcome.abort(e));
            }
        }
        Ok(outcome.finish())
    }

    // ===== Players =====

    /// Full history of every player in the bootstrap list, replacing the
    /// cached file when it differs.
    pub async fn sync_players(&mut self) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::new(SyncKind::Players);
        match self.fetch_bootstrap(&mut outcome).await {
            Some(bootstrap) => self.write_players(outcome, &bootstrap).await,
            None => Ok(outcome),
        }
    }

    async fn write_players(
        &mut self,
        mut outcome: SyncOutcome,
        bootstrap: &BootstrapStatic,
    ) -> Result<SyncOutcome> {
        for element in &bootstrap.elements {
            outcome.fetched += 1;
            let summary = match self.source.element_summary(element.id).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(player = element.id, error = %e, "Player summary fetch failed");
                    return Ok(outcome.abort(e));
                }
            };
            if self.store.load_player_history(element.id)?.as_ref() != Some(&summary.history) {
                self.store
                    .save_player_history(element.id, &element.web_name, &summary.history)?;
                outcome.written += 1;
            }
        }
        debug!(players = bootstrap.elements.len(), written = outcome.written, "Players synced");
        Ok(outcome.finish())
    }
}

async fn record(
    report: &mut RefreshReport,
    outcome: SyncOutcome,
    events: Option<&mpsc::Sender<RefreshEvent>>,
) {
    if let Some(tx) = events {
        send_event(tx, RefreshEvent::Finished(outcome.clone())).await;
    }
    report.outcomes.push(outcome);
}

/// Fold a local failure into the outcome so the refresh can carry on.
fn step_result(kind: SyncKind, result: Result<SyncOutcome>) -> SyncOutcome {
    result.unwrap_or_else(|e| {
        error!(kind = %kind, error = %e, "Sync step failed locally");
        SyncOutcome::new(kind).abort(format!("{:#}", e))
    })
}
