use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{RefreshReport, SyncEngine, SyncKind, SyncOutcome};
use crate::api::FplSource;

/// Channel buffer size for refresh progress events
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Progress of a background refresh, in the order the steps run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A sync step is starting
    Started(SyncKind),
    /// A sync step has finished, successfully or not
    Finished(SyncOutcome),
    /// Every step has run
    Complete(RefreshReport),
}

/// Helper to send refresh events, logging any channel errors
pub(super) async fn send_event(tx: &mpsc::Sender<RefreshEvent>, event: RefreshEvent) {
    if let Err(e) = tx.send(event).await {
        error!(error = %e, "Failed to send refresh event - channel closed");
    }
}

/// Run a full refresh on a tokio task.
///
/// Progress arrives on the returned receiver; the task hands the engine back
/// when it is done. Nothing prevents a caller from starting a second refresh
/// on another engine over the same cache, in which case the last write wins.
pub fn spawn_refresh<S>(
    mut engine: SyncEngine<S>,
) -> (mpsc::Receiver<RefreshEvent>, JoinHandle<SyncEngine<S>>)
where
    S: FplSource + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

    let handle = tokio::spawn(async move {
        info!("Background refresh task started");
        let report = engine.run_refresh(Some(&tx)).await;
        send_event(&tx, RefreshEvent::Complete(report)).await;
        engine
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockSource;
    use crate::cache::CacheStore;
    use crate::config::Config;
    use crate::models::ApiFixture;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_background_refresh_streams_progress() {
        let dir = TempDir::new().unwrap();
        let mut source = MockSource::default();
        source.set_completed_gameweek(0);
        source.fixtures = Some(vec![serde_json::from_value::<ApiFixture>(serde_json::json!({
            "id": 1, "team_h": 1, "team_a": 2, "finished": false
        }))
        .unwrap()]);

        let store = CacheStore::open(dir.path().join("2024")).unwrap();
        let config = Config::load_from(dir.path().join("config.json")).unwrap();
        let engine = SyncEngine::new(source, store, config);

        let (mut rx, handle) = spawn_refresh(engine);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let engine = handle.await.unwrap();

        assert_eq!(events.first(), Some(&RefreshEvent::Started(SyncKind::Bootstrap)));
        let finished: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RefreshEvent::Finished(o) => Some(o.kind),
                _ => None,
            })
            .collect();
        assert_eq!(finished, SyncKind::ALL.to_vec());

        match events.last() {
            Some(RefreshEvent::Complete(report)) => {
                // Bootstrap is not scripted, fixtures and managers still succeed
                assert!(!report.is_complete());
                assert_eq!(report.outcomes.len(), SyncKind::ALL.len());
            }
            other => panic!("expected Complete, got {:?}", other),
        }
        assert_eq!(engine.store().list_keys(crate::cache::EntityKind::Fixture), vec![1]);
    }
}
