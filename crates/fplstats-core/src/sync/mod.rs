//! Incremental synchronisation of the season cache with the FPL API.
//!
//! `SyncEngine` runs one step per entity kind. Each step fetches only what the
//! cache is missing where the API allows it, writes whole snapshots, and
//! reports a `SyncOutcome`. A failed remote call ends that step early and
//! leaves earlier writes in place; the next run continues from whatever the
//! cache holds. `spawn_refresh` runs a full refresh on a tokio task.

pub mod background;
pub mod engine;

use std::fmt;
use std::str::FromStr;

pub use background::{spawn_refresh, RefreshEvent};
pub use engine::SyncEngine;

/// The entity kinds a refresh brings up to date, in refresh order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    Bootstrap,
    Teams,
    Gameweeks,
    Fixtures,
    Managers,
    Players,
}

impl SyncKind {
    pub const ALL: [SyncKind; 6] = [
        SyncKind::Bootstrap,
        SyncKind::Teams,
        SyncKind::Gameweeks,
        SyncKind::Fixtures,
        SyncKind::Managers,
        SyncKind::Players,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Bootstrap => "bootstrap",
            SyncKind::Teams => "teams",
            SyncKind::Gameweeks => "gameweeks",
            SyncKind::Fixtures => "fixtures",
            SyncKind::Managers => "managers",
            SyncKind::Players => "players",
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let allowed: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown sync kind {}. Expected one of: {}", s, allowed.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// At least one cache file was written
    Updated,
    /// The cache already matched the remote data
    UpToDate,
    /// The step stopped early; writes made before the failure are kept
    Aborted { reason: String },
}

/// Result of one sync step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub kind: SyncKind,
    /// Remote calls made
    pub fetched: usize,
    /// Cache files written
    pub written: usize,
    pub status: SyncStatus,
}

impl SyncOutcome {
    fn new(kind: SyncKind) -> Self {
        Self {
            kind,
            fetched: 0,
            written: 0,
            status: SyncStatus::UpToDate,
        }
    }

    /// Settle the status from the write count.
    fn finish(mut self) -> Self {
        if self.written > 0 {
            self.status = SyncStatus::Updated;
        }
        self
    }

    fn abort(mut self, reason: impl fmt::Display) -> Self {
        self.status = SyncStatus::Aborted {
            reason: reason.to_string(),
        };
        self
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, SyncStatus::Aborted { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            SyncStatus::Updated => write!(
                f,
                "{}: updated ({} fetched, {} written)",
                self.kind, self.fetched, self.written
            ),
            SyncStatus::UpToDate => write!(f, "{}: up to date ({} fetched)", self.kind, self.fetched),
            SyncStatus::Aborted { reason } => write!(
                f,
                "{}: aborted after {} fetched, {} written: {}",
                self.kind, self.fetched, self.written, reason
            ),
        }
    }
}

/// Outcomes of a full refresh, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(SyncOutcome::is_aborted)
    }

    pub fn total_fetched(&self) -> usize {
        self.outcomes.iter().map(|o| o.fetched).sum()
    }

    pub fn total_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.written).sum()
    }

    /// One-line status for display after a refresh.
    pub fn status_message(&self) -> String {
        let failed: Vec<_> = self
            .outcomes
            .iter()
            .filter(|o| o.is_aborted())
            .map(|o| o.kind.as_str())
            .collect();
        if !failed.is_empty() {
            format!("Refresh incomplete, try again later: {}", failed.join(", "))
        } else if self.total_written() == 0 {
            "Up to date.".to_string()
        } else {
            "Processing done.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: SyncKind, written: usize) -> SyncOutcome {
        SyncOutcome {
            kind,
            fetched: 1,
            written,
            status: SyncStatus::UpToDate,
        }
        .finish()
    }

    #[test]
    fn test_sync_kind_parsing() {
        assert_eq!("players".parse::<SyncKind>(), Ok(SyncKind::Players));
        assert_eq!("Fixtures".parse::<SyncKind>(), Ok(SyncKind::Fixtures));
        assert!("leagues".parse::<SyncKind>().is_err());
    }

    #[test]
    fn test_status_messages() {
        let report = RefreshReport {
            outcomes: vec![outcome(SyncKind::Teams, 0), outcome(SyncKind::Fixtures, 0)],
        };
        assert!(report.is_complete());
        assert_eq!(report.status_message(), "Up to date.");

        let report = RefreshReport {
            outcomes: vec![outcome(SyncKind::Teams, 0), outcome(SyncKind::Fixtures, 3)],
        };
        assert_eq!(report.status_message(), "Processing done.");
        assert_eq!(report.total_fetched(), 2);

        let report = RefreshReport {
            outcomes: vec![
                outcome(SyncKind::Teams, 21),
                SyncOutcome::new(SyncKind::Managers).abort("not found"),
            ],
        };
        assert!(!report.is_complete());
        assert_eq!(report.status_message(), "Refresh incomplete, try again later: managers");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(outcome(SyncKind::Teams, 21).to_string(), "teams: updated (1 fetched, 21 written)");
        assert_eq!(
            SyncOutcome::new(SyncKind::Players).abort("rate limited").to_string(),
            "players: aborted after 0 fetched, 0 written: rate limited"
        );
    }
}
