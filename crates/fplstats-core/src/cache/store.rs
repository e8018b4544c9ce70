use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    ApiFixture, BootstrapStatic, EventInfo, FixtureId, GameweekId, LiveGameweek, ManagerId,
    ManagerPicks, PlayerHistoryEntry, PlayerId, TeamId, TeamInfo,
};

/// Index file name in the season directory
const INDEX_FILE: &str = "index.json";

/// Key used for kinds that hold a single document per season
const SINGLETON_KEY: u64 = 0;

/// File name suffix marking a fixture whose result is final
const FINISHED_SUFFIX: &str = "-finished";

const BOOTSTRAP_STEM: &str = "bootstrap_static";
const ALL_TEAMS_STEM: &str = "all_teams";
const GAMEWEEK_PREFIX: &str = "gameweek_";

/// The kinds of documents kept in a season cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Bootstrap,
    Manager,
    Player,
    Team,
    AllTeams,
    GameweekGeneral,
    GameweekLive,
    Fixture,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Bootstrap,
        EntityKind::Manager,
        EntityKind::Player,
        EntityKind::Team,
        EntityKind::AllTeams,
        EntityKind::GameweekGeneral,
        EntityKind::GameweekLive,
        EntityKind::Fixture,
    ];

    /// Directory of this kind, relative to the season directory
    fn dir(&self) -> &'static str {
        match self {
            EntityKind::Bootstrap => "",
            EntityKind::Manager => "managers",
            EntityKind::Player => "players",
            EntityKind::Team | EntityKind::AllTeams => "teams",
            EntityKind::GameweekGeneral => "gameweeks/general",
            EntityKind::GameweekLive => "gameweeks/live",
            EntityKind::Fixture => "fixtures",
        }
    }

    fn relative_path(&self, stem: &str) -> String {
        match self.dir() {
            "" => format!("{}.json", stem),
            dir => format!("{}/{}.json", dir, stem),
        }
    }

    /// Recover the key from a file stem written by this kind.
    fn parse_key(&self, stem: &str) -> Option<u64> {
        match self {
            EntityKind::Bootstrap => (stem == BOOTSTRAP_STEM).then_some(SINGLETON_KEY),
            EntityKind::AllTeams => (stem == ALL_TEAMS_STEM).then_some(SINGLETON_KEY),
            // {nickname}_{id}; nicknames may themselves contain underscores
            EntityKind::Manager => stem.rsplit_once('_')?.1.parse().ok(),
            // {id}_{name}
            EntityKind::Player | EntityKind::Team => stem.split('_').next()?.parse().ok(),
            EntityKind::GameweekGeneral | EntityKind::GameweekLive => {
                stem.strip_prefix(GAMEWEEK_PREFIX)?.parse().ok()
            }
            // {id}-{home}-{away}[-finished]
            EntityKind::Fixture => stem.split('-').next()?.parse().ok(),
        }
    }
}

/// Where a cached document lives and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Path relative to the season directory, `/`-separated
    pub file: String,
    pub cached_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

type CacheIndex = BTreeMap<EntityKind, BTreeMap<u64, IndexEntry>>;

/// JSON snapshot store for one season.
///
/// Writes replace whole files. Two stores opened on the same directory do not
/// coordinate: the last write wins.
pub struct CacheStore {
    root: PathBuf,
    index: CacheIndex,
}

impl CacheStore {
    /// Open the season directory, creating it if needed.
    ///
    /// The key index is loaded from `index.json`, or rebuilt from the files on
    /// disk when that is missing or unreadable.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory: {}", root.display()))?;

        let index_path = root.join(INDEX_FILE);
        let loaded = if index_path.exists() {
            std::fs::read_to_string(&index_path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<CacheIndex>(&s).map_err(anyhow::Error::from))
                .inspect_err(|e| warn!(error = %e, "Cache index unreadable, rebuilding"))
                .ok()
        } else {
            None
        };

        let mut store = Self {
            root,
            index: CacheIndex::new(),
        };
        match loaded {
            Some(index) => store.index = index,
            None => {
                store.rebuild_index()?;
                store.save_index()?;
            }
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk each kind's directory once and index what is there.
    fn rebuild_index(&mut self) -> Result<()> {
        self.index.clear();
        for kind in EntityKind::ALL {
            let dir = self.root.join(kind.dir());
            if !dir.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to list cache directory: {}", dir.display()))?
            {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let Some(key) = kind.parse_key(stem) else {
                    continue;
                };
                let cached_at = std::fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                self.index.entry(kind).or_default().insert(
                    key,
                    IndexEntry {
                        file: kind.relative_path(stem),
                        cached_at,
                    },
                );
            }
        }
        debug!(
            entries = self.index.values().map(|m| m.len()).sum::<usize>(),
            "Cache index rebuilt"
        );
        Ok(())
    }

    fn save_index(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.index)?;
        std::fs::write(self.root.join(INDEX_FILE), contents).context("Failed to write cache index")?;
        Ok(())
    }

    pub fn entry(&self, kind: EntityKind, key: u64) -> Option<&IndexEntry> {
        self.index.get(&kind)?.get(&key)
    }

    /// Absolute path of a cached document, if indexed.
    pub fn file_path(&self, kind: EntityKind, key: u64) -> Option<PathBuf> {
        self.entry(kind, key).map(|e| self.root.join(&e.file))
    }

    pub fn exists(&self, kind: EntityKind, key: u64) -> bool {
        self.file_path(kind, key).is_some_and(|p| p.exists())
    }

    /// Read and parse a cached document; `None` when it is not cached.
    pub fn read<T: DeserializeOwned>(&self, kind: EntityKind, key: u64) -> Result<Option<T>> {
        let Some(path) = self.file_path(kind, key) else {
            return Ok(None);
        };
        if !path.exists() {
            debug!(?kind, key, path = %path.display(), "Indexed cache file is gone");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
        let parsed = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;
        Ok(Some(parsed))
    }

    pub fn read_value(&self, kind: EntityKind, key: u64) -> Result<Option<serde_json::Value>> {
        self.read(kind, key)
    }

    /// Write a document, replacing any previous file for the same key.
    ///
    /// `stem` is the file name without extension. If the key was cached under
    /// another name before, the old file is removed.
    pub fn write<T: Serialize + ?Sized>(
        &mut self,
        kind: EntityKind,
        key: u64,
        stem: &str,
        data: &T,
    ) -> Result<()> {
        let file = kind.relative_path(&sanitize_stem(stem));
        let path = self.root.join(&file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        let previous = self.index.entry(kind).or_default().insert(
            key,
            IndexEntry {
                file: file.clone(),
                cached_at: Utc::now(),
            },
        );
        if let Some(old) = previous.filter(|old| old.file != file) {
            self.remove_file(&old.file);
        }
        self.save_index()
    }

    pub fn remove(&mut self, kind: EntityKind, key: u64) -> Result<()> {
        let removed = self.index.get_mut(&kind).and_then(|m| m.remove(&key));
        if let Some(old) = removed {
            self.remove_file(&old.file);
            self.save_index()?;
        }
        Ok(())
    }

    fn remove_file(&self, file: &str) {
        let path = self.root.join(file);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove stale cache file");
            }
        }
    }

    /// All cached keys of a kind, ascending.
    pub fn list_keys(&self, kind: EntityKind) -> Vec<u64> {
        self.index
            .get(&kind)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Age of the most recently written document of a kind, for display.
    pub fn last_updated(&self, kind: EntityKind) -> Option<String> {
        self.index
            .get(&kind)?
            .values()
            .max_by_key(|e| e.cached_at)
            .map(|e| e.age_display())
    }

    /// Path a singleton document would have, for error messages.
    pub fn expected_path(&self, kind: EntityKind) -> PathBuf {
        let stem = match kind {
            EntityKind::AllTeams => ALL_TEAMS_STEM,
            _ => BOOTSTRAP_STEM,
        };
        self.root.join(kind.relative_path(stem))
    }

    // ===== Bootstrap =====

    pub fn load_bootstrap(&self) -> Result<Option<BootstrapStatic>> {
        self.read(EntityKind::Bootstrap, SINGLETON_KEY)
    }

    pub fn save_bootstrap(&mut self, bootstrap: &BootstrapStatic) -> Result<()> {
        self.write(EntityKind::Bootstrap, SINGLETON_KEY, BOOTSTRAP_STEM, bootstrap)
    }

    // ===== Managers =====

    pub fn load_manager_picks(&self, manager: ManagerId) -> Result<Option<Vec<ManagerPicks>>> {
        self.read(EntityKind::Manager, manager)
    }

    pub fn save_manager_picks(
        &mut self,
        nickname: &str,
        manager: ManagerId,
        picks: &[ManagerPicks],
    ) -> Result<()> {
        self.write(
            EntityKind::Manager,
            manager,
            &format!("{}_{}", nickname, manager),
            picks,
        )
    }

    // ===== Players =====

    pub fn load_player_history(&self, player: PlayerId) -> Result<Option<Vec<PlayerHistoryEntry>>> {
        self.read(EntityKind::Player, player.into())
    }

    pub fn save_player_history(
        &mut self,
        player: PlayerId,
        web_name: &str,
        history: &[PlayerHistoryEntry],
    ) -> Result<()> {
        self.write(
            EntityKind::Player,
            player.into(),
            &format!("{}_{}", player, web_name),
            history,
        )
    }

    // ===== Teams =====

    pub fn load_team(&self, team: TeamId) -> Result<Option<TeamInfo>> {
        self.read(EntityKind::Team, team.into())
    }

    pub fn save_team(&mut self, team: &TeamInfo) -> Result<()> {
        self.write(
            EntityKind::Team,
            team.id.into(),
            &format!("{}_{}", team.id, team.name),
            team,
        )
    }

    pub fn load_all_teams(&self) -> Result<Option<Vec<TeamInfo>>> {
        self.read(EntityKind::AllTeams, SINGLETON_KEY)
    }

    pub fn save_all_teams(&mut self, teams: &[TeamInfo]) -> Result<()> {
        self.write(EntityKind::AllTeams, SINGLETON_KEY, ALL_TEAMS_STEM, teams)
    }

    // ===== Gameweeks =====

    pub fn load_gameweek_general(&self, gameweek: GameweekId) -> Result<Option<EventInfo>> {
        self.read(EntityKind::GameweekGeneral, gameweek.into())
    }

    pub fn save_gameweek_general(&mut self, event: &EventInfo) -> Result<()> {
        self.write(
            EntityKind::GameweekGeneral,
            event.id.into(),
            &format!("{}{}", GAMEWEEK_PREFIX, event.id),
            event,
        )
    }

    pub fn load_gameweek_live(&self, gameweek: GameweekId) -> Result<Option<LiveGameweek>> {
        self.read(EntityKind::GameweekLive, gameweek.into())
    }

    pub fn save_gameweek_live(&mut self, gameweek: GameweekId, live: &LiveGameweek) -> Result<()> {
        self.write(
            EntityKind::GameweekLive,
            gameweek.into(),
            &format!("{}{}", GAMEWEEK_PREFIX, gameweek),
            live,
        )
    }

    // ===== Fixtures =====

    pub fn load_fixture(&self, fixture: FixtureId) -> Result<Option<ApiFixture>> {
        self.read(EntityKind::Fixture, fixture.into())
    }

    pub fn save_fixture(&mut self, fixture: &ApiFixture) -> Result<()> {
        let suffix = if fixture.finished { FINISHED_SUFFIX } else { "" };
        self.write(
            EntityKind::Fixture,
            fixture.id.into(),
            &format!("{}-{}-{}{}", fixture.id, fixture.team_h, fixture.team_a, suffix),
            fixture,
        )
    }

    /// The fixture is cached under its finished file name.
    pub fn is_fixture_final(&self, fixture: FixtureId) -> bool {
        self.entry(EntityKind::Fixture, fixture.into())
            .is_some_and(|e| e.file.ends_with(&format!("{}.json", FINISHED_SUFFIX)))
            && self.exists(EntityKind::Fixture, fixture.into())
    }
}

/// Keep names usable as file names on every platform.
fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
