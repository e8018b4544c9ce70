//! fplstats - keep a local Fantasy Premier League cache and query stats from it.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fplstats_core::api::client::DEFAULT_BASE_URL;
use fplstats_core::read::{Fixture, Gameweek, League, Manager, Player, StatEvent, Team};
use fplstats_core::stats::{self, RateKind, Statistic};
use fplstats_core::{
    spawn_refresh, CacheStore, Config, EntityKind, FplClient, RefreshEvent, StandingsQuery,
    SyncEngine, SyncKind,
};

/// Log file name prefix in the cache root
const LOG_FILE: &str = "fplstats.log";

/// Scratch file used to check the log directory, removed right away
const WRITE_TEST_FILE: &str = ".fplstats_write_test";

#[derive(Parser)]
#[command(name = "fplstats", version, about = "Fantasy Premier League stats from a local season cache")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "FPLSTATS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bring the season cache up to date
    Refresh {
        /// Only sync one kind: bootstrap, teams, gameweeks, fixtures, managers, players
        #[arg(long)]
        only: Option<SyncKind>,
    },
    /// Show the configured season and what is cached
    Status,
    #[command(flatten)]
    Query(QueryCommand),
    /// Inspect or edit the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that read the season cache or query the API
#[derive(Subcommand)]
enum QueryCommand {
    /// Extra points a manager earned through captaincy over a gameweek range
    Captaincy {
        /// Manager nickname or id
        manager: String,
        #[arg(long, default_value_t = 1)]
        from: u32,
        /// Defaults to the last finished gameweek
        #[arg(long)]
        to: Option<u32>,
    },
    /// Per-90-minutes or per-game rate of a statistic for one player
    Rate {
        /// Player id or web name
        player: String,
        statistic: String,
        #[arg(long)]
        per_game: bool,
    },
    /// Points a player scored in one gameweek
    Points { player: String, gameweek: u32 },
    /// Statistic totals over recent games
    Recent(RecentArgs),
    /// Show a cached fixture with its stat events
    Fixture { id: u32 },
    /// Look a team up by short name
    Team { short_name: String },
    /// Show a manager and their captain for one gameweek
    Manager {
        /// Manager nickname or id
        manager: String,
        #[arg(long)]
        gameweek: Option<u32>,
    },
    /// League standings
    League {
        /// League nickname or id
        league: String,
        /// CLASSIC or H2H
        #[arg(long = "type", default_value = "CLASSIC")]
        league_type: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        phase: Option<u32>,
    },
    /// Gameweek flags and top live scorers
    Gameweek {
        id: u32,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(Args)]
struct RecentArgs {
    statistic: String,
    /// Number of most recent games
    #[arg(long, default_value_t = 5)]
    last: usize,
    /// Single player id or web name; ranks every cached player when omitted
    #[arg(long)]
    player: Option<String>,
    #[arg(long, default_value_t = 20)]
    top: usize,
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    AddManager { nickname: String, id: u64 },
    RemoveManager { nickname: String },
    AddLeague { nickname: String, id: u64 },
    RemoveLeague { nickname: String },
    /// Switch the active season (year the season ends, e.g. 2024)
    Season { season: String },
}

/// Initialize the tracing subscriber: stderr plus a daily log file when the
/// directory is writable. The returned guard must outlive logging.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // rolling::daily panics if it cannot create the file, so check first
    let writable_dir = log_dir.filter(|dir| log_dir_writable(dir));

    let (file_layer, guard) = match writable_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Create `dir` if needed and check a file can be created in it.
fn log_dir_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let test_path = dir.join(WRITE_TEST_FILE);
    match std::fs::OpenOptions::new().create(true).append(true).open(&test_path) {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);
            true
        }
        Err(_) => false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _guard = init_tracing(config.cache_root().ok().as_deref());
    info!(season = %config.season, "fplstats starting");

    match cli.command {
        Command::Config(cmd) => run_config(&mut config, cmd),
        Command::Refresh { only } => refresh(config, only).await,
        Command::Status => status(&config),
        Command::Query(command) => {
            let client = client(&config)?;
            let store = open_store(&config)?;
            query(command, &config, &store, &client).await
        }
    }
}

fn client(config: &Config) -> Result<FplClient> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    Ok(FplClient::with_base_url(base_url)?)
}

fn open_store(config: &Config) -> Result<CacheStore> {
    let dir = config.cache_dir()?;
    CacheStore::open(&dir).with_context(|| format!("Failed to open season cache {}", dir.display()))
}

async fn refresh(config: Config, only: Option<SyncKind>) -> Result<()> {
    let client = client(&config)?;
    let store = open_store(&config)?;
    let mut engine = SyncEngine::new(client, store, config);

    if let Some(kind) = only {
        let outcome = engine.sync(kind).await?;
        println!("{}", outcome);
        return Ok(());
    }

    let (mut rx, handle) = spawn_refresh(engine);
    while let Some(event) = rx.recv().await {
        match event {
            RefreshEvent::Started(kind) => eprintln!("Refreshing {}...", kind),
            RefreshEvent::Finished(outcome) => println!("{}", outcome),
            RefreshEvent::Complete(report) => println!("{}", report.status_message()),
        }
    }
    handle.await.context("Refresh task failed")?;
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    println!("Season:                 {}", config.season);
    println!("Last finished gameweek: {}", config.last_finished_gameweek);
    println!("Cache:                  {}", store.root().display());
    println!();
    for kind in EntityKind::ALL {
        let count = store.list_keys(kind).len();
        let updated = store.last_updated(kind).unwrap_or_else(|| "never".to_string());
        println!("{:<18} {:>5}  {}", format!("{:?}", kind), count, updated);
    }
    println!();
    for (nickname, id) in &config.managers {
        let cached = store.load_manager_picks(*id)?.map(|h| h.len()).unwrap_or(0);
        println!("manager {:<12} {:>10}  {} gameweeks cached", nickname, id, cached);
    }
    Ok(())
}

async fn query(command: QueryCommand, config: &Config, store: &CacheStore, client: &FplClient) -> Result<()> {
    match command {
        QueryCommand::Captaincy { manager, from, to } => {
            let manager_id = resolve_manager(config, &manager)?;
            let to = to.unwrap_or(config.last_finished_gameweek);
            if from == 0 || to < from {
                bail!("Empty gameweek range {}..={}", from, to);
            }
            let mut model = Manager::new(manager_id);
            model.nickname = config.manager_nickname(manager_id).map(String::from);
            let points = match stats::extra_captaincy_points(store, &model, from..=to) {
                Ok(points) => points,
                Err(e) => {
                    warn!(manager = manager_id, error = %e, "Cache does not cover the range, asking the API");
                    stats::extra_captaincy_points_remote(client, manager_id, from..=to)
                        .await
                        .context("Captaincy data unavailable, try again later")?
                }
            };
            for (gameweek, extra) in (from..=to).zip(&points) {
                println!("GW{:<3} {:>4}", gameweek, extra);
            }
            println!("Total {:>4}", points.iter().sum::<i64>());
        }
        QueryCommand::Rate {
            player,
            statistic,
            per_game,
        } => {
            let player = resolve_player(store, &player)?;
            let history = player.history(store)?;
            let kind = if per_game { RateKind::PerGame } else { RateKind::Per90Minutes };
            match stats::rate(&history, &statistic, kind)? {
                Some(value) => println!("{} {} {:?}: {:.2}", player, statistic, kind, value),
                None => println!("{} has not played yet", player),
            }
        }
        QueryCommand::Points { player, gameweek } => {
            let player = resolve_player(store, &player)?;
            let history = player.history(store)?;
            let points = stats::points_for_player_in_gameweek(&history, gameweek);
            println!("{} scored {} points in gameweek {}", player, points, gameweek);
        }
        QueryCommand::Recent(args) => recent(store, args)?,
        QueryCommand::Fixture { id } => {
            let mut fixture = Fixture::new(id);
            fixture.hydrate(store)?;
            println!("{}", fixture);
            for event in fixture.events.values() {
                let names = |side: &[StatEvent]| {
                    side.iter()
                        .map(|e| format!("{} ({})", e.player, e.value))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("  {:<18} home: {}", event.identifier, names(&event.home));
                println!("  {:<18} away: {}", "", names(&event.away));
            }
        }
        QueryCommand::Team { short_name } => {
            let team = Team::from_short_name(store, &short_name)?;
            println!("{}", team);
        }
        QueryCommand::Manager { manager, gameweek } => {
            let mut model = Manager::new(resolve_manager(config, &manager)?);
            model.hydrate(config, client).await?;
            println!("{}", model);
            if let Some(gameweek) = gameweek {
                let picks = model.picks_for_gameweek(store, gameweek)?;
                println!(
                    "Gameweek {}: {} points, chip {}",
                    gameweek,
                    picks.entry_history.points,
                    picks.active_chip.as_deref().unwrap_or("none")
                );
                match stats::effective_captain(&picks) {
                    Some(captaincy) => {
                        let mut player = Player::new(captaincy.player);
                        player.hydrate(store)?;
                        let role = if captaincy.vice_captain_stood_in { "vice-captain" } else { "captain" };
                        let chip = if captaincy.triple_captain { " (triple)" } else { "" };
                        println!("Effective {}: {}{}", role, player, chip);
                    }
                    None => println!("No effective captain"),
                }
            }
        }
        QueryCommand::League {
            league,
            league_type,
            page,
            phase,
        } => {
            let id = config
                .resolve_league(&league)
                .with_context(|| format!("Unknown league {}", league))?;
            let mut model = League::with_type_name(id, &league_type)?;
            let query = StandingsQuery {
                page_new_entries: None,
                page_standings: page,
                phase,
            };
            model.hydrate(client, query).await?;
            if model.name.is_none() {
                bail!("Standings for league {} unavailable, try again later", id);
            }
            println!("{}", model);
            for entry in model.entries() {
                println!(
                    "{:>4}. {:<28} {:<24} {:>5} ({:+})",
                    entry.rank, entry.entry_name, entry.player_name, entry.total, entry.event_total
                );
            }
        }
        QueryCommand::Gameweek { id, top } => {
            let mut gameweek = Gameweek::new(id);
            gameweek.hydrate(store, client).await?;
            let flag = |v: Option<bool>| v.map(|b| b.to_string()).unwrap_or_else(|| "unknown".to_string());
            println!(
                "{}: finished {}, data checked {}",
                gameweek,
                flag(gameweek.finished()),
                flag(gameweek.data_checked())
            );
            let bootstrap = store.load_bootstrap()?;
            for (player_id, points) in gameweek.top_scorers(top) {
                let mut player = Player::new(player_id);
                if let Some(bootstrap) = &bootstrap {
                    player.hydrate_from(bootstrap);
                }
                println!("  {:<20} {:>3}", player, points);
            }
        }
    }
    Ok(())
}

fn recent(store: &CacheStore, args: RecentArgs) -> Result<()> {
    let stat: Statistic = args.statistic.parse()?;

    if let Some(player) = args.player {
        let player = resolve_player(store, &player)?;
        let history = player.history(store)?;
        let total = stats::total_over_last(&history, stat, args.last);
        println!("{} {} over the last {} games: {}", player, stat, args.last, total);
        return Ok(());
    }

    let bootstrap = store
        .load_bootstrap()?
        .context("No bootstrap data cached, run `fplstats refresh` first")?;
    let mut histories = Vec::new();
    for key in store.list_keys(EntityKind::Player) {
        let Ok(id) = u32::try_from(key) else {
            continue;
        };
        match store.load_player_history(id) {
            Ok(Some(history)) => histories.push((id, history)),
            Ok(None) => {}
            Err(e) => warn!(player = id, error = %e, "Skipping unreadable player history"),
        }
    }

    let board = stats::leaderboard(
        histories.iter().map(|(id, h)| (*id, h.as_slice())),
        stat,
        args.last,
        args.top,
    );
    for (rank, (id, mean)) in board.iter().enumerate() {
        let name = bootstrap.player_web_name(*id).unwrap_or("?");
        println!("{:>3}. {:<20} {:.2}", rank + 1, name, mean);
    }
    Ok(())
}

fn resolve_manager(config: &Config, name_or_id: &str) -> Result<u64> {
    config
        .resolve_manager(name_or_id)
        .with_context(|| format!("Unknown manager {}", name_or_id))
}

/// A player by id, exact web name, or a unique name fragment.
fn resolve_player(store: &CacheStore, name_or_id: &str) -> Result<Player> {
    if let Ok(id) = name_or_id.parse() {
        let mut player = Player::new(id);
        player.hydrate(store)?;
        return Ok(player);
    }

    let bootstrap = store
        .load_bootstrap()?
        .context("No bootstrap data cached, run `fplstats refresh` first")?;
    let id = match bootstrap.player_id_by_web_name(name_or_id) {
        Some(id) => id,
        None => match bootstrap.search_players(name_or_id).as_slice() {
            [single] => single.id,
            [] => bail!("No player matches {}", name_or_id),
            many => bail!(
                "{} players match {}: {}",
                many.len(),
                name_or_id,
                many.iter().map(|e| e.web_name.as_str()).collect::<Vec<_>>().join(", ")
            ),
        },
    };
    let mut player = Player::new(id);
    player.hydrate_from(&bootstrap);
    Ok(player)
}

fn run_config(config: &mut Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", describe_config(config)?);
            return Ok(());
        }
        ConfigCommand::AddManager { nickname, id } => config.add_manager(&nickname, id)?,
        ConfigCommand::RemoveManager { nickname } => {
            config.remove_manager(&nickname)?;
        }
        ConfigCommand::AddLeague { nickname, id } => config.add_league(&nickname, id)?,
        ConfigCommand::RemoveLeague { nickname } => {
            config.remove_league(&nickname)?;
        }
        ConfigCommand::Season { season } => config.set_season(&season)?,
    }
    config.save()?;
    println!("Configuration saved");
    Ok(())
}

fn describe_config(config: &Config) -> Result<String> {
    let mut lines = vec![
        format!("season: {}", config.season),
        format!("last_finished_gameweek: {}", config.last_finished_gameweek),
    ];
    if let Some(path) = config.path() {
        lines.push(format!("file: {}", path.display()));
    }
    lines.push(format!("cache: {}", config.cache_dir()?.display()));
    lines.extend(config.managers.iter().map(|(n, id)| format!("manager {}: {}", n, id)));
    lines.extend(config.leagues.iter().map(|(n, id)| format!("league {}: {}", n, id)));
    Ok(lines.join("\n"))
}
