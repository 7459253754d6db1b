// Draft clock server entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Open database
// 4. Import the player pool
// 5. Ensure the seed league exists
// 6. Build the draft service and request handler
// 7. Spawn WebSocket server task
// 8. Spawn sweeper task (if enabled)
// 9. Wait for Ctrl+C
// 10. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};

use draftclock_core::config;
use draftclock_core::db;
use draftclock_core::draft::clock::ClockSettings;
use draftclock_core::pool;
use draftclock_core::seed;
use draftclock_core::service::DraftService;
use draftclock_server::handler::Handler;
use draftclock_server::sweeper;
use draftclock_server::ws_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file)
    init_tracing()?;
    info!("Draft clock server starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, {}s default pick clock",
        config.league.name,
        config.league.teams.len(),
        config.draft.default_pick_duration_secs
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Import the player pool
    let players = pool::load_from_paths(&config.data_paths).context("failed to load player pool")?;
    let imported = db
        .import_players(&players)
        .context("failed to import player pool")?;
    info!("Player pool ready: {} players from {}", imported, config.data_paths.players);

    // 5. Ensure the seed league exists
    let (league_id, created) =
        seed::ensure_seed_league(&db, &config.league).context("failed to seed league")?;
    if created {
        info!("Created league '{}' (id {})", config.league.name, league_id);
    } else {
        info!("Using existing league '{}' (id {})", config.league.name, league_id);
    }

    // 6. Build the draft service and request handler
    let service = Arc::new(DraftService::new(db, ClockSettings::from(&config.draft)));
    if config.credentials.sweep_secret.is_none() {
        info!("No sweep secret configured; remote SWEEP_TICK requests are disabled");
    }
    let handler = Handler::new(Arc::clone(&service), config.credentials.sweep_secret.clone());

    // 7. Spawn WebSocket server task
    let ws_port = config.ws_port;
    let ws_handle = tokio::spawn(async move {
        match ws_server::bind(ws_port).await {
            Ok(listener) => {
                if let Err(e) = ws_server::run(listener, handler).await {
                    error!("WebSocket server error: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to bind WebSocket server on port {}: {}", ws_port, e);
            }
        }
    });

    // 8. Spawn sweeper task (if enabled)
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = if config.sweep.enabled {
        let interval = Duration::from_secs(config.sweep.interval_secs);
        Some(tokio::spawn(sweeper::run(Arc::clone(&service), interval, shutdown_rx)))
    } else {
        warn!("Sweeper disabled; drafts only advance when clients read them");
        None
    };

    // 9. Wait for Ctrl+C
    info!("Server ready. WebSocket server listening on 127.0.0.1:{}", ws_port);
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    // 10. Cleanup: stop the sweeper between ticks, then drop the listener
    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    ws_handle.abort();

    info!("Draft clock server shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to `logs/draftclock.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftclock.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftclock_core=info,draftclock_server=info,draftclock=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
