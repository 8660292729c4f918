// Framework bootstrap for the platformer server runtime.

use crate::domain::GameConfig;
use crate::frameworks::config;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::interface_adapters::store::InMemoryStore;
use crate::use_cases::{SessionLimits, SessionRegistry, SessionSettings, seed_defaults};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serves the API on `listener` with default tuning.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    serve(listener, GameConfig::default()).await
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let game_config = config::game_config().inspect_err(|e| {
        tracing::error!(error = %e, "failed to load game config");
    })?;

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    serve(listener, game_config).await
}

async fn serve(listener: tokio::net::TcpListener, game_config: GameConfig) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(game_config).await?;
    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

async fn build_state(game_config: GameConfig) -> Result<AppState> {
    game_config
        .validate()
        .map_err(|e| std::io::Error::other(format!("invalid game config: {e:?}")))?;

    let store = InMemoryStore::with_session_retention(config::SESSION_RECORD_RETENTION);

    // Levels are immutable once seeded; sessions always start from level 1 unless told otherwise.
    let default_level_id = seed_defaults(&store, &game_config)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to seed default level: {e:?}")))?;

    tracing::debug!(
        tick_interval_us = config::TICK_INTERVAL.as_micros(),
        input_channel_capacity = config::INPUT_CHANNEL_CAPACITY,
        update_broadcast_capacity = config::UPDATE_BROADCAST_CAPACITY,
        max_paused_secs = config::MAX_PAUSED_DURATION.as_secs(),
        max_run_secs = config::MAX_RUN_DURATION.as_secs(),
        "session settings"
    );

    // Setup Session Registry
    // This owns the set of running session drivers.
    let registry = Arc::new(SessionRegistry::new(
        SessionSettings {
            input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
            update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
            tick_interval: config::TICK_INTERVAL,
            limits: SessionLimits {
                max_paused: config::MAX_PAUSED_DURATION,
                max_run: config::MAX_RUN_DURATION,
            },
        },
        Arc::new(store),
        Arc::new(game_config),
        Arc::new(SystemClock),
    ));

    Ok(AppState {
        registry,
        default_level_id,
    })
}
