use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use log::{info, warn};
use storefront_service::application::realtime::{EventRelay, RealTimeSync};
use storefront_service::domain::events::EventBus;
use storefront_service::infrastructure::event_log::DieselEventLog;
use storefront_service::{build_server, create_pool, run_migrations, AppConfig, AppState};

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let pool = create_pool(&config.database_url)
        .map_err(|e| startup_error("Failed to create database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("Failed to run database migrations", e))?;

    let state = AppState::build(&pool, &config)
        .map_err(|e| startup_error("Failed to set up remote functions client", e))?;

    // The relay cursor is taken before the cache is filled so no change made
    // in between is missed.
    let bus = EventBus::new(config.event_bus_capacity);
    let event_log = Arc::new(DieselEventLog::new(pool.clone()));
    let relay = EventRelay::starting_at_latest(event_log, bus.clone())
        .await
        .map_err(|e| startup_error("Failed to read the event log", e))?;
    let updates = bus.subscribe();
    if let Err(e) = state.cache.refresh_all().await {
        warn!("Initial storefront cache load failed: {}", e);
    }
    tokio::spawn(RealTimeSync::new(state.cache.clone()).run(updates));
    tokio::spawn(relay.run(config.event_poll_interval));

    info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
