//! Clue Board Back binary entrypoint wiring the intent pipeline, REST, and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clue_board_back::{
    config::AppConfig,
    dao::clue_lookup::{DailyDoubleLookup, memory::InMemoryClueLookup},
    routes,
    services::{auto_player, sse_events},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let lookup = build_lookup()?;
    let auto_play = config.auto_play;

    let app_state = AppState::new(config, lookup);
    app_state.retain_subscription(sse_events::bridge_intents(&app_state));
    if auto_play {
        info!("auto-play enabled; published intents will be animated on the shared display");
        app_state.retain_subscription(auto_player::spawn_auto_player(&app_state));
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the daily double lookup: the REST table when configured, otherwise an empty in-memory set.
#[cfg(feature = "rest-lookup")]
fn build_lookup() -> anyhow::Result<Arc<dyn DailyDoubleLookup>> {
    use clue_board_back::dao::clue_lookup::rest::{RestClueLookup, RestLookupConfig};

    match RestLookupConfig::from_env() {
        Ok(config) => {
            info!(base_url = %config.base_url, table = %config.table, "using REST clue lookup");
            let lookup = RestClueLookup::new(config).context("building REST clue lookup")?;
            Ok(Arc::new(lookup))
        }
        Err(err) => {
            info!(reason = %err, "REST clue lookup not configured; no clue is a daily double");
            Ok(Arc::new(InMemoryClueLookup::default()))
        }
    }
}

#[cfg(not(feature = "rest-lookup"))]
fn build_lookup() -> anyhow::Result<Arc<dyn DailyDoubleLookup>> {
    info!("built without REST lookup; no clue is a daily double");
    Ok(Arc::new(InMemoryClueLookup::default()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
