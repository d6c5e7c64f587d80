use anyhow::Result;
use shared::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod handlers;
mod routes;
mod session;
mod state;

use state::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    info!("Starting dashboard server...");
    info!("Population data: {}", config.population_csv_path);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Dashboard listening on http://{}", bind_addr);
    info!("Pages: /map, /population, /stocks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
