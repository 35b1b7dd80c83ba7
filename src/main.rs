use jobboard_api::config::AppConfig;
use jobboard_api::state::AppState;
use jobboard_api::{database, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting job board API in {:?} mode", config.environment);

    let pool = database::connect(&config).await?;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);

    let state = AppState::new(pool, config);
    axum::serve(listener, routes::app(state)).await?;

    Ok(())
}
