use std::sync::Arc;

use irecommend::{app, auth::provider::EmergentAuth, config::Config, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    let db_pool = db::connect(&config.database_url).await?;
    db::init_schema(&db_pool).await?;

    let state = AppState {
        db_pool,
        auth_provider: Arc::new(EmergentAuth::new(&config.auth_api_url)),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
