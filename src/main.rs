use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod health;
mod state;
mod users;

use crate::{config::AppConfig, state::AppState, users::PgUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "authd=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let pool = db::connect(&config.db).await?;
    db::migrate(&pool).await?;

    let (host, port) = (config.host.clone(), config.port);
    let state = AppState::new(config, Arc::new(PgUserStore::new(pool)))?;

    let app = app::build_app(state)?;
    app::serve(app, &host, port).await
}
