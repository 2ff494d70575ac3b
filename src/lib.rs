use std::path::Path;

use crate::coach::Coach;
use crate::model::{DatabaseError, DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod coach;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "ringside";

/// Applies the schema in `./migrations`.
pub async fn migrate(db: &DbConnection) -> AppResult<()> {
    let migrator = Migrator::new(Path::new("./migrations"))
        .await
        .map_err(DatabaseError::from)?;
    tracing::debug!("applying migrations...");
    migrator.run(db.pool()).await.map_err(DatabaseError::from)?;
    Ok(())
}

/// Router over an existing connection, without reading any configuration.
pub fn build_router(db: DbConnection, coach: Coach, jwt_secret: &str, docs: bool) -> AppResult<(AppState, Router)> {
    tracing::info!(
        "AI coach {}, {} messages per user a day",
        if coach.is_configured() { "enabled" } else { "answers with a placeholder" },
        coach.daily_limit()
    );
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, coach, jwt_secret);
    let app = web::routes::build_app(state.clone(), utils::uploads::get_uploads_dir()?, docs);
    Ok((state, app))
}

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;

    let db = DbConnection::connect(config.app().database_uri())?;
    migrate(&db).await?;

    let coach = Coach::from_config(config.coach())?;
    build_router(db, coach, config.app().jwt(), config.app().docs())
}

pub async fn build_server_with_pool(db: DbConnection) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;
    let coach = Coach::from_config(config.coach())?;
    build_router(db, coach, config.app().jwt(), config.app().docs())
}

pub async fn build_server_with_coach(db: DbConnection, coach: Coach) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;
    build_router(db, coach, config.app().jwt(), config.app().docs())
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (_, app) = build_server().await?;
    let config = Config::get_or_init(cfg!(debug_assertions)).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
