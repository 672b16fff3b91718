use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::db::PgVideoStore;
use crate::services::aspect_ratio::FfprobeProber;
use crate::services::object_storage::S3Storage;
use crate::state::AppState;

async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    // Create assets directory if it doesn't exist
    tokio::fs::create_dir_all(&config.storage.assets_root)
        .await
        .with_context(|| {
            format!(
                "Failed to create assets directory {:?}",
                config.storage.assets_root
            )
        })?;

    let pool = db::create_pool(&config.database.url, config.database.max_connections)
        .context("Failed to create database pool")?;

    let storage = S3Storage::new(
        config.storage.s3_bucket.clone(),
        config.storage.s3_region.clone(),
    )
    .await;

    let prober = FfprobeProber::new(config.ffprobe.path.clone(), config.ffprobe.timeout());

    Ok(AppState {
        videos: Arc::new(PgVideoStore::new(pool)),
        storage: Arc::new(storage),
        prober: Arc::new(prober),
        config,
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    env_logger::init();

    let config = AppConfig::new().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::other(e)
    })?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let assets_root = config.storage.assets_root.clone();

    let state = build_state(config).await.map_err(|e| {
        log::error!("{:#}", e);
        std::io::Error::other(e.to_string())
    })?;
    let state = web::Data::new(state);

    log::info!("Starting server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(actix_cors::Cors::permissive())
            .app_data(state.clone())
            .service(Files::new("/assets", assets_root.clone()))
            .configure(api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
