//! Servidor web Axum para identificar genes/metabólitos e inserir achados em coortes

mod config;
mod error;
mod routes;
mod views;

use std::sync::Arc;

use anyhow::Context;
use sickgenes_core::{demo_snapshot, MemoryStore, Snapshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::routes::{router, AppState};

const DEFAULT_LOG_FILTER: &str = "sickgenes_web=info,sickgenes_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = AppConfig::from_env()?;

    let snapshot = match &config.snapshot {
        Some(path) => Snapshot::load(path).with_context(|| format!("Failed to load snapshot {}", path.display()))?,
        None => {
            info!("Nenhum snapshot configurado, usando dados de demonstração");
            demo_snapshot()
        }
    };
    let store = MemoryStore::from_snapshot(snapshot)?;
    let app = router(Arc::new(AppState { store }));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("🚀 Servidor sickgenes iniciado em http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
