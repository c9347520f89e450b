use std::net::SocketAddr;

use anyhow::Context;

use doll_inventory::{
    auth::bootstrap::build_providers,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    migration,
    routes::app,
    state::AppState,
    storage::PhotoStorage,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let providers = build_providers(&cfg.auth)?;
    tracing::info!(mode = providers.active_mode().as_str(), "auth configured");

    migration::migrate(&cfg.database).await?;
    let db = connection::connect(&cfg.database).await?;

    let storage = PhotoStorage::new(cfg.storage.photos_dir.clone());
    storage
        .ensure_root()
        .await
        .with_context(|| format!("failed to create {}", storage.root().display()))?;

    let addr: SocketAddr = format!("{}:{}", cfg.general.host, cfg.general.port)
        .parse()
        .context("invalid host/port")?;
    let state = AppState::new(cfg, db, providers, storage);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
