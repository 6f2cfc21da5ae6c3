/**
 * FOOTCARE KERNEL - Point d'entrée principal du serveur
 *
 * RÔLE : Orchestration des modules : config, store, simulateur, HTTP.
 * Bootstrap du système complet avec gestion d'erreurs et logging.
 */

use anyhow::Context;
use footcare_kernel::config::load_config;
use footcare_kernel::health::HealthTracker;
use footcare_kernel::http::{build_router, AppState};
use footcare_kernel::simulator::VitalsSimulator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("footcare_kernel=info")),
        )
        .init();

    let cfg = load_config().await;

    // store des mesures
    let store = cfg
        .storage
        .open_store()
        .with_context(|| format!("failed to open {:?} store at {}", cfg.storage.kind, cfg.storage.path))?;
    tracing::info!(kind = %store.info().kind, records = store.info().records, "[kernel] store ready");

    // simulateur unique pour tout le process
    let simulator = Arc::new(VitalsSimulator::with_system_clock(store, cfg.simulator.seed));
    if let Some(seed) = cfg.simulator.seed {
        tracing::info!(seed, "[kernel] simulator seeded");
    }

    let app_state = AppState {
        simulator,
        health_tracker: HealthTracker::new(),
    };
    let app = build_router(app_state);

    let listener = TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen))?;
    tracing::info!("[kernel] listening on http://{}", cfg.listen);
    axum::serve(listener, app).await.context("HTTP server stopped")?;
    Ok(())
}
