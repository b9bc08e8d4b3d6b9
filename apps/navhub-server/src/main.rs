use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use navhub_api::{build_router, AppState};
use navhub_core::domain::OrphanPolicy;
use navhub_core::services::{AuthService, CapacityPolicy, HierarchyService};
use navhub_infrastructure::build_store;
use navhub_security::JwtService;
use navhub_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env included)
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = navhub_shared::telemetry::init_telemetry(&config.logging)?;

    info!(env = %config.app.env, "NavHub server starting...");

    // Storage backend
    let store = build_store(&config.database).await?;

    // Services
    let jwt = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry));
    let auth = AuthService::new(store.users.clone(), jwt);

    let orphan_policy = OrphanPolicy::from_str(&config.hierarchy.orphan_policy)
        .with_context(|| format!("unknown orphan policy: {}", config.hierarchy.orphan_policy))?;
    let capacity = CapacityPolicy::new(
        config.hierarchy.max_menus,
        config.hierarchy.max_children_per_parent,
    );
    info!(
        max_menus = capacity.max_menus(),
        max_children_per_parent = capacity.max_children_per_parent(),
        orphan_policy = orphan_policy.as_str(),
        "Hierarchy limits configured"
    );
    let hierarchy = HierarchyService::new(store.menus.clone(), store.nodes.clone(), capacity, orphan_policy);

    // Build router
    let state = AppState::new(auth, hierarchy, store.health.clone());
    let app = build_router(state, &config.http);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("NavHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
