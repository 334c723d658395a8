// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Directory HTTP server wiring

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use agora_core::{
    application::{
        repository_factory, NegotiationService, RequestLimits, SessionRegistry,
        StandardNegotiationService,
    },
    domain::{
        config::DirectoryConfigManifest,
        repository::{AgentDirectory, StorageBackend},
    },
    infrastructure::{db::Database, KeyedRateLimitStore},
    presentation::{
        access::OpenAccess,
        api::{self, AppState},
    },
};

use crate::seed;

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run(config: DirectoryConfigManifest, agents: Option<PathBuf>) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    info!("Agora directory '{}' starting", config.metadata.name);

    if let Some(port) = config.spec.observability.metrics_port {
        let addr: SocketAddr = format!("{}:{}", config.spec.server.bind_address, port)
            .parse()
            .with_context(|| format!("Invalid metrics address for port {}", port))?;
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics on {}", addr);
    }

    // Storage
    let backend = config.spec.storage.backend();
    let database = match &backend {
        StorageBackend::PostgreSQL(pg) => {
            let db = Database::new(pg)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.ensure_schema().await.context("Failed to ensure schema")?;
            info!("Storage backend: postgres");
            Some(db)
        }
        StorageBackend::InMemory => {
            info!("Storage backend: in-memory");
            None
        }
    };

    let directory: Arc<dyn AgentDirectory> = match (&backend, agents) {
        (StorageBackend::InMemory, Some(path)) => Arc::new(seed::load_directory(&path).await?),
        (StorageBackend::PostgreSQL(_), Some(path)) => {
            warn!("Ignoring agent seed file {:?}: agents are read from PostgreSQL", path);
            repository_factory::create_agent_directory(&backend, database.as_ref())?
        }
        (_, None) => repository_factory::create_agent_directory(&backend, database.as_ref())?,
    };
    let store = repository_factory::create_session_store(&backend, database.as_ref())?;

    // Services
    let limits = RequestLimits::from(&config.spec.limits);
    let sessions = Arc::new(SessionRegistry::new(store, limits));
    let negotiation: Arc<dyn NegotiationService> =
        Arc::new(StandardNegotiationService::new(directory, sessions.clone()));

    let mut state = AppState::new(negotiation, sessions, Arc::new(OpenAccess));

    if let Some(limiter) = KeyedRateLimitStore::from_config(&config.spec.rate_limit)? {
        let limiter = Arc::new(limiter);
        info!(
            "Rate limiting: {} req/min per principal",
            config.spec.rate_limit.requests_per_minute
        );
        spawn_rate_limit_pruner(limiter.clone());
        state = state.with_rate_limiter(limiter);
    }

    let app = api::router(state);

    let addr = format!(
        "{}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Directory API listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    info!("Directory shutting down");

    Ok(())
}

fn spawn_rate_limit_pruner(limiter: Arc<KeyedRateLimitStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.prune();
            tracing::debug!("Rate limiter tracking {} principals", limiter.tracked_keys());
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
