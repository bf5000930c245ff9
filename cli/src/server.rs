// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server bootstrap
//!
//! Builds the storage backend named in the manifest, optionally seeds it,
//! wires the application services and serves the API until Ctrl+C or
//! SIGTERM.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info};

use park_core::application::repository_factory::{create_cage_repository, create_species_repository};
use park_core::application::ParkServices;
use park_core::domain::park_config::ParkConfigManifest;
use park_core::domain::repository::StorageBackend;
use park_core::infrastructure::db::Database;
use park_core::infrastructure::event_bus::{EventBus, EventBusError};
use park_core::infrastructure::seed::seed_park;
use park_core::presentation::api::{app, AppState};

pub async fn run_server(config: ParkConfigManifest) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    info!(park = %config.metadata.name, "Jurassic Park inventory service starting");

    let storage = &config.spec.storage;
    let pool = match storage {
        StorageBackend::InMemory => {
            info!("Using in-memory storage; data is lost on shutdown");
            None
        }
        StorageBackend::PostgreSQL(pg) => {
            let db = Database::new(pg).await?;
            db.ensure_schema().await?;
            info!("Connected to PostgreSQL");
            Some(db.get_pool().clone())
        }
    };

    let cage_repository = create_cage_repository(storage, pool.clone())?;
    let species_repository = create_species_repository(storage, pool)?;

    if config.spec.seed {
        let outcome = seed_park(cage_repository.as_ref(), species_repository.as_ref())
            .await
            .context("Failed to seed default park data")?;
        if !outcome.is_empty() {
            info!(cages = outcome.cages, species = outcome.species, "Default park data loaded");
        }
    }

    let event_bus = Arc::new(EventBus::with_default_capacity());
    spawn_event_logger(&event_bus);

    let services = ParkServices::new(cage_repository, species_repository, event_bus);
    let router = app(AppState::new(services.cage_service, services.species_service));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shut down");
    Ok(())
}

/// Mirror every domain event into the debug log
fn spawn_event_logger(event_bus: &EventBus) {
    let mut receiver = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!(?event, "Domain event"),
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
