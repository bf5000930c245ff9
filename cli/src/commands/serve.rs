// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `park serve` - run the HTTP API

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use park_core::domain::park_config::ParkConfigManifest;
use park_core::domain::repository::StorageBackend;

use crate::server;

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Insert the default cages and species when the store is empty
    #[arg(long)]
    pub seed: bool,

    /// Ignore any configured database and keep everything in memory
    #[arg(long, conflicts_with = "database_url")]
    pub in_memory: bool,

    /// PostgreSQL connection string (overrides the manifest)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,
}

pub async fn handle_command(
    args: ServeArgs,
    config_override: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = ParkConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &args, host, port);
    server::run_server(config).await
}

/// Command-line flags take precedence over the manifest and environment
pub fn apply_cli_overrides(
    config: &mut ParkConfigManifest,
    args: &ServeArgs,
    host: Option<String>,
    port: Option<u16>,
) {
    if let Some(host) = host {
        config.spec.server.host = host;
    }
    if let Some(port) = port {
        config.spec.server.port = port;
    }
    if args.seed {
        config.spec.seed = true;
    }
    if args.in_memory {
        config.spec.storage = StorageBackend::InMemory;
    } else if let Some(url) = &args.database_url {
        config.apply_overrides(|key| (key == "PARK_DATABASE_URL").then(|| url.clone()));
    }
}
