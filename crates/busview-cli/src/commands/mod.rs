//! CLI command implementations
//!
//! This module contains all busview CLI command implementations.

pub mod config;
pub mod ls;
pub mod member;
pub mod resolve;
pub mod tree;

use anyhow::{Context, Result};
use busview_config::{BusType, BusviewConfig, ConfigLoader};
use busview_core::{
    BusKind, BusctlClient, CacheOptions, LazyTreeCache, NodeId, NodeKind, TreeEvent, XmlDirClient,
};
use serde::Serialize;
use tracing::debug;

use crate::GlobalOptions;

/// Load configuration, honouring `--config` and the CLI overrides.
pub fn load_config(global: &GlobalOptions) -> Result<BusviewConfig> {
    let overrides = global.to_config_overrides();
    let mut loader = ConfigLoader::new();

    let config = if let Some(ref config_path) = global.config {
        loader
            .load_file(config_path, Some(&overrides))
            .context("Failed to load config file")?
    } else {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        loader
            .load(&cwd, Some(&overrides))
            .context("Failed to load configuration")?
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build a tree cache for the configured service.
///
/// Introspection failures are printed as warnings unless `--quiet` is set.
pub fn open_cache(global: &GlobalOptions, config: &BusviewConfig) -> Result<LazyTreeCache> {
    let options = CacheOptions {
        retry_failed: config.cache.retry_failed,
    };

    let mut cache = if let Some(ref dir) = global.fixtures {
        if !dir.is_dir() {
            anyhow::bail!("Fixture directory not found: {}", dir.display());
        }
        let mut client = XmlDirClient::new(dir);
        if let Some(ref service) = config.connection.service {
            client = client.with_service(service.clone());
        }
        debug!("Using introspection dumps from {}", dir.display());
        LazyTreeCache::with_options(client, options)
    } else {
        let Some(service) = config.connection.service.clone() else {
            anyhow::bail!("No service given: pass --service or set connection.service");
        };
        let bus = match config.connection.bus {
            BusType::Session => BusKind::Session,
            BusType::System => BusKind::System,
        };
        let client = BusctlClient::new(bus, service)
            .with_program(&config.connection.busctl_path)
            .with_timeout(config.timeout());
        LazyTreeCache::with_options(client, options)
    };

    let quiet = global.quiet;
    cache.subscribe(move |event| {
        if let TreeEvent::IntrospectionFailed(failure) = event {
            if !quiet {
                print_warning(&failure.message);
            }
        }
    });

    Ok(cache)
}

/// Resolve `path`, failing with "object path not found" on a miss.
pub fn resolve_or_bail(cache: &mut LazyTreeCache, path: &str) -> Result<NodeId> {
    cache
        .resolve_path(path)?
        .ok_or_else(|| anyhow::anyhow!("object path not found: {}", path))
}

/// A node as shown in command output
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub kind: NodeKind,
    pub text: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl NodeSummary {
    /// Summarize a live node, `None` for stale handles
    pub fn of(cache: &LazyTreeCache, node: NodeId) -> Option<Self> {
        Some(Self {
            kind: cache.kind(node)?,
            text: cache.display_text(node)?.to_string(),
            path: cache.full_path(node)?,
            interface: cache
                .interface_name(node)
                .filter(|_| cache.kind(node) != Some(NodeKind::Interface))
                .map(str::to_string),
            signature: cache.type_signature(node).map(str::to_string),
        })
    }
}

/// Print a warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!("warning: {}", message);
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
