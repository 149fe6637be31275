//! Resolve command - Resolve an object path to its canonical form

use anyhow::Result;
use busview_config::BusviewConfig;
use clap::Args;
use serde::Serialize;

use super::{open_cache, resolve_or_bail};
use crate::GlobalOptions;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Object path to resolve
    path: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Resolved {
    path: String,
    children: usize,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, global: &GlobalOptions, config: &BusviewConfig) -> Result<()> {
    let mut cache = open_cache(global, config)?;
    let node = resolve_or_bail(&mut cache, &args.path)?;

    let resolved = Resolved {
        path: cache.full_path(node).unwrap_or_default(),
        children: cache.child_count(node),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        println!("{}", resolved.path);
    }
    Ok(())
}
