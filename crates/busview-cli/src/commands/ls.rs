//! Ls command - List the children of an object

use anyhow::Result;
use busview_config::BusviewConfig;
use clap::Args;
use serde::Serialize;

use super::{open_cache, resolve_or_bail, NodeSummary};
use crate::GlobalOptions;

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Object path to list
    #[arg(default_value = "/")]
    path: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct LsEntry {
    row: usize,
    #[serde(flatten)]
    node: NodeSummary,
}

/// Execute the ls command
pub fn execute(args: LsArgs, global: &GlobalOptions, config: &BusviewConfig) -> Result<()> {
    let mut cache = open_cache(global, config)?;
    let node = resolve_or_bail(&mut cache, &args.path)?;

    let entries: Vec<LsEntry> = cache
        .children(node)
        .into_iter()
        .enumerate()
        .filter_map(|(row, child)| {
            NodeSummary::of(&cache, child).map(|node| LsEntry { row, node })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:>3}  {:<10} {}", "#", "KIND", cache.header_text());
    for entry in &entries {
        println!(
            "{:>3}  {:<10} {}",
            entry.row,
            entry.node.kind.as_str(),
            entry.node.text
        );
    }
    Ok(())
}
