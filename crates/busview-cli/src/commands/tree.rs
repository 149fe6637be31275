//! Tree command - Print the object tree below a path

use anyhow::Result;
use busview_config::BusviewConfig;
use busview_core::{LazyTreeCache, NodeId, NodeKind};
use clap::Args;
use serde::Serialize;

use super::{open_cache, print_info, resolve_or_bail};
use crate::GlobalOptions;

/// Arguments for the tree command
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Object path to start from
    #[arg(default_value = "/")]
    path: String,

    /// Maximum depth to expand (default: cache.max_depth)
    #[arg(long, short = 'd')]
    depth: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Print cache statistics to stderr when done
    #[arg(long)]
    stats: bool,
}

/// One node of a printed tree
#[derive(Debug, Serialize)]
struct TreeEntry {
    kind: NodeKind,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeEntry>,
}

/// Execute the tree command
pub fn execute(args: TreeArgs, global: &GlobalOptions, config: &BusviewConfig) -> Result<()> {
    let depth = args.depth.unwrap_or(config.cache.max_depth);

    let mut cache = open_cache(global, config)?;
    let start = resolve_or_bail(&mut cache, &args.path)?;
    let tree = build_entry(&mut cache, start, depth);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_entry(&tree, 0);
    }

    if args.stats {
        let stats = cache.stats();
        print_info(
            &format!(
                "{} introspections ({} failed), {} nodes, hit rate {:.0}%",
                stats.introspections,
                stats.failures,
                stats.live_nodes,
                stats.hit_rate() * 100.0
            ),
            global.quiet,
        );
    }

    Ok(())
}

/// Expand `node` down to `depth` levels; nodes at the limit are not populated
fn build_entry(cache: &mut LazyTreeCache, node: NodeId, depth: usize) -> TreeEntry {
    let children = if depth == 0 {
        Vec::new()
    } else {
        cache
            .children(node)
            .into_iter()
            .map(|child| build_entry(cache, child, depth - 1))
            .collect()
    };

    TreeEntry {
        kind: cache.kind(node).unwrap_or(NodeKind::Namespace),
        text: cache.display_text(node).unwrap_or_default().to_string(),
        signature: cache.type_signature(node).map(str::to_string),
        children,
    }
}

fn print_entry(entry: &TreeEntry, indent: usize) {
    match entry.signature {
        Some(ref signature) if !signature.is_empty() => {
            println!("{:indent$}{} ({})", "", entry.text, signature, indent = indent)
        }
        _ => println!("{:indent$}{}", "", entry.text, indent = indent),
    }
    for child in &entry.children {
        print_entry(child, indent + 2);
    }
}
