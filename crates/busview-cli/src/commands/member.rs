//! Member command - Show a single interface member

use anyhow::Result;
use busview_config::BusviewConfig;
use busview_core::{LazyTreeCache, NodeId, NodeKind};
use clap::Args;

use super::{open_cache, resolve_or_bail, NodeSummary};
use crate::GlobalOptions;

/// Arguments for the member command
#[derive(Args, Debug)]
pub struct MemberArgs {
    /// Object path exporting the interface
    path: String,

    /// Interface name (e.g. org.freedesktop.DBus.Peer)
    interface: String,

    /// Method, signal or property name
    member: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the member command
pub fn execute(args: MemberArgs, global: &GlobalOptions, config: &BusviewConfig) -> Result<()> {
    let mut cache = open_cache(global, config)?;
    let object = resolve_or_bail(&mut cache, &args.path)?;

    let interface = find_child(&mut cache, object, &args.interface, |kind| {
        kind == NodeKind::Interface
    })
    .ok_or_else(|| {
        anyhow::anyhow!(
            "interface {} not found at {}",
            args.interface,
            args.path
        )
    })?;

    let member = find_child(&mut cache, interface, &args.member, |kind| {
        kind != NodeKind::Interface && kind != NodeKind::Namespace
    })
    .ok_or_else(|| {
        anyhow::anyhow!(
            "member {} not found in interface {}",
            args.member,
            args.interface
        )
    })?;

    let summary = NodeSummary::of(&cache, member)
        .ok_or_else(|| anyhow::anyhow!("member {} disappeared", args.member))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.text);
    println!("  kind:      {}", summary.kind);
    println!("  object:    {}", summary.path);
    if let Some(ref interface) = summary.interface {
        println!("  interface: {}", interface);
    }
    if let Some(ref signature) = summary.signature {
        println!("  signature: {}", signature);
    }
    Ok(())
}

/// First child of `parent` with the given name whose kind passes `accept`
fn find_child(
    cache: &mut LazyTreeCache,
    parent: NodeId,
    name: &str,
    accept: impl Fn(NodeKind) -> bool,
) -> Option<NodeId> {
    cache.children(parent).into_iter().find(|child| {
        cache.member_name(*child) == Some(name) && cache.kind(*child).is_some_and(&accept)
    })
}
