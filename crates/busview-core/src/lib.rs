//! Busview Core - Lazy cache of message bus object trees
//!
//! This crate mirrors the object hierarchy exported by a remote service:
//! - Introspection XML decoding and schema-tolerant parsing
//! - Pluggable introspection clients (busctl, saved dumps, in-memory fixtures)
//! - A lazily populated node tree with refresh and path resolution
//! - Event side channel for structural changes and introspection failures

pub mod client;
pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod path;
pub mod tree;

// Re-exports for convenience
pub use client::{
    BusKind, BusctlClient, FixtureClient, IntrospectError, IntrospectionClient, XmlDirClient,
};
pub use document::{Document, DocumentError, Element};
pub use error::TreeError;
pub use node::{MemberKind, Node, NodeId, NodeKind, Population};
pub use parser::{parse, ChildDescriptor, MemberDescriptor};
pub use tree::{
    CacheOptions, CacheStats, IntrospectionFailure, LazyTreeCache, SubscriptionId, TreeEvent,
};
