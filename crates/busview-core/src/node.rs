//! Object Tree Node Definitions
//!
//! This module defines the entries of the cached object tree:
//! - `NodeKind`: object path segments (namespaces) and interface members
//! - `Node`: a single cached entry with its display caption and metadata
//! - `NodeId`: a generation-checked handle into the tree store
//!
//! Namespace nodes are fetched lazily. Every other kind is a leaf of the
//! remote hierarchy and is considered populated from the moment it exists.

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::path::SEPARATOR;

// ============================================================================
// Node Kinds
// ============================================================================

/// Kind of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Object path segment, may hold further children
    Namespace,
    /// Interface exported by an object
    Interface,
    /// Interface method
    Method,
    /// Interface signal
    Signal,
    /// Interface property
    Property,
}

impl NodeKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Namespace => "namespace",
            NodeKind::Interface => "interface",
            NodeKind::Method => "method",
            NodeKind::Signal => "signal",
            NodeKind::Property => "property",
        }
    }

    /// Label prefix used when deriving a caption, if this kind has one
    fn caption_label(&self) -> Option<&'static str> {
        match self {
            NodeKind::Method => Some("Method"),
            NodeKind::Signal => Some("Signal"),
            NodeKind::Property => Some("Property"),
            NodeKind::Namespace | NodeKind::Interface => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds a parsed member descriptor may carry.
///
/// A strict subset of [`NodeKind`]: namespaces are never members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Interface,
    Method,
    Signal,
    Property,
}

impl From<MemberKind> for NodeKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Interface => NodeKind::Interface,
            MemberKind::Method => NodeKind::Method,
            MemberKind::Signal => NodeKind::Signal,
            MemberKind::Property => NodeKind::Property,
        }
    }
}

// ============================================================================
// Population State
// ============================================================================

/// Population state of a node.
///
/// `Populating` never needs a variant: it only exists for the duration of a
/// single synchronous `ensure_populated` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    /// Children have never been fetched
    Unpopulated,
    /// Children were fetched and materialized
    Populated,
    /// The last introspection failed; the node has no children
    Failed,
}

// ============================================================================
// Node Handles
// ============================================================================

/// Handle to a node owned by a [`LazyTreeCache`](crate::LazyTreeCache).
///
/// Handles carry the serial number of the node they were issued for, so a
/// handle to a node discarded by a refresh never resolves to a node created
/// later in the same storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: NodeIndex,
    pub(crate) serial: u64,
}

impl NodeId {
    pub(crate) fn new(index: NodeIndex, serial: u64) -> Self {
        Self { index, serial }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A single entry in the cached object tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Entry kind
    pub kind: NodeKind,

    /// Raw identifier. Namespace names carry one trailing separator
    /// (`"/"` for the root, `"sub/"` otherwise).
    pub name: String,

    /// Human-readable label (e.g. "Method: Foo"), empty when the name is shown
    pub caption: String,

    /// Kind-specific metadata: the input signature for methods
    pub extra: Option<String>,

    /// Population state
    pub population: Population,

    /// Ordered children, replaced wholesale on refresh
    pub(crate) children: Vec<NodeId>,

    /// Serial number assigned by the store
    pub(crate) serial: u64,
}

impl Node {
    /// Create the root namespace node
    pub fn root() -> Self {
        Self::namespace(SEPARATOR.to_string())
    }

    /// Create an unpopulated namespace node.
    ///
    /// `name` must already carry its trailing separator.
    pub fn namespace(name: String) -> Self {
        Self {
            kind: NodeKind::Namespace,
            name,
            caption: String::new(),
            extra: None,
            population: Population::Unpopulated,
            children: Vec::new(),
            serial: 0,
        }
    }

    /// Create a member node (interface, method, signal or property).
    ///
    /// Members are populated on construction; the caption is derived once here.
    pub fn member(kind: MemberKind, name: String, extra: Option<String>) -> Self {
        let kind = NodeKind::from(kind);
        let caption = kind
            .caption_label()
            .map(|label| format!("{}: {}", label, name))
            .unwrap_or_default();

        Self {
            kind,
            name,
            caption,
            extra,
            population: Population::Populated,
            children: Vec::new(),
            serial: 0,
        }
    }

    /// Whether this node is an object path segment
    pub fn is_namespace(&self) -> bool {
        self.kind == NodeKind::Namespace
    }

    /// Whether children have been fetched (successfully or not)
    pub fn is_populated(&self) -> bool {
        self.population != Population::Unpopulated
    }

    /// Number of materialized children (no population is triggered)
    pub fn child_len(&self) -> usize {
        self.children.len()
    }

    /// The path segment this node stands for, without the trailing separator
    pub fn segment(&self) -> &str {
        self.name.trim_end_matches(SEPARATOR)
    }

    /// Text to display: the caption if one exists, otherwise the name
    pub fn display_text(&self) -> &str {
        if self.caption.is_empty() {
            &self.name
        } else {
            &self.caption
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let root = Node::root();
        assert_eq!(root.kind, NodeKind::Namespace);
        assert_eq!(root.name, "/");
        assert_eq!(root.segment(), "");
        assert!(!root.is_populated());
        assert!(root.caption.is_empty());
    }

    #[test]
    fn test_member_captions() {
        let method = Node::member(MemberKind::Method, "Ping".to_string(), Some("s".to_string()));
        assert_eq!(method.caption, "Method: Ping");
        assert_eq!(method.display_text(), "Method: Ping");
        assert!(method.is_populated());

        let signal = Node::member(MemberKind::Signal, "Changed".to_string(), None);
        assert_eq!(signal.caption, "Signal: Changed");

        let property = Node::member(MemberKind::Property, "Version".to_string(), None);
        assert_eq!(property.caption, "Property: Version");
    }

    #[test]
    fn test_interface_displays_name() {
        let iface = Node::member(
            MemberKind::Interface,
            "org.freedesktop.DBus.Peer".to_string(),
            None,
        );
        assert_eq!(iface.kind, NodeKind::Interface);
        assert!(iface.caption.is_empty());
        assert_eq!(iface.display_text(), "org.freedesktop.DBus.Peer");
    }

    #[test]
    fn test_namespace_segment() {
        let ns = Node::namespace("freedesktop/".to_string());
        assert_eq!(ns.segment(), "freedesktop");
        assert_eq!(ns.display_text(), "freedesktop/");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&NodeKind::Property).unwrap();
        assert_eq!(json, "\"property\"");
        assert_eq!(NodeKind::from(MemberKind::Signal), NodeKind::Signal);
    }
}
