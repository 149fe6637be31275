//! Node storage backed by `petgraph::StableGraph`.
//!
//! Nodes are graph vertices; each child is linked to its parent by a single
//! containment edge carrying its row. The edge is the non-owning parent
//! reference: ownership is expressed only by the parent's ordered child list,
//! and removing a node removes its subtree.
//!
//! Vertex indices are reused after removal, so every node gets a serial
//! number and handles are checked against it.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::node::{Node, NodeId};

/// Containment edge from a parent to one of its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Containment {
    /// Position of the child in its parent's child list
    pub row: usize,
}

/// Serial-checked node storage.
#[derive(Debug, Clone)]
pub(crate) struct NodeStore {
    graph: StableGraph<Node, Containment, petgraph::Directed>,
    next_serial: u64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            next_serial: 1,
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Insert a node without a parent
    pub fn insert_root(&mut self, node: Node) -> NodeId {
        self.insert(node)
    }

    /// Insert `node` as child `row` of `parent`.
    ///
    /// The parent's child list is not touched: callers build the complete
    /// list first and install it with [`NodeStore::set_children`].
    pub fn insert_child(&mut self, parent: NodeId, row: usize, node: Node) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let child = self.insert(node);
        self.graph
            .add_edge(parent.index, child.index, Containment { row });
        Some(child)
    }

    fn insert(&mut self, mut node: Node) -> NodeId {
        let serial = self.next_serial;
        self.next_serial += 1;
        node.serial = serial;
        let index = self.graph.add_node(node);
        NodeId::new(index, serial)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get a node by handle
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.graph
            .node_weight(id.index)
            .filter(|node| node.serial == id.serial)
    }

    /// Get a mutable node by handle
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph
            .node_weight_mut(id.index)
            .filter(|node| node.serial == id.serial)
    }

    /// Parent of a node and the node's row within it
    pub fn parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        if !self.contains(id) {
            return None;
        }
        let edge = self
            .graph
            .edges_directed(id.index, Direction::Incoming)
            .next()?;
        let parent = self.handle(edge.source())?;
        Some((parent, edge.weight().row))
    }

    fn handle(&self, index: NodeIndex) -> Option<NodeId> {
        self.graph
            .node_weight(index)
            .map(|node| NodeId::new(index, node.serial))
    }

    /// Install a fully built child list in one step
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if let Some(node) = self.get_mut(parent) {
            node.children = children;
        }
    }

    /// Detach and return the child list of a node
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        self.get_mut(parent)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default()
    }

    /// Remove a node and everything below it, returning the number removed
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        let mut pending = vec![id];
        let mut removed = 0;
        while let Some(next) = pending.pop() {
            if !self.contains(next) {
                continue;
            }
            if let Some(node) = self.graph.remove_node(next.index) {
                pending.extend(node.children);
                removed += 1;
            }
        }
        removed
    }
}
