//! Lazy Tree Cache
//!
//! Mirrors the object hierarchy of one remote service, fetching the children
//! of a namespace node the first time they are asked for. Every population
//! performs a single blocking call to the [`IntrospectionClient`]; nothing is
//! fetched in the background.
//!
//! # Example
//!
//! ```
//! use busview_core::{FixtureClient, LazyTreeCache};
//!
//! let client = FixtureClient::new("org.example")
//!     .with_xml("/", r#"<node><node name="org"/></node>"#)
//!     .with_xml("/org", r#"<node/>"#);
//! let mut cache = LazyTreeCache::new(client);
//!
//! let root = cache.root();
//! assert_eq!(cache.child_count(root), 1);
//! let org = cache.resolve_path("/org").unwrap().unwrap();
//! assert_eq!(cache.full_path(org).as_deref(), Some("/org"));
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use super::events::{IntrospectionFailure, Subscribers, SubscriptionId, TreeEvent};
use super::store::NodeStore;
use crate::client::IntrospectionClient;
use crate::error::TreeError;
use crate::node::{Node, NodeId, NodeKind, Population};
use crate::parser::{self, ChildDescriptor, MemberDescriptor};
use crate::path;

/// Column header shown above the tree
pub const HEADER_TEXT: &str = "Methods";

// ============================================================================
// Options and Statistics
// ============================================================================

/// Behaviour switches for a [`LazyTreeCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Re-fetch namespaces whose last introspection failed on the next access.
    ///
    /// When unset, a failed introspection is cached exactly like an empty
    /// reply and only an explicit refresh fetches the node again.
    pub retry_failed: bool,
}

/// Counters describing cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Introspection calls issued
    pub introspections: u64,
    /// Introspection calls that failed
    pub failures: u64,
    /// Population requests answered from cached state
    pub hits: u64,
    /// Nodes currently held by the cache
    pub live_nodes: usize,
    /// Refresh operations performed
    pub refreshes: u64,
}

impl CacheStats {
    /// Get hit rate as a fraction (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.introspections;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// Lazy Tree Cache
// ============================================================================

/// Lazily populated object tree of one remote service.
///
/// Operations that may populate a node take `&mut self`; pure queries on
/// already cached state take `&self`. Handles invalidated by a refresh are
/// treated as invalid indexes: queries return `None` or `0` for them.
pub struct LazyTreeCache {
    client: Box<dyn IntrospectionClient>,
    store: NodeStore,
    root: NodeId,
    options: CacheOptions,
    subscribers: Subscribers,
    stats: CacheStats,
}

impl std::fmt::Debug for LazyTreeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyTreeCache")
            .field("service", &self.client.service())
            .field("options", &self.options)
            .field("nodes", &self.store.len())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl LazyTreeCache {
    /// Create a cache holding only the unpopulated root
    pub fn new(client: impl IntrospectionClient + 'static) -> Self {
        Self::with_options(client, CacheOptions::default())
    }

    /// Create a cache with explicit options
    pub fn with_options(client: impl IntrospectionClient + 'static, options: CacheOptions) -> Self {
        let mut store = NodeStore::new();
        let root = store.insert_root(Node::root());
        Self {
            client: Box::new(client),
            store,
            root,
            options,
            subscribers: Subscribers::default(),
            stats: CacheStats::default(),
        }
    }

    /// The root namespace (`"/"`)
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Service label of the underlying client
    pub fn service(&self) -> &str {
        self.client.service()
    }

    /// Activity counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live_nodes: self.store.len(),
            ..self.stats
        }
    }

    /// Column header text
    pub fn header_text(&self) -> &'static str {
        HEADER_TEXT
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Child `row` of `node`, populating `node` first if needed.
    ///
    /// Returns `None` when `row` is out of range or `node` is stale.
    pub fn child_at(&mut self, node: NodeId, row: usize) -> Option<NodeId> {
        if !self.ensure_populated(node) {
            return None;
        }
        self.store.get(node)?.children.get(row).copied()
    }

    /// Number of children of `node`, populating it first if needed.
    ///
    /// Methods, signals and properties always report 0; an interface reports
    /// its member count.
    pub fn child_count(&mut self, node: NodeId) -> usize {
        if !self.ensure_populated(node) {
            return 0;
        }
        self.store.get(node).map(Node::child_len).unwrap_or(0)
    }

    /// All children of `node` in order, populating it first if needed
    pub fn children(&mut self, node: NodeId) -> Vec<NodeId> {
        if !self.ensure_populated(node) {
            return Vec::new();
        }
        self.store
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Parent of `child` and its row within the parent.
    ///
    /// Returns `None` for the root and for stale handles.
    pub fn index_of(&self, child: NodeId) -> Option<(NodeId, usize)> {
        self.store.parent(child)
    }

    /// Parent of `node`, `None` for the root
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.index_of(node).map(|(parent, _)| parent)
    }

    /// Make sure the children of `node` have been fetched.
    ///
    /// Returns `false` only when `node` is stale. A failed introspection
    /// still counts as populated (see [`CacheOptions::retry_failed`]).
    pub fn ensure_populated(&mut self, node: NodeId) -> bool {
        let Some(entry) = self.store.get_mut(node) else {
            return false;
        };

        let needs_fetch = match entry.population {
            Population::Unpopulated => true,
            Population::Failed => self.options.retry_failed,
            Population::Populated => false,
        };
        if !needs_fetch {
            self.stats.hits += 1;
            return true;
        }

        if !entry.is_namespace() {
            entry.population = Population::Populated;
            return true;
        }

        self.populate(node);
        true
    }

    /// Fetch and materialize the children of a namespace node.
    ///
    /// The complete child list is built before it is attached to `node`.
    fn populate(&mut self, node: NodeId) {
        let Some(path) = self.full_path(node) else {
            return;
        };

        debug!(path = %path, service = self.client.service(), "Introspecting");
        self.stats.introspections += 1;

        let (descriptors, population, failure) = match self.client.introspect(&path) {
            Ok(doc) => (parser::parse(&doc), Population::Populated, None),
            Err(err) => {
                self.stats.failures += 1;
                debug!(path = %path, error = %err, "Introspection failed");
                let failure = IntrospectionFailure::from_error(&path, self.client.service(), &err);
                let population = if self.options.retry_failed {
                    Population::Failed
                } else {
                    Population::Populated
                };
                (Vec::new(), population, Some(failure))
            }
        };

        let children = self.materialize(node, descriptors);
        trace!(path = %path, children = children.len(), "Materialized children");
        self.store.set_children(node, children);
        if let Some(entry) = self.store.get_mut(node) {
            entry.population = population;
        }

        if let Some(failure) = failure {
            self.subscribers
                .emit(&TreeEvent::IntrospectionFailed(failure));
        }
    }

    /// Turn parsed descriptors into nodes under `parent`, returning them in order
    fn materialize(&mut self, parent: NodeId, descriptors: Vec<ChildDescriptor>) -> Vec<NodeId> {
        let mut children = Vec::with_capacity(descriptors.len());
        for (row, descriptor) in descriptors.into_iter().enumerate() {
            let child = match descriptor {
                ChildDescriptor::Namespace { name } => {
                    self.store.insert_child(parent, row, Node::namespace(name))
                }
                ChildDescriptor::Member(member) => self.materialize_member(parent, row, member),
            };
            children.extend(child);
        }
        children
    }

    fn materialize_member(
        &mut self,
        parent: NodeId,
        row: usize,
        member: MemberDescriptor,
    ) -> Option<NodeId> {
        let MemberDescriptor {
            kind,
            name,
            extra,
            members,
        } = member;
        let id = self
            .store
            .insert_child(parent, row, Node::member(kind, name, extra))?;

        let mut nested = Vec::with_capacity(members.len());
        for (row, member) in members.into_iter().enumerate() {
            nested.extend(self.materialize_member(id, row, member));
        }
        self.store.set_children(id, nested);
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------------

    /// Discard and re-fetch the nearest namespace at or above `node`.
    ///
    /// The old children are detached and destroyed before the new list is
    /// built; handles to them become stale. Emits [`TreeEvent::RowsRemoved`]
    /// for the old rows and [`TreeEvent::RowsInserted`] for the new ones,
    /// each only when the range is non-empty. Returns the refreshed node.
    pub fn refresh(&mut self, node: NodeId) -> Result<NodeId, TreeError> {
        let target = self.nearest_namespace(node).ok_or(TreeError::StaleNode)?;
        self.stats.refreshes += 1;

        let old = self.store.take_children(target);
        let removed: usize = old.iter().map(|child| self.store.remove_subtree(*child)).sum();
        if let Some(entry) = self.store.get_mut(target) {
            entry.population = Population::Unpopulated;
        }
        let path = self.full_path(target).unwrap_or_default();
        debug!(
            path = %path,
            rows = old.len(),
            nodes = removed,
            "Refreshing"
        );

        if !old.is_empty() {
            self.subscribers.emit(&TreeEvent::RowsRemoved {
                parent: target,
                first: 0,
                last: old.len() - 1,
            });
        }

        self.ensure_populated(target);

        let count = self.store.get(target).map(Node::child_len).unwrap_or(0);
        if count > 0 {
            self.subscribers.emit(&TreeEvent::RowsInserted {
                parent: target,
                first: 0,
                last: count - 1,
            });
        }
        Ok(target)
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    /// Find the namespace node at `path`, populating every level on the way.
    ///
    /// The node found is populated as well. Returns `Ok(None)` as soon as a
    /// segment has no matching namespace child. `"/"` returns the root
    /// without contacting the remote side.
    pub fn resolve_path(&mut self, path: &str) -> Result<Option<NodeId>, TreeError> {
        let segments = path::segments(path)?;

        let mut current = self.root;
        for segment in segments {
            self.ensure_populated(current);
            let Some(next) = self.find_namespace_child(current, segment) else {
                debug!(path, segment, "Object path not found");
                return Ok(None);
            };
            self.ensure_populated(next);
            current = next;
        }
        Ok(Some(current))
    }

    fn find_namespace_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        let node = self.store.get(parent)?;
        node.children.iter().copied().find(|child| {
            self.store
                .get(*child)
                .is_some_and(|c| c.is_namespace() && c.segment() == segment)
        })
    }

    /// Canonical object path of `node`.
    ///
    /// Members report the path of the object they belong to, so resolving
    /// the returned path always yields a namespace with the same path.
    pub fn full_path(&self, node: NodeId) -> Option<String> {
        let namespace = self.nearest_namespace(node)?;

        let mut names = Vec::new();
        let mut current = Some(namespace);
        while let Some(id) = current {
            names.push(self.store.get(id)?.name.as_str());
            current = self.parent(id);
        }
        names.reverse();
        Some(path::join_names(names))
    }

    /// `node` itself if it is a namespace, otherwise its closest namespace ancestor
    fn nearest_namespace(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if self.store.get(current)?.is_namespace() {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    // ------------------------------------------------------------------------
    // Node Accessors
    // ------------------------------------------------------------------------

    /// Cached node data, `None` for stale handles
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.store.get(node)
    }

    /// Whether `node` still exists in the tree
    pub fn contains(&self, node: NodeId) -> bool {
        self.store.contains(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.store.get(node).map(|n| n.kind)
    }

    pub fn is_populated(&self, node: NodeId) -> bool {
        self.store.get(node).is_some_and(Node::is_populated)
    }

    /// Caption if the node has one, otherwise its name
    pub fn display_text(&self, node: NodeId) -> Option<&str> {
        self.store.get(node).map(Node::display_text)
    }

    /// Interface a node belongs to: its own name for interfaces, the parent's
    /// name for interface members
    pub fn interface_name(&self, node: NodeId) -> Option<&str> {
        let entry = self.store.get(node)?;
        if entry.kind == NodeKind::Interface {
            return Some(entry.name.as_str());
        }
        let parent = self.store.get(self.parent(node)?)?;
        (parent.kind == NodeKind::Interface).then_some(parent.name.as_str())
    }

    /// Name of a method, signal or property
    pub fn member_name(&self, node: NodeId) -> Option<&str> {
        self.store
            .get(node)
            .filter(|n| !n.is_namespace())
            .map(|n| n.name.as_str())
    }

    /// Input signature of a method
    pub fn type_signature(&self, node: NodeId) -> Option<&str> {
        self.store
            .get(node)
            .filter(|n| n.kind == NodeKind::Method)
            .and_then(|n| n.extra.as_deref())
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Register a callback receiving every [`TreeEvent`]
    pub fn subscribe(&mut self, callback: impl FnMut(&TreeEvent) + 'static) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
