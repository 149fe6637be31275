//! Tree events.
//!
//! Structural notifications for consumers mirroring the tree (row ranges
//! removed or inserted under a parent) and the introspection failure side
//! channel. Events are delivered synchronously, in emission order.

use serde::Serialize;

use crate::client::IntrospectError;
use crate::node::NodeId;

/// An introspection failure reported while populating a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntrospectionFailure {
    /// Object path that was queried
    pub path: String,
    /// Service the query was sent to
    pub service: String,
    /// Display-ready failure message
    pub message: String,
    /// Coarse error code from the transport, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntrospectionFailure {
    pub(crate) fn from_error(path: &str, service: &str, error: &IntrospectError) -> Self {
        Self {
            path: path.to_string(),
            service: service.to_string(),
            message: error.to_string(),
            code: error.code().map(str::to_string),
        }
    }
}

impl std::fmt::Display for IntrospectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Event emitted by a [`LazyTreeCache`](crate::LazyTreeCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Rows `first..=last` of `parent` were discarded
    RowsRemoved {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` of `parent` were materialized
    RowsInserted {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// Populating a node failed; the node was left without children
    IntrospectionFailed(IntrospectionFailure),
}

/// Identifier returned by [`LazyTreeCache::subscribe`](crate::LazyTreeCache::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&TreeEvent)>;

/// Registered event callbacks, in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn emit(&mut self, event: &TreeEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
