//! Lazily Populated Object Tree
//!
//! ```text
//! LazyTreeCache
//! ├── IntrospectionClient (one blocking call per population)
//! ├── NodeStore (StableGraph of nodes, containment edges to parents)
//! └── Subscribers (structural events, introspection failures)
//! ```

pub mod cache;
pub mod events;
mod store;

pub use cache::{CacheOptions, CacheStats, LazyTreeCache, HEADER_TEXT};
pub use events::{IntrospectionFailure, SubscriptionId, TreeEvent};
