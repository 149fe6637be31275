//! Error types for the object tree cache.

use thiserror::Error;

/// Errors raised by cache operations on structurally invalid input.
///
/// Remote failures never surface here: they are absorbed by the cache and
/// reported on the event side channel instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Object path is empty or not absolute
    #[error("invalid object path '{path}': paths must be absolute")]
    InvalidPath { path: String },

    /// Node handle refers to a node discarded by a refresh
    #[error("stale node handle: the node was discarded by a refresh")]
    StaleNode,
}

impl TreeError {
    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TreeError::invalid_path("org/example");
        assert!(err.to_string().contains("org/example"));
        assert!(err.to_string().contains("absolute"));

        let err = TreeError::StaleNode;
        assert!(err.to_string().contains("stale"));
    }
}
