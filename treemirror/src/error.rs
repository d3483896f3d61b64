//! Error types.

use thiserror::Error;

use crate::node::NodeId;

/// A mutation op that references structurally impossible state.
///
/// The offending op is skipped; the rest of its batch still applies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Mount under a parent that is not in the store.
    #[error("cannot mount {id} under missing parent {parent}")]
    MissingParent {
        /// Node being mounted.
        id: NodeId,
        /// Parent that does not exist.
        parent: NodeId,
    },

    /// Mount of an id that is already live.
    #[error("node {0} is already mounted")]
    DuplicateId(NodeId),

    /// Mount of an id that was unmounted earlier. Ids are never reused.
    #[error("node {0} was unmounted and cannot be mounted again")]
    ReusedId(NodeId),

    /// Update/unmount/reorder of an id that is not in the store.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Reorder whose child list is not a permutation of the current children.
    #[error("reorder of {parent} does not match its current children")]
    ChildMismatch {
        /// Parent whose children were reordered, `None` for the roots.
        parent: ParentRef,
    },

    /// Update whose child list would make a node its own ancestor.
    #[error("adopting {child} under {parent} would create a cycle")]
    WouldCycle {
        /// Node whose children were replaced.
        parent: NodeId,
        /// Child that is an ancestor of `parent`.
        child: NodeId,
    },

    /// The same child appears twice in a child list.
    #[error("child {0} listed more than once")]
    DuplicateChild(NodeId),
}

/// Parent reference used in diagnostics; displays as `roots` for `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef(pub Option<NodeId>);

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "roots"),
        }
    }
}

/// Errors from compiling a search pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The pattern is not a valid regular expression.
    #[error("invalid search pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern as typed.
        pattern: String,
        /// Message from the regex compiler.
        message: String,
    },
}
