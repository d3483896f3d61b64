//! Collapse state.

use std::collections::HashSet;

use crate::node::NodeId;
use crate::store::Store;

/// Set of ids whose subtree the user has hidden.
///
/// Absence from the set does not make a node visible; an ancestor may be
/// collapsed.
#[derive(Debug, Clone, Default)]
pub struct Collapser {
    collapsed: HashSet<NodeId>,
}

impl Collapser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.contains(&id)
    }

    /// Whether `id` has anything to collapse.
    pub fn can_collapse(store: &Store, id: NodeId) -> bool {
        store.get(id).is_some_and(|n| n.has_children())
    }

    /// Flip `id`. Returns the new collapsed state.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.collapsed.remove(&id) {
            false
        } else {
            self.collapsed.insert(id);
            true
        }
    }

    /// Collapse `id`. Returns true if the set changed.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        self.collapsed.insert(id)
    }

    /// Expand `id`. Returns true if the set changed.
    pub fn expand(&mut self, id: NodeId) -> bool {
        self.collapsed.remove(&id)
    }

    /// Collapse every node that has children.
    pub fn collapse_all(&mut self, store: &Store) -> bool {
        let before = self.collapsed.len();
        self.collapsed.extend(
            store
                .preorder()
                .into_iter()
                .filter(|&id| Self::can_collapse(store, id)),
        );
        self.collapsed.len() != before
    }

    pub fn expand_all(&mut self) -> bool {
        let changed = !self.collapsed.is_empty();
        self.collapsed.clear();
        changed
    }

    /// Forget ids that no longer exist.
    pub fn prune(&mut self, removed: &[NodeId]) {
        for id in removed {
            self.collapsed.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.collapsed.iter().copied()
    }
}
