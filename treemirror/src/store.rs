//! Canonical node store.
//!
//! The store is the single source of truth for the mirrored tree. It is only
//! written through [`Store::apply_batch`]; every op is validated against the
//! current state before anything is changed, so a malformed op is dropped
//! without leaving the map half-edited.

use std::collections::{HashMap, HashSet};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ParentRef, ProtocolError};
use crate::node::{Node, NodeAttributes, NodeId};

/// One structural change reported by the instrumented runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationOp {
    /// Create a node under `parent` (or as a root) at `index`.
    ///
    /// Indices past the end append.
    Mount {
        id: NodeId,
        #[serde(default)]
        parent: Option<NodeId>,
        #[serde(default = "append_index")]
        index: usize,
        attributes: NodeAttributes,
    },
    /// Replace a node's attributes and optionally its whole child list.
    Update {
        id: NodeId,
        attributes: NodeAttributes,
        #[serde(default)]
        children: Option<Vec<NodeId>>,
    },
    /// Remove a node and its entire subtree.
    Unmount { id: NodeId },
    /// Change the order of a parent's children (or of the roots).
    Reorder {
        #[serde(default)]
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    },
}

fn append_index() -> usize {
    usize::MAX
}

impl MutationOp {
    /// Shorthand for mounting a component.
    pub fn mount(id: u64, parent: Option<u64>, name: &str) -> Self {
        Self::Mount {
            id: NodeId(id),
            parent: parent.map(NodeId),
            index: append_index(),
            attributes: NodeAttributes::component(name),
        }
    }

    /// Shorthand for unmounting a node.
    pub fn unmount(id: u64) -> Self {
        Self::Unmount { id: NodeId(id) }
    }

    /// The id the op is about.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Mount { id, .. } | Self::Update { id, .. } | Self::Unmount { id } => Some(*id),
            Self::Reorder { parent, .. } => *parent,
        }
    }
}

/// An op that was skipped while applying a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOp {
    /// Position of the op in its batch.
    pub index: usize,
    pub error: ProtocolError,
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of ops applied.
    pub applied: usize,
    /// Ops skipped because they referenced impossible state.
    pub rejected: Vec<RejectedOp>,
    /// Every id removed by this batch, including cascaded descendants.
    pub removed: Vec<NodeId>,
}

impl BatchReport {
    /// Whether every op applied.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Mapping from id to node plus the ordered roots.
#[derive(Debug, Clone, Default)]
pub struct Store {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    /// Ids that were unmounted. They stay retired for the store's lifetime.
    freed: HashSet<NodeId>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Root ids in render order.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `parent`, or the roots when `parent` is `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[]),
            None => &self.roots,
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            out.push(parent);
            current = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        false
    }

    /// Every id in full pre-order, ignoring collapse and filter state.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `id` was unmounted earlier and may not be mounted again.
    pub fn is_freed(&self, id: NodeId) -> bool {
        self.freed.contains(&id)
    }

    /// Deepest cached depth in the store.
    pub fn max_depth(&self) -> u32 {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Apply one mutation batch in order.
    ///
    /// Invalid ops are logged and skipped; the rest of the batch still applies.
    pub fn apply_batch(&mut self, ops: impl IntoIterator<Item = MutationOp>) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, op) in ops.into_iter().enumerate() {
            match self.apply(op, &mut report.removed) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    match &err {
                        ProtocolError::MissingParent { .. } => error!("[store] {}", err),
                        _ => warn!("[store] skipping op {}: {}", index, err),
                    }
                    report.rejected.push(RejectedOp { index, error: err });
                }
            }
        }
        debug!(
            "[store] batch applied={} rejected={} removed={} size={}",
            report.applied,
            report.rejected.len(),
            report.removed.len(),
            self.nodes.len()
        );
        report
    }

    fn apply(&mut self, op: MutationOp, removed: &mut Vec<NodeId>) -> Result<(), ProtocolError> {
        match op {
            MutationOp::Mount {
                id,
                parent,
                index,
                attributes,
            } => self.mount(id, parent, index, attributes),
            MutationOp::Update {
                id,
                attributes,
                children,
            } => self.update(id, attributes, children, removed),
            MutationOp::Unmount { id } => self.unmount(id, removed),
            MutationOp::Reorder { parent, children } => self.reorder(parent, children),
        }
    }

    fn mount(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        index: usize,
        attributes: NodeAttributes,
    ) -> Result<(), ProtocolError> {
        if self.nodes.contains_key(&id) {
            return Err(ProtocolError::DuplicateId(id));
        }
        if self.freed.contains(&id) {
            return Err(ProtocolError::ReusedId(id));
        }
        let depth = match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get(&parent_id)
                    .ok_or(ProtocolError::MissingParent { id, parent: parent_id })?;
                parent_node.depth + 1
            }
            None => 0,
        };

        self.nodes.insert(id, Node::new(id, parent, depth, attributes));
        let siblings = self.siblings_mut(parent);
        let at = index.min(siblings.len());
        siblings.insert(at, id);
        Ok(())
    }

    fn update(
        &mut self,
        id: NodeId,
        attributes: NodeAttributes,
        children: Option<Vec<NodeId>>,
        removed: &mut Vec<NodeId>,
    ) -> Result<(), ProtocolError> {
        let parent = self.nodes.get(&id).ok_or(ProtocolError::UnknownNode(id))?.parent;
        if let Some(children) = &children {
            self.validate_child_list(id, children)?;
        }

        let depth = parent
            .and_then(|p| self.nodes.get(&p))
            .map(|p| p.depth + 1)
            .unwrap_or(0);
        let node = self.nodes.get_mut(&id).ok_or(ProtocolError::UnknownNode(id))?;
        node.set_attributes(attributes);
        node.depth = depth;

        let Some(children) = children else {
            return Ok(());
        };
        let previous = std::mem::take(&mut node.children);

        // Adopt before dropping so a grandchild promoted out of a dropped
        // subtree survives the cascade.
        for &child in &children {
            let current_parent = self.nodes.get(&child).and_then(|n| n.parent);
            if current_parent != Some(id) {
                self.detach(child);
                if let Some(node) = self.nodes.get_mut(&child) {
                    node.parent = Some(id);
                }
                self.fix_depths(child, depth + 1);
            }
        }

        let keep: HashSet<NodeId> = children.iter().copied().collect();
        for child in previous {
            if !keep.contains(&child) {
                self.remove_subtree(child, removed);
            }
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        Ok(())
    }

    fn unmount(&mut self, id: NodeId, removed: &mut Vec<NodeId>) -> Result<(), ProtocolError> {
        if !self.nodes.contains_key(&id) {
            return Err(ProtocolError::UnknownNode(id));
        }
        self.detach(id);
        self.remove_subtree(id, removed);
        Ok(())
    }

    fn reorder(&mut self, parent: Option<NodeId>, children: Vec<NodeId>) -> Result<(), ProtocolError> {
        if let Some(parent_id) = parent
            && !self.nodes.contains_key(&parent_id)
        {
            return Err(ProtocolError::UnknownNode(parent_id));
        }

        let current = self.children_of(parent);
        let mut seen = HashSet::with_capacity(children.len());
        for &child in &children {
            if !seen.insert(child) {
                return Err(ProtocolError::DuplicateChild(child));
            }
        }
        if children.len() != current.len() || !current.iter().all(|c| seen.contains(c)) {
            return Err(ProtocolError::ChildMismatch {
                parent: ParentRef(parent),
            });
        }

        *self.siblings_mut(parent) = children;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn validate_child_list(&self, id: NodeId, children: &[NodeId]) -> Result<(), ProtocolError> {
        let mut seen = HashSet::with_capacity(children.len());
        for &child in children {
            if !self.nodes.contains_key(&child) {
                return Err(ProtocolError::UnknownNode(child));
            }
            if !seen.insert(child) {
                return Err(ProtocolError::DuplicateChild(child));
            }
            if child == id || self.is_ancestor(child, id) {
                return Err(ProtocolError::WouldCycle { parent: id, child });
            }
        }
        Ok(())
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(node) => &mut node.children,
            None => &mut self.roots,
        }
    }

    /// Unlink `id` from its parent's child list (or the roots).
    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        self.siblings_mut(parent).retain(|&c| c != id);
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                self.freed.insert(current);
                removed.push(current);
            }
        }
    }

    fn fix_depths(&mut self, id: NodeId, depth: u32) {
        let mut stack = vec![(id, depth)];
        while let Some((current, depth)) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.depth = depth;
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------------

    /// Verify the forest invariants, returning the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut reached = HashSet::with_capacity(self.nodes.len());
        for &root in &self.roots {
            let node = self
                .nodes
                .get(&root)
                .ok_or_else(|| format!("root {} missing from store", root))?;
            if node.parent.is_some() {
                return Err(format!("root {} has a parent", root));
            }
            if node.depth != 0 {
                return Err(format!("root {} has depth {}", root, node.depth));
            }
        }

        let mut stack: Vec<NodeId> = self.roots.clone();
        while let Some(id) = stack.pop() {
            if !reached.insert(id) {
                return Err(format!("{} reachable twice", id));
            }
            let node = self
                .nodes
                .get(&id)
                .ok_or_else(|| format!("{} missing from store", id))?;
            for &child in &node.children {
                let child_node = self
                    .nodes
                    .get(&child)
                    .ok_or_else(|| format!("child {} of {} missing", child, id))?;
                if child_node.parent != Some(id) {
                    return Err(format!("child {} does not point back to {}", child, id));
                }
                if child_node.depth != node.depth + 1 {
                    return Err(format!(
                        "child {} has depth {}, parent {} has {}",
                        child, child_node.depth, id, node.depth
                    ));
                }
                stack.push(child);
            }
        }

        if let Some(id) = self.freed.iter().find(|id| self.nodes.contains_key(id)) {
            return Err(format!("freed id {} is live again", id));
        }

        if reached.len() != self.nodes.len() {
            return Err(format!(
                "{} nodes unreachable from the roots",
                self.nodes.len() - reached.len()
            ));
        }
        Ok(())
    }
}
