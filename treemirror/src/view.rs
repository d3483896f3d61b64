//! Render list derivation.

use std::collections::HashMap;

use crate::collapse::Collapser;
use crate::filter::Filter;
use crate::node::NodeId;
use crate::store::Store;

/// A row in the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRow {
    pub id: NodeId,
    /// Indentation level, not counting filtered ancestors.
    pub depth: u32,
}

/// Ordered ids currently eligible for display.
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    rows: Vec<RenderRow>,
    positions: HashMap<NodeId, usize>,
}

impl PartialEq for RenderList {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl Eq for RenderList {}

impl RenderList {
    fn from_rows(rows: Vec<RenderRow>) -> Self {
        let positions = rows.iter().enumerate().map(|(i, row)| (row.id, i)).collect();
        Self { rows, positions }
    }

    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.rows.iter().map(|row| row.id).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RenderRow> {
        self.rows.get(index).copied()
    }

    /// Index of `id` in the list.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Deepest displayed indentation.
    pub fn max_depth(&self) -> u32 {
        self.rows.iter().map(|row| row.depth).max().unwrap_or(0)
    }
}

/// Flatten `store` into rows, pruning collapsed subtrees before descending.
///
/// Order follows each node's child list, so the output is fully determined by
/// the inputs. Work is proportional to the emitted rows plus the collapsed
/// (and filtered) nodes on the way to them.
pub fn compute_render_list(store: &Store, collapser: &Collapser, filter: &Filter) -> RenderList {
    let mut rows = Vec::new();
    let mut stack: Vec<(NodeId, u32)> = store.root_ids().iter().rev().map(|&id| (id, 0)).collect();

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = store.get(id) else {
            continue;
        };

        let child_depth = if filter.accepts(node) {
            rows.push(RenderRow { id, depth });
            depth + 1
        } else {
            depth
        };

        if !collapser.is_collapsed(id) {
            stack.extend(node.children.iter().rev().map(|&child| (child, child_depth)));
        }
    }

    RenderList::from_rows(rows)
}
