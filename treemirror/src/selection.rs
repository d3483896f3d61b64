//! Selection cursor over the render list.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::store::Store;
use crate::view::RenderList;

/// What happens to the selection when its node stops being visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenSelectionPolicy {
    /// Drop the selection.
    #[default]
    Clear,
    /// Move to the closest ancestor that is still visible, else clear.
    NearestVisibleAncestor,
}

/// The selected id, always absent or present in the current render list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Select `id` if it is in `list`. Returns true if the selection changed.
    pub fn select_by_id(&mut self, list: &RenderList, id: NodeId) -> bool {
        if !list.contains(id) {
            trace!("[selection] ignoring select of hidden {}", id);
            return false;
        }
        self.set(Some(id))
    }

    /// Move to the next row. No-op on the last row.
    pub fn select_next(&mut self, list: &RenderList) -> bool {
        match self.selected.and_then(|id| list.position(id)) {
            Some(index) => match list.get(index + 1) {
                Some(row) => self.set(Some(row.id)),
                None => false,
            },
            None => self.select_first(list),
        }
    }

    /// Move to the previous row. No-op on the first row.
    pub fn select_prev(&mut self, list: &RenderList) -> bool {
        match self.selected.and_then(|id| list.position(id)) {
            Some(0) => false,
            Some(index) => match list.get(index - 1) {
                Some(row) => self.set(Some(row.id)),
                None => false,
            },
            None => self.select_first(list),
        }
    }

    pub fn select_first(&mut self, list: &RenderList) -> bool {
        match list.get(0) {
            Some(row) => self.set(Some(row.id)),
            None => false,
        }
    }

    pub fn select_last(&mut self, list: &RenderList) -> bool {
        match list.len().checked_sub(1).and_then(|i| list.get(i)) {
            Some(row) => self.set(Some(row.id)),
            None => false,
        }
    }

    /// Move to the nearest visible ancestor of the selection.
    pub fn select_parent(&mut self, store: &Store, list: &RenderList) -> bool {
        let Some(current) = self.selected else {
            return false;
        };
        match store.ancestors(current).into_iter().find(|&a| list.contains(a)) {
            Some(parent) => self.set(Some(parent)),
            None => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        self.set(None)
    }

    /// Re-establish the invariant after `list` was recomputed.
    ///
    /// `ancestors` is the selected node's ancestor chain, nearest first. For a
    /// node that no longer exists it is the chain from before the change.
    pub fn revalidate(
        &mut self,
        list: &RenderList,
        policy: HiddenSelectionPolicy,
        ancestors: &[NodeId],
    ) -> bool {
        let Some(current) = self.selected else {
            return false;
        };
        if list.contains(current) {
            return false;
        }

        let replacement = match policy {
            HiddenSelectionPolicy::Clear => None,
            HiddenSelectionPolicy::NearestVisibleAncestor => {
                ancestors.iter().copied().find(|&a| list.contains(a))
            }
        };
        trace!(
            "[selection] {} hidden, moving to {:?}",
            current,
            replacement
        );
        self.set(replacement)
    }

    fn set(&mut self, id: Option<NodeId>) -> bool {
        if self.selected == id {
            return false;
        }
        self.selected = id;
        true
    }
}
