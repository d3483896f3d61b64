//! Highlight overlay geometry.
//!
//! The overlay dims the rows of the selected node's subtree: it starts at the
//! bottom edge of the selected row and ends at the bottom edge of the last
//! visible descendant's row.

use serde::{Deserialize, Serialize};

use crate::collapse::Collapser;
use crate::filter::Filter;
use crate::node::NodeId;
use crate::store::Store;

/// Vertical extent of an element or overlay, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxRect {
    pub top: f64,
    pub height: f64,
}

impl BoxRect {
    /// Nothing to draw.
    pub const ZERO: BoxRect = BoxRect {
        top: 0.0,
        height: 0.0,
    };

    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.height <= 0.0
    }
}

/// Access to the rendered rows, supplied by the presentation layer.
pub trait DomQuery {
    /// Handle to a rendered row.
    type Element;

    /// The row element for `id`, or `None` when it is not rendered (for
    /// example virtualized out of view).
    fn element_for_id(&self, id: NodeId) -> Option<Self::Element>;

    /// Offset of `element` within the tree pane, and its height.
    fn bounding_box_of(&self, element: &Self::Element) -> BoxRect;
}

/// Deepest, right-most visible descendant of `id`.
///
/// This is the last row of the subtree in render order. Collapsed subtrees
/// are not entered. Filtered nodes have no row of their own, so the walk
/// descends through them and falls back to an earlier sibling when they
/// contribute nothing. Returns `None` when `id` has no visible descendant.
pub fn last_visible_descendant(
    store: &Store,
    collapser: &Collapser,
    filter: &Filter,
    id: NodeId,
) -> Option<NodeId> {
    if collapser.is_collapsed(id) {
        return None;
    }
    // Reverse pre-order: a node is checked after all of its descendants.
    let mut stack: Vec<(NodeId, bool)> = store
        .get(id)?
        .children
        .iter()
        .map(|&child| (child, false))
        .collect();

    while let Some((current, descended)) = stack.pop() {
        let Some(node) = store.get(current) else {
            continue;
        };
        if descended {
            if filter.accepts(node) {
                return Some(current);
            }
            continue;
        }
        stack.push((current, true));
        if !collapser.is_collapsed(current) {
            stack.extend(node.children.iter().map(|&child| (child, false)));
        }
    }
    None
}

/// Overlay box for `selected`.
///
/// A node without visible descendants yields a zero-height box at its own
/// bottom edge. If either row is not rendered the result is [`BoxRect::ZERO`].
pub fn highlight_geometry<Q>(
    selected: Option<NodeId>,
    store: &Store,
    collapser: &Collapser,
    filter: &Filter,
    dom: &Q,
) -> BoxRect
where
    Q: DomQuery + ?Sized,
{
    let Some(selected) = selected else {
        return BoxRect::ZERO;
    };
    if !store.contains(selected) {
        return BoxRect::ZERO;
    }
    let last = last_visible_descendant(store, collapser, filter, selected).unwrap_or(selected);

    let (Some(start), Some(end)) = (dom.element_for_id(selected), dom.element_for_id(last)) else {
        return BoxRect::ZERO;
    };
    let start = dom.bounding_box_of(&start);
    let end = dom.bounding_box_of(&end);

    let top = start.bottom();
    BoxRect::new(top, end.bottom() - top)
}
