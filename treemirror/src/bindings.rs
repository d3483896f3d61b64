//! Traversal over framework-internal trees.
//!
//! The inspected runtime's tree contains synthetic wrapper nodes that never
//! show up in the panel. A [`Bindings`] implementation, written once per
//! supported framework version, decides which children are "actual"; the
//! traversal here trusts it completely and keeps no state of its own.

use std::collections::HashMap;
use std::convert::Infallible;

use crate::node::{NodeAttributes, NodeId};
use crate::store::MutationOp;

/// Per-framework-version capability used to walk internal nodes.
pub trait Bindings {
    /// Handle to an internal node.
    type Node;

    /// Ordered children of `node`. Absent slots are `None` and are skipped.
    fn actual_children(&self, node: &Self::Node) -> Vec<Option<Self::Node>>;
}

/// Walk `root` and its actual children.
///
/// `visit` runs once for `root`. Every other node is visited twice: before its
/// subtree and again once the subtree is done, which lets callers pair
/// open/close semantics. The first error returned by `visit` aborts the walk.
pub fn traverse<B, F, E>(root: &B::Node, mut visit: F, bindings: &B) -> Result<(), E>
where
    B: Bindings + ?Sized,
    F: FnMut(&B::Node) -> Result<(), E>,
{
    visit(root)?;
    walk_children(root, &mut visit, bindings)
}

fn walk_children<B, F, E>(node: &B::Node, visit: &mut F, bindings: &B) -> Result<(), E>
where
    B: Bindings + ?Sized,
    F: FnMut(&B::Node) -> Result<(), E>,
{
    for child in bindings.actual_children(node).iter().flatten() {
        visit(child)?;
        walk_children(child, visit, bindings)?;
        visit(child)?;
    }
    Ok(())
}

/// What a relevant internal node looks like in the mirrored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub id: NodeId,
    pub attributes: NodeAttributes,
}

/// Build mount ops for a freshly rendered subtree.
///
/// `describe` returns `None` for nodes that should not be mirrored; their
/// relevant descendants are attached to the nearest relevant ancestor, or to
/// `parent` when there is none. The first relevant node under `parent` is
/// inserted at `index`; the ops come out in pre-order so every mount finds its
/// parent already present.
///
/// Node handles must compare equal only to themselves: the second visit of a
/// node is recognised by comparing it to the innermost open node.
pub fn mount_ops<B, D>(
    root: &B::Node,
    parent: Option<NodeId>,
    index: usize,
    bindings: &B,
    mut describe: D,
) -> Vec<MutationOp>
where
    B: Bindings + ?Sized,
    B::Node: Clone + PartialEq,
    D: FnMut(&B::Node) -> Option<NodeDescriptor>,
{
    let mut ops = Vec::new();
    let mut open: Vec<(B::Node, Option<NodeId>)> = Vec::new();
    let mut next_index: HashMap<Option<NodeId>, usize> = HashMap::new();
    next_index.insert(parent, index);

    let result = traverse(
        root,
        |node: &B::Node| -> Result<(), Infallible> {
            if open.last().is_some_and(|(top, _)| top == node) {
                open.pop();
                return Ok(());
            }

            let owner = open.iter().rev().find_map(|(_, id)| *id).or(parent);
            let mirrored = describe(node).map(|descriptor| {
                let slot = next_index.entry(owner).or_insert(0);
                ops.push(MutationOp::Mount {
                    id: descriptor.id,
                    parent: owner,
                    index: *slot,
                    attributes: descriptor.attributes,
                });
                *slot = slot.saturating_add(1);
                descriptor.id
            });
            open.push((node.clone(), mirrored));
            Ok(())
        },
        bindings,
    );
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }

    ops
}
