//! Mirrored tree node types.

use serde::{Deserialize, Serialize};

/// Stable identifier of a mirrored node.
///
/// Ids are assigned by the instrumented runtime and are never reused for the
/// lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Kind of a mirrored node, used by filters and row rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Class or function component instance.
    #[default]
    Component,
    /// Grouping entry (fragment, provider, ...) that still gets a row.
    Fragment,
    /// Raw host element such as a `div`.
    HostElement,
    /// Raw text node.
    Text,
}

/// Attributes carried by mount and update operations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Display name.
    pub name: String,
    /// Optional disambiguating key.
    #[serde(default)]
    pub key: Option<String>,
    /// Node kind.
    #[serde(default, rename = "type")]
    pub node_type: NodeType,
}

impl NodeAttributes {
    /// Attributes for a component with the given name.
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            node_type: NodeType::Component,
        }
    }

    /// Attributes for a node of an explicit type.
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            key: None,
            node_type,
        }
    }

    /// Set the key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// One entry in the node store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Child ids in render order.
    pub children: Vec<NodeId>,
    /// Distance from the nearest root (roots are 0).
    pub depth: u32,
    pub name: String,
    pub key: Option<String>,
    pub node_type: NodeType,
}

impl Node {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, depth: u32, attrs: NodeAttributes) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            depth,
            name: attrs.name,
            key: attrs.key,
            node_type: attrs.node_type,
        }
    }

    pub(crate) fn set_attributes(&mut self, attrs: NodeAttributes) {
        self.name = attrs.name;
        self.key = attrs.key;
        self.node_type = attrs.node_type;
    }

    /// Whether this node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
