//! Name/type filter applied while deriving the render list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeType};

/// Decides which nodes get a row.
///
/// A rejected node is not shown, but its accepted descendants still are,
/// one level shallower for every rejected ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Node types that never get a row.
    #[serde(default)]
    pub hidden_types: HashSet<NodeType>,
    /// Case-insensitive name substrings that hide a node.
    #[serde(default)]
    pub hidden_names: Vec<String>,
}

impl Default for Filter {
    /// Components and fragments only.
    fn default() -> Self {
        Self {
            hidden_types: HashSet::from([NodeType::HostElement, NodeType::Text]),
            hidden_names: Vec::new(),
        }
    }
}

impl Filter {
    /// A filter that accepts every node.
    pub fn none() -> Self {
        Self {
            hidden_types: HashSet::new(),
            hidden_names: Vec::new(),
        }
    }

    /// Hide nodes of the given type.
    pub fn hide_type(mut self, node_type: NodeType) -> Self {
        self.hidden_types.insert(node_type);
        self
    }

    /// Show nodes of the given type.
    pub fn show_type(mut self, node_type: NodeType) -> Self {
        self.hidden_types.remove(&node_type);
        self
    }

    /// Hide nodes whose name contains `needle` (case-insensitive).
    pub fn hide_name(mut self, needle: impl Into<String>) -> Self {
        self.hidden_names.push(needle.into().to_lowercase());
        self
    }

    /// Whether `node` gets its own row.
    pub fn accepts(&self, node: &Node) -> bool {
        if self.hidden_types.contains(&node.node_type) {
            return false;
        }
        if self.hidden_names.is_empty() {
            return true;
        }
        let name = node.name.to_lowercase();
        !self
            .hidden_names
            .iter()
            .filter(|needle| !needle.is_empty())
            .any(|needle| name.contains(&needle.to_lowercase()))
    }
}
