//! Row labels.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::node::Node;

/// Widest key shown next to a name before it is cut.
pub const MAX_KEY_WIDTH: usize = 15;

/// Cut `text` to at most `max_width` columns, ending in `…` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Display label: the name, plus `key="…"` when the node has a key.
pub fn row_label(node: &Node) -> String {
    match &node.key {
        Some(key) => format!("{} key=\"{}\"", node.name, truncate(key, MAX_KEY_WIDTH)),
        None => node.name.clone(),
    }
}

/// Text a search pattern is matched against.
pub fn search_text(node: &Node, include_key: bool) -> String {
    match (&node.key, include_key) {
        (Some(key), true) => format!("{} {}", node.name, key),
        _ => node.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeAttributes, NodeId};

    fn node(name: &str, key: Option<&str>) -> Node {
        let mut attrs = NodeAttributes::component(name);
        if let Some(key) = key {
            attrs = attrs.with_key(key);
        }
        Node::new(NodeId(1), None, 0, attrs)
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate("short", 15), "short");
        assert_eq!(truncate("exactly-fifteen", 15), "exactly-fifteen");
    }

    #[test]
    fn test_truncate_cuts_with_ellipsis() {
        assert_eq!(truncate("a-very-long-key-value", 15), "a-very-long-ke…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character is two columns wide.
        assert_eq!(truncate("日本語テキスト", 6), "日本…");
    }

    #[test]
    fn test_row_label() {
        assert_eq!(row_label(&node("Counter", None)), "Counter");
        assert_eq!(row_label(&node("Item", Some("row-1"))), "Item key=\"row-1\"");
    }

    #[test]
    fn test_search_text() {
        let keyed = node("Item", Some("abc"));
        assert_eq!(search_text(&keyed, false), "Item");
        assert_eq!(search_text(&keyed, true), "Item abc");
    }
}
