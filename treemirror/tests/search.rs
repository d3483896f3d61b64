use treemirror::{
    compute_render_list, Collapser, Filter, MutationOp, NodeAttributes, NodeId, RenderList,
    SearchError, SearchIndex, SearchMode, Store,
};

fn id(n: u64) -> NodeId {
    NodeId(n)
}

/// App(1) ─┬─ Counter(2) ── Button(3)
///         └─ CounterRow(4) key="row-1"
fn store() -> Store {
    let mut store = Store::new();
    store.apply_batch([
        MutationOp::mount(1, None, "App"),
        MutationOp::mount(2, Some(1), "Counter"),
        MutationOp::mount(3, Some(2), "Button"),
        MutationOp::Mount {
            id: id(4),
            parent: Some(id(1)),
            index: usize::MAX,
            attributes: NodeAttributes::component("CounterRow").with_key("row-1"),
        },
    ]);
    store
}

fn list(store: &Store) -> RenderList {
    compute_render_list(store, &Collapser::new(), &Filter::default())
}

// ============================================================================
// Substring
// ============================================================================

#[test]
fn test_substring_matches_in_render_order() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Counter", &store, &list).unwrap();

    assert_eq!(search.matches(), &[id(2), id(4)]);
    assert_eq!(search.current(), Some(id(2)));
    assert!(search.is_active());
    assert!(!search.is_match(id(3)));
}

#[test]
fn test_next_and_prev_wrap() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("counter", &store, &list).unwrap();

    assert_eq!(search.next(), Some(id(4)));
    assert_eq!(search.next(), Some(id(2)));
    assert_eq!(search.prev(), Some(id(4)));
    assert_eq!(search.cursor(), Some(1));
}

#[test]
fn test_no_matches() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Missing", &store, &list).unwrap();
    assert!(search.matches().is_empty());
    assert_eq!(search.current(), None);
    assert_eq!(search.next(), None);
    assert_eq!(search.prev(), None);
}

#[test]
fn test_empty_pattern_clears() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Counter", &store, &list).unwrap();
    search.set_pattern("", &store, &list).unwrap();
    assert!(!search.is_active());
    assert!(search.matches().is_empty());
    assert_eq!(search.query(), "");
}

#[test]
fn test_keys_only_match_when_enabled() {
    let store = store();
    let list = list(&store);

    let mut names = SearchIndex::new(SearchMode::Substring, false);
    names.set_pattern("row-1", &store, &list).unwrap();
    assert!(names.matches().is_empty());

    let mut keys = SearchIndex::new(SearchMode::Substring, true);
    keys.set_pattern("row-1", &store, &list).unwrap();
    assert_eq!(keys.matches(), &[id(4)]);
}

#[test]
fn test_hidden_rows_do_not_match() {
    let store = store();
    let mut collapser = Collapser::new();
    collapser.collapse(id(2));
    let list = compute_render_list(&store, &collapser, &Filter::default());
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Button", &store, &list).unwrap();
    assert!(search.matches().is_empty());
}

// ============================================================================
// Regex and fuzzy
// ============================================================================

#[test]
fn test_regex_is_case_insensitive() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Regex, false);
    search.set_pattern("^counter$", &store, &list).unwrap();
    assert_eq!(search.matches(), &[id(2)]);
}

#[test]
fn test_invalid_regex_leaves_search_cleared() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Regex, false);
    search.set_pattern("Counter", &store, &list).unwrap();

    let err = search.set_pattern("(unclosed", &store, &list).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    assert!(!search.is_active());
    assert!(search.matches().is_empty());
}

#[test]
fn test_fuzzy_matches_subsequence() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Fuzzy, false);
    search.set_pattern("ctrw", &store, &list).unwrap();
    assert_eq!(search.matches(), &[id(4)]);
}

#[test]
fn test_set_mode_recompiles_pattern() {
    let store = store();
    let list = list(&store);
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Counter$", &store, &list).unwrap();
    assert!(search.matches().is_empty());

    search.set_mode(SearchMode::Regex, &store, &list).unwrap();
    assert_eq!(search.mode(), SearchMode::Regex);
    assert_eq!(search.query(), "Counter$");
    assert_eq!(search.matches(), &[id(2)]);
}

// ============================================================================
// Refresh
// ============================================================================

#[test]
fn test_refresh_keeps_cursor_on_same_id() {
    let mut store = store();
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Counter", &store, &list(&store)).unwrap();
    search.next();
    assert_eq!(search.current(), Some(id(4)));

    store.apply_batch([MutationOp::mount(5, Some(1), "CounterTotal")]);
    search.refresh(&store, &list(&store));
    assert_eq!(search.matches(), &[id(2), id(4), id(5)]);
    assert_eq!(search.current(), Some(id(4)));
}

#[test]
fn test_refresh_resets_cursor_when_match_disappears() {
    let mut store = store();
    let mut search = SearchIndex::new(SearchMode::Substring, false);
    search.set_pattern("Counter", &store, &list(&store)).unwrap();
    search.next();

    store.apply_batch([MutationOp::unmount(4)]);
    search.refresh(&store, &list(&store));
    assert_eq!(search.matches(), &[id(2)]);
    assert_eq!(search.current(), Some(id(2)));
}
