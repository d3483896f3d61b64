use treemirror::{
    compute_render_list, Collapser, Filter, HiddenSelectionPolicy, MutationOp, NodeId, RenderList,
    Selection, Store,
};

fn id(n: u64) -> NodeId {
    NodeId(n)
}

/// 1 ─┬─ 2 ── 3
///    └─ 4
fn store() -> Store {
    let mut store = Store::new();
    store.apply_batch([
        MutationOp::mount(1, None, "App"),
        MutationOp::mount(2, Some(1), "List"),
        MutationOp::mount(3, Some(2), "Item"),
        MutationOp::mount(4, Some(1), "Footer"),
    ]);
    store
}

fn list(store: &Store, collapser: &Collapser) -> RenderList {
    compute_render_list(store, collapser, &Filter::none())
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_next_without_selection_selects_first() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    assert!(selection.select_next(&list));
    assert_eq!(selection.selected(), Some(id(1)));
}

#[test]
fn test_prev_without_selection_selects_first() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    assert!(selection.select_prev(&list));
    assert_eq!(selection.selected(), Some(id(1)));
}

#[test]
fn test_next_walks_render_order() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    let mut seen = Vec::new();
    while selection.select_next(&list) {
        seen.push(selection.selected().unwrap().0);
    }
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

#[test]
fn test_boundaries_are_noops() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();

    selection.select_last(&list);
    assert_eq!(selection.selected(), Some(id(4)));
    assert!(!selection.select_next(&list));
    assert_eq!(selection.selected(), Some(id(4)));

    selection.select_first(&list);
    assert!(!selection.select_prev(&list));
    assert_eq!(selection.selected(), Some(id(1)));
}

#[test]
fn test_next_then_prev_returns_to_start() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&list, id(2));
    selection.select_next(&list);
    assert_eq!(selection.selected(), Some(id(3)));
    selection.select_prev(&list);
    assert_eq!(selection.selected(), Some(id(2)));
}

#[test]
fn test_navigation_skips_collapsed_rows() {
    let store = store();
    let mut collapser = Collapser::new();
    collapser.collapse(id(2));
    let list = list(&store, &collapser);
    let mut selection = Selection::new();
    selection.select_by_id(&list, id(2));
    selection.select_next(&list);
    assert_eq!(selection.selected(), Some(id(4)));
}

#[test]
fn test_empty_list() {
    let list = RenderList::default();
    let mut selection = Selection::new();
    assert!(!selection.select_next(&list));
    assert!(!selection.select_last(&list));
    assert_eq!(selection.selected(), None);
}

// ============================================================================
// Select by id
// ============================================================================

#[test]
fn test_select_hidden_id_is_ignored() {
    let store = store();
    let mut collapser = Collapser::new();
    collapser.collapse(id(2));
    let list = list(&store, &collapser);
    let mut selection = Selection::new();
    selection.select_by_id(&list, id(1));

    assert!(!selection.select_by_id(&list, id(3)));
    assert!(!selection.select_by_id(&list, id(99)));
    assert_eq!(selection.selected(), Some(id(1)));
}

#[test]
fn test_select_same_id_reports_no_change() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    assert!(selection.select_by_id(&list, id(2)));
    assert!(!selection.select_by_id(&list, id(2)));
}

#[test]
fn test_select_parent() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&list, id(3));
    assert!(selection.select_parent(&store, &list));
    assert_eq!(selection.selected(), Some(id(2)));
    selection.select_by_id(&list, id(1));
    assert!(!selection.select_parent(&store, &list));
}

// ============================================================================
// Revalidation
// ============================================================================

#[test]
fn test_revalidate_keeps_visible_selection() {
    let store = store();
    let list = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&list, id(3));
    let changed = selection.revalidate(&list, HiddenSelectionPolicy::Clear, &[id(2), id(1)]);
    assert!(!changed);
    assert_eq!(selection.selected(), Some(id(3)));
}

#[test]
fn test_revalidate_clears_hidden_selection() {
    let store = store();
    let full = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&full, id(3));

    let mut collapser = Collapser::new();
    collapser.collapse(id(2));
    let pruned = list(&store, &collapser);
    let ancestors = store.ancestors(id(3));
    assert!(selection.revalidate(&pruned, HiddenSelectionPolicy::Clear, &ancestors));
    assert_eq!(selection.selected(), None);
}

#[test]
fn test_revalidate_moves_to_nearest_visible_ancestor() {
    let store = store();
    let full = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&full, id(3));

    let mut collapser = Collapser::new();
    collapser.collapse(id(2));
    let pruned = list(&store, &collapser);
    let ancestors = store.ancestors(id(3));
    assert!(selection.revalidate(
        &pruned,
        HiddenSelectionPolicy::NearestVisibleAncestor,
        &ancestors
    ));
    assert_eq!(selection.selected(), Some(id(2)));
}

#[test]
fn test_revalidate_without_visible_ancestor_clears() {
    let mut store = store();
    let full = list(&store, &Collapser::new());
    let mut selection = Selection::new();
    selection.select_by_id(&full, id(3));
    let ancestors = store.ancestors(id(3));

    store.apply_batch([MutationOp::unmount(1)]);
    let empty = list(&store, &Collapser::new());
    selection.revalidate(&empty, HiddenSelectionPolicy::NearestVisibleAncestor, &ancestors);
    assert_eq!(selection.selected(), None);
}
