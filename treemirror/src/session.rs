//! Inspection session.
//!
//! A [`Session`] owns one node store and every view derived from it. All
//! writes, whether a mutation batch or a user command, take the write lock
//! once, change the owning component, and re-derive the render list,
//! selection and search before the lock is released. Readers therefore never
//! observe a half-applied batch or a stale derived view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{debug, trace};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bindings::{mount_ops, Bindings, NodeDescriptor};
use crate::bridge::{Bridge, Request};
use crate::collapse::Collapser;
use crate::config::SessionConfig;
use crate::error::SearchError;
use crate::filter::Filter;
use crate::highlight::{highlight_geometry, BoxRect, DomQuery};
use crate::label::row_label;
use crate::node::{Node, NodeId};
use crate::search::{SearchIndex, SearchMode};
use crate::selection::Selection;
use crate::store::{BatchReport, MutationOp, Store};
use crate::view::{compute_render_list, RenderList, RenderRow};

#[derive(Debug)]
struct SessionInner {
    config: SessionConfig,
    store: Store,
    collapser: Collapser,
    filter: Filter,
    list: RenderList,
    selection: Selection,
    search: SearchIndex,
    bridge: Option<Bridge>,
    /// Bumped every time the derived views are recomputed.
    generation: u64,
}

impl SessionInner {
    fn new(config: SessionConfig, bridge: Option<Bridge>) -> Self {
        Self {
            filter: config.filter.clone(),
            search: SearchIndex::new(config.search_mode, config.search_keys),
            config,
            store: Store::new(),
            collapser: Collapser::new(),
            list: RenderList::default(),
            selection: Selection::new(),
            bridge,
            generation: 0,
        }
    }

    fn selection_ancestors(&self) -> Vec<NodeId> {
        self.selection
            .selected()
            .map(|id| self.store.ancestors(id))
            .unwrap_or_default()
    }

    /// Recompute the render list and re-validate selection and search.
    fn rederive(&mut self, ancestors: &[NodeId]) {
        self.list = compute_render_list(&self.store, &self.collapser, &self.filter);
        let policy = self.config.on_hidden_selection;
        if self.selection.revalidate(&self.list, policy, ancestors) {
            match self.selection.selected() {
                Some(id) => self.notify_selected(id),
                None => self.queue_highlight(None),
            }
        }
        self.search.refresh(&self.store, &self.list);
        self.generation += 1;
        trace!(
            "[session] generation {} rows={} selected={:?}",
            self.generation,
            self.list.len(),
            self.selection.selected()
        );
    }

    fn queue_highlight(&mut self, id: Option<NodeId>) {
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.highlight(id, Instant::now());
        }
    }

    fn inspect(&self, id: NodeId) {
        if let Some(bridge) = self.bridge.as_ref() {
            bridge.inspect(id);
        }
    }

    fn notify_selected(&mut self, id: NodeId) {
        self.queue_highlight(Some(id));
        self.inspect(id);
    }

    /// Select the match under the search cursor, if any.
    fn select_search_cursor(&mut self) {
        if let Some(id) = self.search.current()
            && self.selection.select_by_id(&self.list, id)
        {
            self.notify_selected(id);
        }
    }

    fn after_move(&mut self, changed: bool) -> bool {
        if changed && let Some(id) = self.selection.selected() {
            self.notify_selected(id);
        }
        changed
    }

    fn change_collapse(&mut self, change: impl FnOnce(&mut Collapser, &Store) -> bool) -> bool {
        let ancestors = self.selection_ancestors();
        if !change(&mut self.collapser, &self.store) {
            return false;
        }
        self.rederive(&ancestors);
        true
    }
}

/// Handle to one inspection session. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
    dirty: Arc<AtomicBool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a session without an outbound bridge.
    pub fn new(config: SessionConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a session that reports selection and hover to `bridge`.
    pub fn with_bridge(config: SessionConfig, bridge: Bridge) -> Self {
        Self::build(config, Some(bridge))
    }

    /// Create a session with a bridge built from the configured debounce
    /// window, and the receiver the page side drains.
    pub fn connected(config: SessionConfig) -> (Self, UnboundedReceiver<Request>) {
        let (bridge, rx) = Bridge::channel(config.highlight_debounce());
        (Self::with_bridge(config, bridge), rx)
    }

    fn build(config: SessionConfig, bridge: Option<Bridge>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::new(config, bridge))),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn read<R: Default>(&self, f: impl FnOnce(&SessionInner) -> R) -> R {
        self.inner.read().map(|g| f(&g)).unwrap_or_default()
    }

    fn write(&self, f: impl FnOnce(&mut SessionInner) -> bool) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let changed = f(&mut guard);
        if changed {
            self.dirty.store(true, Ordering::SeqCst);
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Mutations from the runtime
    // -------------------------------------------------------------------------

    /// Apply one batch and re-derive every view, atomically for readers.
    pub fn apply_batch(&self, ops: impl IntoIterator<Item = MutationOp>) -> BatchReport {
        let Ok(mut guard) = self.inner.write() else {
            return BatchReport::default();
        };
        let before = guard.selection_ancestors();
        let report = guard.store.apply_batch(ops);
        guard.collapser.prune(&report.removed);
        // A selected node that survived the batch falls back along its new
        // ancestor chain; an unmounted one along the chain it had before.
        let ancestors = match guard.selection.selected() {
            Some(id) if guard.store.contains(id) => guard.store.ancestors(id),
            _ => before,
        };
        guard.rederive(&ancestors);
        self.dirty.store(true, Ordering::SeqCst);
        report
    }

    /// Mirror a freshly rendered internal subtree under `parent`.
    pub fn mirror<B, D>(
        &self,
        root: &B::Node,
        parent: Option<NodeId>,
        index: usize,
        bindings: &B,
        describe: D,
    ) -> BatchReport
    where
        B: Bindings + ?Sized,
        B::Node: Clone + PartialEq,
        D: FnMut(&B::Node) -> Option<NodeDescriptor>,
    {
        let ops = mount_ops(root, parent, index, bindings, describe);
        debug!("[session] mirroring {} nodes under {:?}", ops.len(), parent);
        self.apply_batch(ops)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Snapshot of the current render list.
    pub fn render_list(&self) -> RenderList {
        self.read(|g| g.list.clone())
    }

    pub fn render_ids(&self) -> Vec<NodeId> {
        self.read(|g| g.list.ids())
    }

    pub fn rows(&self) -> Vec<RenderRow> {
        self.read(|g| g.list.rows().to_vec())
    }

    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.read(|g| g.store.get(id).cloned())
    }

    pub fn label(&self, id: NodeId) -> Option<String> {
        self.read(|g| g.store.get(id).map(row_label))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.read(|g| g.store.contains(id))
    }

    pub fn root_ids(&self) -> Vec<NodeId> {
        self.read(|g| g.store.root_ids().to_vec())
    }

    pub fn node_count(&self) -> usize {
        self.read(|g| g.store.len())
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.read(|g| g.selection.selected())
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.read(|g| g.collapser.is_collapsed(id))
    }

    pub fn can_collapse(&self, id: NodeId) -> bool {
        self.read(|g| Collapser::can_collapse(&g.store, id))
    }

    pub fn filter(&self) -> Filter {
        self.read(|g| g.filter.clone())
    }

    pub fn config(&self) -> SessionConfig {
        self.read(|g| g.config.clone())
    }

    pub fn search_query(&self) -> String {
        self.read(|g| g.search.query().to_string())
    }

    pub fn search_matches(&self) -> Vec<NodeId> {
        self.read(|g| g.search.matches().to_vec())
    }

    pub fn search_current(&self) -> Option<NodeId> {
        self.read(|g| g.search.current())
    }

    /// Overlay box for the current selection.
    pub fn highlight<Q>(&self, dom: &Q) -> BoxRect
    where
        Q: DomQuery + ?Sized,
    {
        self.read(|g| {
            highlight_geometry(
                g.selection.selected(),
                &g.store,
                &g.collapser,
                &g.filter,
                dom,
            )
        })
    }

    /// Number of times the derived views have been recomputed.
    pub fn generation(&self) -> u64 {
        self.read(|g| g.generation)
    }

    /// Verify the store's forest invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.inner
            .read()
            .map_err(|_| "session lock poisoned".to_string())
            .and_then(|g| g.store.check_invariants())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Select the next row; no-op on the last row.
    pub fn select_next(&self) -> bool {
        self.write(|g| {
            let changed = g.selection.select_next(&g.list);
            g.after_move(changed)
        })
    }

    /// Select the previous row; no-op on the first row.
    pub fn select_prev(&self) -> bool {
        self.write(|g| {
            let changed = g.selection.select_prev(&g.list);
            g.after_move(changed)
        })
    }

    /// Select `id` if it is visible. Hidden or unknown ids are ignored.
    pub fn select_by_id(&self, id: NodeId) -> bool {
        self.write(|g| {
            let changed = g.selection.select_by_id(&g.list, id);
            if changed {
                g.inspect(id);
            }
            changed
        })
    }

    /// Select the nearest visible ancestor of the selection.
    pub fn select_parent(&self) -> bool {
        self.write(|g| {
            let changed = g.selection.select_parent(&g.store, &g.list);
            g.after_move(changed)
        })
    }

    pub fn clear_selection(&self) -> bool {
        self.write(|g| g.selection.clear())
    }

    /// Pointer hovering over a row, or leaving the tree with `None`.
    pub fn hover(&self, id: Option<NodeId>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.queue_highlight(id);
        }
    }

    // -------------------------------------------------------------------------
    // Collapse
    // -------------------------------------------------------------------------

    /// Flip a visible node's collapsed state.
    pub fn toggle(&self, id: NodeId) -> bool {
        self.write(|g| {
            if g.collapser.is_collapsed(id) {
                g.change_collapse(|c, _| c.expand(id))
            } else if g.list.contains(id) {
                g.change_collapse(|c, store| Collapser::can_collapse(store, id) && c.collapse(id))
            } else {
                trace!("[session] ignoring toggle of hidden {}", id);
                false
            }
        })
    }

    /// Collapse a visible node that has children.
    pub fn collapse(&self, id: NodeId) -> bool {
        self.write(|g| {
            if !g.list.contains(id) {
                return false;
            }
            g.change_collapse(|c, store| Collapser::can_collapse(store, id) && c.collapse(id))
        })
    }

    /// Expand a collapsed node.
    pub fn expand(&self, id: NodeId) -> bool {
        self.write(|g| g.change_collapse(|c, _| c.expand(id)))
    }

    pub fn collapse_all(&self) -> bool {
        self.write(|g| g.change_collapse(|c, store| c.collapse_all(store)))
    }

    pub fn expand_all(&self) -> bool {
        self.write(|g| g.change_collapse(|c, _| c.expand_all()))
    }

    // -------------------------------------------------------------------------
    // Filter and search
    // -------------------------------------------------------------------------

    /// Replace the active filter.
    pub fn set_filter(&self, filter: Filter) -> bool {
        self.write(|g| {
            if g.filter == filter {
                return false;
            }
            let ancestors = g.selection_ancestors();
            g.filter = filter;
            g.rederive(&ancestors);
            true
        })
    }

    /// Compile and run a search pattern and select its first match. An empty
    /// pattern clears the search.
    pub fn set_pattern(&self, pattern: &str) -> Result<(), SearchError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        let g = &mut *guard;
        let result = g.search.set_pattern(pattern, &g.store, &g.list);
        g.select_search_cursor();
        self.dirty.store(true, Ordering::SeqCst);
        result
    }

    /// Switch the matcher kind and re-run the current pattern from its first
    /// match.
    pub fn set_search_mode(&self, mode: SearchMode) -> Result<(), SearchError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        let g = &mut *guard;
        let result = g.search.set_mode(mode, &g.store, &g.list);
        g.select_search_cursor();
        self.dirty.store(true, Ordering::SeqCst);
        result
    }

    /// Go to the next match and select it.
    pub fn search_next(&self) -> Option<NodeId> {
        self.step_search(SearchIndex::next)
    }

    /// Go to the previous match and select it.
    pub fn search_prev(&self) -> Option<NodeId> {
        self.step_search(SearchIndex::prev)
    }

    fn step_search(&self, step: fn(&mut SearchIndex) -> Option<NodeId>) -> Option<NodeId> {
        let mut guard = self.inner.write().ok()?;
        let id = step(&mut guard.search)?;
        guard.select_search_cursor();
        self.dirty.store(true, Ordering::SeqCst);
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Outbound notifications
    // -------------------------------------------------------------------------

    /// Deliver a pending highlight request whose window has elapsed.
    pub fn tick(&self, now: Instant) -> bool {
        self.inner
            .write()
            .ok()
            .and_then(|mut g| g.bridge.as_mut().map(|b| b.tick(now)))
            .unwrap_or(false)
    }

    /// Deliver a pending highlight request immediately.
    pub fn flush_notifications(&self) -> bool {
        self.inner
            .write()
            .ok()
            .and_then(|mut g| g.bridge.as_mut().map(Bridge::flush))
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Whether anything changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}
