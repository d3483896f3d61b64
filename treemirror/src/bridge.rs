//! Outbound requests to the inspected page.
//!
//! Pointer movement and key repeat can produce dozens of highlight requests a
//! second. Those go through a trailing-edge [`Debouncer`]; inspect requests
//! are sent straight away.

use std::time::{Duration, Instant};

use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::node::NodeId;

/// Default highlight debounce window.
pub const DEFAULT_HIGHLIGHT_WINDOW: Duration = Duration::from_millis(100);

/// Request sent across the boundary to the instrumented runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// Outline a node on the page, or remove the outline.
    Highlight { id: Option<NodeId> },
    /// Load a node's details.
    Inspect { id: NodeId },
}

/// Trailing-edge debounce with caller-supplied time.
///
/// Every [`call`](Self::call) replaces the pending arguments and pushes the
/// deadline out by one window. The callback runs once, with the last
/// arguments, when [`poll`](Self::poll) sees the deadline pass. Superseded
/// arguments are dropped.
pub struct Debouncer<A, F>
where
    F: FnMut(A),
{
    window: Duration,
    callback: F,
    pending: Option<(A, Instant)>,
}

impl<A, F> std::fmt::Debug for Debouncer<A, F>
where
    F: FnMut(A),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("deadline", &self.deadline())
            .finish()
    }
}

impl<A, F> Debouncer<A, F>
where
    F: FnMut(A),
{
    pub fn new(window: Duration, callback: F) -> Self {
        Self {
            window,
            callback,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `args`, replacing anything pending.
    pub fn call(&mut self, args: A, now: Instant) {
        self.pending = Some((args, now + self.window));
    }

    /// Run the callback if the deadline has passed. Returns true if it ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.flush()
        } else {
            false
        }
    }

    /// Run the callback now with the pending arguments, if any.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some((args, _)) => {
                (self.callback)(args);
                true
            }
            None => false,
        }
    }

    /// Drop the pending call. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending call will fire.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

type HighlightSink = Box<dyn FnMut(Option<NodeId>) + Send + Sync>;

/// Sender side of the panel-to-page channel.
pub struct Bridge {
    tx: mpsc::UnboundedSender<Request>,
    highlight: Debouncer<Option<NodeId>, HighlightSink>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("highlight", &self.highlight)
            .finish()
    }
}

impl Bridge {
    /// Create a bridge and the receiver the page side drains.
    pub fn channel(window: Duration) -> (Self, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink_tx = tx.clone();
        let sink: HighlightSink = Box::new(move |id| {
            // Receiver dropped means the page went away.
            let _ = sink_tx.send(Request::Highlight { id });
        });
        let bridge = Self {
            tx,
            highlight: Debouncer::new(window, sink),
        };
        (bridge, rx)
    }

    /// Queue a debounced highlight request.
    pub fn highlight(&mut self, id: Option<NodeId>, now: Instant) {
        trace!("[bridge] highlight {:?} queued", id);
        self.highlight.call(id, now);
    }

    /// Send an inspect request immediately.
    pub fn inspect(&self, id: NodeId) {
        let _ = self.tx.send(Request::Inspect { id });
    }

    /// Deliver the pending highlight if its window has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.highlight.poll(now)
    }

    /// Deliver the pending highlight now.
    pub fn flush(&mut self) -> bool {
        self.highlight.flush()
    }

    /// Drop the pending highlight.
    pub fn cancel(&mut self) -> bool {
        self.highlight.cancel()
    }

    /// When the pending highlight is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.highlight.deadline()
    }
}
