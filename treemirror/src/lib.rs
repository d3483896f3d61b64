//! Mirror of a live component tree for an inspection panel.
//!
//! The instrumented application reports structural changes as batches of
//! [`MutationOp`]s. A [`Session`] applies them to its [`Store`] and keeps the
//! derived views (render list, selection, search, highlight overlay) in step.

pub mod bindings;
pub mod bridge;
pub mod collapse;
pub mod config;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod inbox;
pub mod label;
pub mod node;
pub mod search;
pub mod selection;
pub mod session;
pub mod store;
pub mod view;

pub use bindings::{mount_ops, traverse, Bindings, NodeDescriptor};
pub use bridge::{Bridge, Debouncer, Request};
pub use collapse::Collapser;
pub use config::SessionConfig;
pub use error::{ProtocolError, SearchError};
pub use filter::Filter;
pub use highlight::{highlight_geometry, BoxRect, DomQuery};
pub use node::{Node, NodeAttributes, NodeId, NodeType};
pub use search::{SearchIndex, SearchMode};
pub use selection::{HiddenSelectionPolicy, Selection};
pub use session::Session;
pub use store::{BatchReport, MutationOp, Store};
pub use view::{compute_render_list, RenderList, RenderRow};
