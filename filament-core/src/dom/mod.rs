//! Document Model
//!
//! An arena-backed document tree that components render into. It provides
//! the subset of DOM behaviour the component layer relies on: node creation,
//! tree mutation with move semantics, HTML parsing and serialization,
//! compound selectors and event listeners.
//!
//! # Architecture
//!
//! ```text
//! Document (Rc<RefCell<Tree>>)
//!   └── SlotMap<NodeId, NodeData>
//!         ├── kind: Document | Fragment | Element | Text | Comment
//!         ├── parent / children
//!         └── listeners
//! ```
//!
//! [`Node`] is a `(Document, NodeId)` handle. A handle to a released node
//! behaves as a detached, empty node.

mod document;
mod event;
mod node;
mod parse;
mod selector;
mod snapshot;

pub use document::Document;
pub use event::{handler, Event, EventHandler, ListenerOptions};
pub(crate) use event::Listener;
pub use node::{Node, NodeId, NodeKind};
pub use selector::Selector;
pub use snapshot::NodeSnapshot;
