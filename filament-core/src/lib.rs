//! Filament Core
//!
//! This crate provides the core runtime for the Filament reactive UI
//! framework. It implements:
//!
//! - Reactive primitives (cells, derived values, effects, watchers)
//! - An arena-backed document tree with parsing, selectors and events
//! - Template components rendered into that tree
//! - Keyed lists, swaps and asynchronous components
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Core reactive primitives and dependency tracking
//! - `dom`: The document tree components render into
//! - `component`: Templates, lifecycle and composite components
//! - `element_ref`: Reactive references to rendered elements
//! - `helpers`: Derived attribute strings
//!
//! Everything is single-threaded. Asynchronous components run their futures
//! on a tokio `LocalSet`.
//!
//! # Example
//!
//! ```rust
//! use filament_core::dom::Document;
//! use filament_core::reactive::{derived, Reactive};
//! use filament_core::{html, MountTarget};
//!
//! let doc = Document::parse(r#"<body><div id="app"></div></body>"#).unwrap();
//!
//! // Create a cell
//! let count = Reactive::new(1);
//!
//! // Create a derived value
//! let count_clone = count.clone();
//! let doubled = derived(move |_| count_clone.get() * 2);
//!
//! // Render both
//! let view = html!("<p>{} x 2 = {}</p>", &count, &doubled);
//! view.mount(MountTarget::selector(&doc, "#app")).unwrap();
//!
//! // Update the cell; the component re-renders
//! count.set(5);
//! assert!(doc.html().contains("<p>5 x 2 = 10</p>"));
//! ```

pub mod component;
pub mod dom;
pub mod element_ref;
pub mod error;
pub mod helpers;
pub mod reactive;

pub use component::{html, Component, Lifecycle, MountTarget, Value};
pub use element_ref::{element_ref, Ref};
pub use error::{Error, Result};
pub use helpers::{attributes, cn};

/// Create a component from a template, converting each value with
/// [`Value::from`].
///
/// ```rust
/// use filament_core::html;
///
/// let name = "filament";
/// let view = html!("<p>{} has {} holes</p>", name, 2);
/// # let _ = view;
/// ```
#[macro_export]
macro_rules! html {
    ($template:expr $(, $value:expr)* $(,)?) => {
        $crate::component::html(
            $template,
            ::std::vec![$($crate::component::Value::from($value)),*],
        )
    };
}
