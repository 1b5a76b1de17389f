//! Single-component swapping.

use super::list::AnonymousList;
use super::Component;
use crate::reactive::Readable;

/// Shows whichever component `source` currently holds. Switching to a new
/// component destroys the previous one.
///
/// # Example
///
/// ```rust
/// use filament_core::component::Swap;
/// use filament_core::dom::Document;
/// use filament_core::reactive::Reactive;
/// use filament_core::{html, MountTarget};
///
/// let doc = Document::parse(r#"<div id="app"></div>"#).unwrap();
/// let page = Reactive::new(html!("<h1>home</h1>"));
/// Swap::new(page.clone())
///     .mount(MountTarget::selector(&doc, "#app"))
///     .unwrap();
///
/// page.set(html!("<h1>about</h1>"));
/// assert!(doc.html().contains("about"));
/// ```
pub struct Swap;

impl Swap {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S>(source: S) -> Component
    where
        S: Readable<Component> + Clone + 'static,
    {
        AnonymousList::from_fn(move || vec![source.get()])
    }

    /// Swap driven by a function, re-run whenever a cell it reads changes.
    pub fn from_fn<F>(current: F) -> Component
    where
        F: Fn() -> Component + 'static,
    {
        AnonymousList::from_fn(move || vec![current()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{html, MountTarget};
    use crate::dom::Document;
    use crate::reactive::Reactive;

    #[test]
    fn swapping_destroys_the_previous_component() {
        let doc = Document::parse(r#"<main><div id="app"></div></main>"#).unwrap();
        let main = doc.query_selector("main").unwrap().unwrap();
        let first = html("<p>first</p>", vec![]);
        let second = html("<p>second</p>", vec![]);
        let current = Reactive::new(first.clone());

        let swap = Swap::new(current.clone());
        swap.mount(MountTarget::selector(&doc, "#app")).unwrap();
        assert_eq!(main.text_content(), "first");

        current.set(second.clone());
        assert!(first.is_destroyed());
        assert!(second.is_mounted());
        assert_eq!(main.text_content(), "second");
    }

    #[test]
    fn setting_the_same_component_keeps_it() {
        let doc = Document::parse(r#"<main><div id="app"></div></main>"#).unwrap();
        let only = html("<p>only</p>", vec![]);
        let current = Reactive::new(only.clone());
        let swap = Swap::new(current.clone());
        swap.mount(MountTarget::selector(&doc, "#app")).unwrap();

        current.set(only.clone());

        assert!(only.is_mounted());
        assert!(!only.is_destroyed());
    }

    #[test]
    fn from_fn_follows_a_condition() {
        let doc = Document::parse(r#"<main><div id="app"></div></main>"#).unwrap();
        let main = doc.query_selector("main").unwrap().unwrap();
        let on = Reactive::new(false);
        let on_clone = on.clone();
        let swap = Swap::from_fn(move || {
            if on_clone.get() {
                html("<b>on</b>", vec![])
            } else {
                html("<i>off</i>", vec![])
            }
        });
        swap.mount(MountTarget::selector(&doc, "#app")).unwrap();
        assert_eq!(main.text_content(), "off");

        on.set(true);
        assert_eq!(main.text_content(), "on");
    }
}
