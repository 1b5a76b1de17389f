//! Asynchronous Components
//!
//! [`Deferred`] shows an optional loader until a future yields the real
//! component. [`Async`] exposes the same swap as a reactive cell, so the
//! caller decides where and how to show it.
//!
//! Futures run on the current thread's tokio [`LocalSet`]: components are
//! `!Send` and so are the futures producing them.
//!
//! [`LocalSet`]: tokio::task::LocalSet

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use tokio::task::{self, JoinHandle};
use tracing::{debug, trace};

use super::list::AnonymousList;
use super::{Component, Hooks, Lifecycle, MountTarget};
use crate::error::Result;
use crate::reactive::{watch, Readable, Reactive, WatchOptions};

/// Shows `loader` (if any) until the input resolves, then the resolved
/// component. A ready input is shown at once and the loader never is.
pub struct Deferred;

impl Deferred {
    /// Return the component showing `input`, spawning it if pending.
    ///
    /// # Panics
    ///
    /// Panics for a pending input outside a tokio
    /// [`LocalSet`](tokio::task::LocalSet).
    #[allow(clippy::new_ret_no_self)]
    pub fn new(input: impl Into<Awaitable>, loader: Option<Component>) -> Component {
        let alive = Rc::new(Cell::new(true));
        let (current, task) = match input.into() {
            Awaitable::Ready(component) => (Reactive::new(Some(component)), None),
            Awaitable::Pending(future) => {
                let current = Reactive::new(loader);
                let task = {
                    let current = current.clone();
                    let alive = alive.clone();
                    task::spawn_local(async move {
                        let resolved = future.await;
                        if alive.get() {
                            trace!(component = ?resolved.id(), "deferred component resolved");
                            current.set(Some(resolved));
                        }
                    })
                };
                (current, Some(task))
            }
        };

        let view = AnonymousList::from_fn(move || current.get().into_iter().collect());
        Component::new(DeferredComponent { view, task, alive })
    }
}

struct DeferredComponent {
    view: Component,
    task: Option<JoinHandle<()>>,
    alive: Rc<Cell<bool>>,
}

impl Lifecycle for DeferredComponent {
    fn mount(&self, target: MountTarget) -> Result<()> {
        self.view.mount(target)
    }

    fn unmount(&self) {
        self.view.unmount();
    }

    fn render(&self) -> Result<()> {
        self.view.render()
    }

    fn destroy(&self) {
        if !self.alive.replace(false) {
            return;
        }
        if let Some(task) = &self.task {
            task.abort();
        }
        self.view.destroy();
        debug!("destroyed deferred component");
    }

    fn hooks(&self) -> &Hooks {
        self.view.hooks()
    }

    fn is_mounted(&self) -> bool {
        self.view.is_mounted()
    }

    fn is_destroyed(&self) -> bool {
        self.view.is_destroyed()
    }
}

/// A component that is either available now or will be.
#[derive(Clone)]
pub enum Awaitable {
    Ready(Component),
    Pending(Shared<LocalBoxFuture<'static, Component>>),
}

impl Awaitable {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Component> + 'static,
    {
        Awaitable::Pending(future.boxed_local().shared())
    }
}

impl From<Component> for Awaitable {
    fn from(component: Component) -> Self {
        Awaitable::Ready(component)
    }
}

impl fmt::Debug for Awaitable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Awaitable::Ready(component) => f.debug_tuple("Ready").field(component).finish(),
            Awaitable::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// A reactive cell holding the component an [`Awaitable`] resolves to.
pub struct Async;

struct AsyncState {
    current: Reactive<Option<Component>>,
    loader: Option<Component>,
    /// Bumped on every swap; only the latest pending future may write.
    generation: Cell<u64>,
}

impl AsyncState {
    fn swap(self: &Rc<Self>, input: Awaitable) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        match input {
            Awaitable::Ready(component) => self.current.set(Some(component)),
            Awaitable::Pending(future) => {
                if let Some(loader) = &self.loader {
                    self.current.set(Some(loader.clone()));
                }
                let state = self.clone();
                task::spawn_local(async move {
                    let resolved = future.await;
                    if state.generation.get() == generation {
                        state.current.set(Some(resolved));
                    } else {
                        trace!(generation, "discarding superseded resolution");
                    }
                });
            }
        }
    }
}

impl Async {
    /// Cell for a single awaitable. A ready component is shown at once and
    /// the loader never is.
    ///
    /// # Panics
    ///
    /// Panics for a pending input outside a tokio
    /// [`LocalSet`](tokio::task::LocalSet).
    #[allow(clippy::new_ret_no_self)]
    pub fn new(input: Awaitable, loader: Option<Component>) -> Reactive<Option<Component>> {
        let state = Rc::new(AsyncState {
            current: Reactive::new(None),
            loader,
            generation: Cell::new(0),
        });
        state.swap(input);
        state.current.clone()
    }

    /// Cell following a reactive awaitable: every write swaps again.
    pub fn from_reactive<S>(input: &S, loader: Option<Component>) -> Reactive<Option<Component>>
    where
        S: Readable<Awaitable> + Clone + 'static,
    {
        let state = Rc::new(AsyncState {
            current: Reactive::new(None),
            loader,
            generation: Cell::new(0),
        });
        let current = state.current.clone();
        watch(
            input,
            move |next: &Awaitable, _prev: &Awaitable| state.swap(next.clone()),
            WatchOptions::immediate(),
        );
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{html, Swap};
    use crate::dom::{Document, Node};
    use tokio::sync::oneshot;
    use tokio::task::LocalSet;

    fn app() -> (Document, Node) {
        let doc = Document::parse(r#"<main><div id="app"></div></main>"#).unwrap();
        let main = doc.query_selector("main").unwrap().unwrap();
        (doc, main)
    }

    async fn settle() {
        for _ in 0..8 {
            task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn deferred_swaps_loader_for_result() {
        LocalSet::new()
            .run_until(async {
                let (doc, main) = app();
                let (tx, rx) = oneshot::channel::<()>();
                let loader = html("<p>loading</p>", vec![]);
                let view = Deferred::new(
                    Awaitable::pending(async move {
                        rx.await.ok();
                        html("<p>done</p>", vec![])
                    }),
                    Some(loader.clone()),
                );
                view.mount(MountTarget::selector(&doc, "#app")).unwrap();
                assert_eq!(main.text_content(), "loading");

                tx.send(()).unwrap();
                settle().await;

                assert_eq!(main.text_content(), "done");
                assert!(loader.is_destroyed());
            })
            .await;
    }

    #[tokio::test]
    async fn destroyed_deferred_ignores_late_resolution() {
        LocalSet::new()
            .run_until(async {
                let (doc, main) = app();
                let (tx, rx) = oneshot::channel::<()>();
                let result = html("<p>late</p>", vec![]);
                let result_clone = result.clone();
                let view = Deferred::new(
                    Awaitable::pending(async move {
                        rx.await.ok();
                        result_clone
                    }),
                    None,
                );
                view.mount(MountTarget::selector(&doc, "#app")).unwrap();

                view.destroy();
                let _ = tx.send(());
                settle().await;

                assert!(view.is_destroyed());
                assert!(!result.is_mounted());
                assert_eq!(main.inner_html(), "");
            })
            .await;
    }

    #[test]
    fn ready_deferred_shows_component_without_loader() {
        let (doc, main) = app();
        let loader = html("<p>loading</p>", vec![]);
        let view = Deferred::new(html("<p>ready</p>", vec![]), Some(loader.clone()));

        view.mount(MountTarget::selector(&doc, "#app")).unwrap();

        assert_eq!(main.text_content(), "ready");
        assert!(!loader.is_mounted());
    }

    #[test]
    fn ready_input_never_shows_the_loader() {
        let ready = html("<p>ready</p>", vec![]);
        let loader = html("<p>loading</p>", vec![]);

        let current = Async::new(ready.clone().into(), Some(loader));

        assert_eq!(current.get_untracked(), Some(ready));
    }

    #[tokio::test]
    async fn only_the_latest_pending_input_wins() {
        LocalSet::new()
            .run_until(async {
                let (doc, main) = app();
                let (slow_tx, slow_rx) = oneshot::channel::<()>();
                let (fast_tx, fast_rx) = oneshot::channel::<()>();
                let input = Reactive::new(Awaitable::pending(async move {
                    slow_rx.await.ok();
                    html("<p>slow</p>", vec![])
                }));
                let loader = html("<p>loading</p>", vec![]);

                let current = Async::from_reactive(&input, Some(loader.clone()));
                let view = Swap::from_fn(move || {
                    current.get().unwrap_or_else(|| html("", vec![]))
                });
                view.mount(MountTarget::selector(&doc, "#app")).unwrap();
                assert_eq!(main.text_content(), "loading");

                input.set(Awaitable::pending(async move {
                    fast_rx.await.ok();
                    html("<p>fast</p>", vec![])
                }));
                fast_tx.send(()).unwrap();
                settle().await;
                assert_eq!(main.text_content(), "fast");

                slow_tx.send(()).unwrap();
                settle().await;
                assert_eq!(main.text_content(), "fast");
            })
            .await;
    }
}
