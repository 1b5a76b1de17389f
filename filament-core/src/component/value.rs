//! Template values.
//!
//! Everything interpolated into a template is converted into a [`Value`].
//! Reactive cells are erased behind [`ReactiveHandle`] so a template can
//! hold cells of different types and still subscribe to all of them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::props::{Prop, StaticProp};
use super::Component;
use crate::element_ref::Ref;
use crate::reactive::{CellId, Derived, Reactive, Trackable};

/// A value interpolated into a template.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Renders nothing.
    #[default]
    Empty,
    /// Raw markup or text, inserted as is.
    Text(String),
    /// Each item rendered in order.
    List(Vec<Value>),
    /// A cell whose current value is rendered and whose writes re-render.
    Reactive(ReactiveHandle),
    /// A child component, mounted onto a placeholder comment.
    Component(Component),
    /// An element reference, rendered as its token.
    Ref(Ref),
    /// A static component property.
    Static(Box<Value>),
}

impl Value {
    /// Resolve to text, reading reactive layers with or without tracking.
    /// Returns `None` for values that carry no text.
    pub(crate) fn resolve_text(&self, tracked: bool) -> Option<String> {
        match self {
            Value::Empty | Value::Component(_) | Value::Ref(_) => None,
            Value::Text(text) => Some(text.clone()),
            Value::List(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.resolve_text(tracked))
                    .collect(),
            ),
            Value::Reactive(handle) => {
                let current = if tracked { handle.read() } else { handle.current() };
                current.resolve_text(tracked)
            }
            Value::Static(inner) => inner.resolve_text(tracked),
        }
    }
}

/// Type-erased access to a reactive cell.
pub trait AnyReactive: Trackable {
    /// Current value without tracking.
    fn current(&self) -> Value;

    /// Current value, tracking the read.
    fn read(&self) -> Value;
}

impl<T> AnyReactive for Reactive<T>
where
    T: Clone + Into<Value> + 'static,
{
    fn current(&self) -> Value {
        self.get_untracked().into()
    }

    fn read(&self) -> Value {
        self.get().into()
    }
}

impl<T> AnyReactive for Derived<T>
where
    T: Clone + Into<Value> + 'static,
{
    fn current(&self) -> Value {
        self.get_untracked().into()
    }

    fn read(&self) -> Value {
        self.get().into()
    }
}

/// A reactive cell of any value type. Equality and hashing use the cell's
/// identity.
#[derive(Clone)]
pub struct ReactiveHandle(Rc<dyn AnyReactive>);

impl ReactiveHandle {
    pub fn new<R: AnyReactive + 'static>(reactive: R) -> Self {
        Self(Rc::new(reactive))
    }

    pub fn current(&self) -> Value {
        self.0.current()
    }

    pub fn read(&self) -> Value {
        self.0.read()
    }
}

impl Trackable for ReactiveHandle {
    fn cell_id(&self) -> CellId {
        self.0.cell_id()
    }
}

impl PartialEq for ReactiveHandle {
    fn eq(&self, other: &Self) -> bool {
        self.cell_id() == other.cell_id()
    }
}

impl Eq for ReactiveHandle {}

impl Hash for ReactiveHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell_id().hash(state);
    }
}

impl fmt::Debug for ReactiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReactiveHandle").field(&self.cell_id()).finish()
    }
}

macro_rules! value_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Text(value.to_string())
                }
            }
        )*
    };
}

value_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &str, &String,
);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Empty
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Empty, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value> + 'static> From<Reactive<T>> for Value {
    fn from(cell: Reactive<T>) -> Self {
        Value::Reactive(ReactiveHandle::new(cell))
    }
}

impl<T: Clone + Into<Value> + 'static> From<&Reactive<T>> for Value {
    fn from(cell: &Reactive<T>) -> Self {
        Value::Reactive(ReactiveHandle::new(cell.clone()))
    }
}

impl<T: Clone + Into<Value> + 'static> From<Derived<T>> for Value {
    fn from(derived: Derived<T>) -> Self {
        Value::Reactive(ReactiveHandle::new(derived))
    }
}

impl<T: Clone + Into<Value> + 'static> From<&Derived<T>> for Value {
    fn from(derived: &Derived<T>) -> Self {
        Value::Reactive(ReactiveHandle::new(derived.clone()))
    }
}

impl From<Component> for Value {
    fn from(component: Component) -> Self {
        Value::Component(component)
    }
}

impl From<&Component> for Value {
    fn from(component: &Component) -> Self {
        Value::Component(component.clone())
    }
}

impl From<Ref> for Value {
    fn from(reference: Ref) -> Self {
        Value::Ref(reference)
    }
}

impl From<&Ref> for Value {
    fn from(reference: &Ref) -> Self {
        Value::Ref(reference.clone())
    }
}

impl<T: Clone + Into<Value>> From<StaticProp<T>> for Value {
    fn from(prop: StaticProp<T>) -> Self {
        Value::Static(Box::new(prop.into_inner().into()))
    }
}

impl<T: Clone + Into<Value> + 'static> From<Prop<T>> for Value {
    fn from(prop: Prop<T>) -> Self {
        match prop {
            Prop::Reactive(cell) => cell.into(),
            Prop::Static(value) => value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_stringify() {
        assert!(matches!(Value::from(42), Value::Text(text) if text == "42"));
        assert!(matches!(Value::from(true), Value::Text(text) if text == "true"));
        assert!(matches!(Value::from("a"), Value::Text(text) if text == "a"));
    }

    #[test]
    fn none_is_empty() {
        assert!(matches!(Value::from(None::<i32>), Value::Empty));
        assert!(matches!(Value::from(()), Value::Empty));
    }

    #[test]
    fn handles_compare_by_cell() {
        let cell = Reactive::new(1);
        let a = ReactiveHandle::new(cell.clone());
        let b = ReactiveHandle::new(cell);
        let c = ReactiveHandle::new(Reactive::new(1));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resolve_text_unwraps_nested_cells() {
        let inner = Reactive::new(String::from("x"));
        let outer = Reactive::new(Value::from(&inner));
        let value = Value::from(vec![Value::from("a"), Value::from(outer)]);

        assert_eq!(value.resolve_text(false).as_deref(), Some("ax"));

        inner.set("y".into());
        assert_eq!(value.resolve_text(false).as_deref(), Some("ay"));
    }

    #[test]
    fn static_props_wrap_their_value() {
        let value = Value::from(StaticProp::new(5));
        assert_eq!(value.resolve_text(false).as_deref(), Some("5"));
    }
}
