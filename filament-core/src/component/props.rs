//! Component properties.
//!
//! A component constructor accepts each property either as a reactive cell
//! or as a plain value. [`Prop`] normalizes the two so the component can
//! read either the same way.

use std::fmt::{self, Debug};

use crate::reactive::Reactive;

/// A property value that never changes.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct StaticProp<T>(T);

impl<T> StaticProp<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Debug> Debug for StaticProp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticProp").field(&self.0).finish()
    }
}

/// Wrap `value` as a static property.
pub fn static_prop<T>(value: T) -> StaticProp<T> {
    StaticProp::new(value)
}

/// A normalized component property.
#[derive(Clone)]
pub enum Prop<T> {
    Reactive(Reactive<T>),
    Static(StaticProp<T>),
}

impl<T: Clone + 'static> Prop<T> {
    /// Read the value, tracking the read if the property is reactive.
    pub fn get(&self) -> T {
        match self {
            Prop::Reactive(cell) => cell.get(),
            Prop::Static(value) => value.value().clone(),
        }
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Prop::Reactive(_))
    }
}

impl<T> From<Reactive<T>> for Prop<T> {
    fn from(cell: Reactive<T>) -> Self {
        Prop::Reactive(cell)
    }
}

impl<T> From<StaticProp<T>> for Prop<T> {
    fn from(value: StaticProp<T>) -> Self {
        Prop::Static(value)
    }
}

impl<T: Debug> Debug for Prop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Reactive(cell) => f.debug_tuple("Reactive").field(cell).finish(),
            Prop::Static(value) => value.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::derived;

    #[test]
    fn static_prop_reads_value() {
        let prop: Prop<&str> = static_prop("title").into();
        assert_eq!(prop.get(), "title");
        assert!(!prop.is_reactive());
    }

    #[test]
    fn reactive_prop_is_tracked() {
        let cell = Reactive::new(1);
        let prop: Prop<i32> = cell.clone().into();

        let prop_clone = prop.clone();
        let doubled = derived(move |_| prop_clone.get() * 2);

        cell.set(4);
        assert_eq!(doubled.get(), 8);
        assert!(prop.is_reactive());
    }
}
