//! Deep unwrapping of nested reactive values.
//!
//! [`Flatten`] resolves every reactive layer inside a value, so
//! `Reactive<Vec<Reactive<i32>>>` flattens to `Vec<i32>`. Reads are tracked,
//! so flattening inside a derived value subscribes it to every layer.

use std::collections::BTreeMap;

use super::cell::Reactive;
use super::derived::Derived;

/// A value whose reactive layers can be resolved recursively.
pub trait Flatten {
    /// The value with every reactive layer removed.
    type Output;

    /// Resolve all reactive layers, tracking each read.
    fn flatten(&self) -> Self::Output;
}

/// Resolve all reactive layers of `value`.
pub fn flatten<T: Flatten + ?Sized>(value: &T) -> T::Output {
    value.flatten()
}

macro_rules! flatten_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Flatten for $ty {
                type Output = $ty;

                fn flatten(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

flatten_plain!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str, (),
);

impl<T: Flatten + 'static> Flatten for Reactive<T> {
    type Output = T::Output;

    fn flatten(&self) -> T::Output {
        self.with(T::flatten)
    }
}

impl<T: Flatten + 'static> Flatten for Derived<T> {
    type Output = T::Output;

    fn flatten(&self) -> T::Output {
        self.with(T::flatten)
    }
}

impl<T: Flatten> Flatten for Vec<T> {
    type Output = Vec<T::Output>;

    fn flatten(&self) -> Self::Output {
        self.iter().map(T::flatten).collect()
    }
}

impl<T: Flatten> Flatten for Option<T> {
    type Output = Option<T::Output>;

    fn flatten(&self) -> Self::Output {
        self.as_ref().map(T::flatten)
    }
}

impl<K: Ord + Clone, V: Flatten> Flatten for BTreeMap<K, V> {
    type Output = BTreeMap<K, V::Output>;

    fn flatten(&self) -> Self::Output {
        self.iter()
            .map(|(key, value)| (key.clone(), value.flatten()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::derived;

    #[test]
    fn flattens_nested_cells() {
        let inner = Reactive::new(3);
        let outer = Reactive::new(vec![inner.clone(), Reactive::new(4)]);

        assert_eq!(flatten(&outer), vec![3, 4]);

        inner.set(30);
        assert_eq!(flatten(&outer), vec![30, 4]);
    }

    #[test]
    fn flattens_maps_and_options() {
        let mut map = BTreeMap::new();
        map.insert("a", Some(Reactive::new(1)));
        map.insert("b", None);

        let flat = flatten(&map);
        assert_eq!(flat.get("a"), Some(&Some(1)));
        assert_eq!(flat.get("b"), Some(&None));
    }

    #[test]
    fn flatten_tracks_every_layer() {
        let inner = Reactive::new(1);
        let outer = Reactive::new(vec![inner.clone()]);

        let outer_clone = outer.clone();
        let total = derived(move |_| flatten(&outer_clone).iter().sum::<i32>());

        inner.set(5);
        assert_eq!(total.get(), 5);

        outer.set(vec![Reactive::new(2), Reactive::new(3)]);
        assert_eq!(total.get(), 5);
    }
}
