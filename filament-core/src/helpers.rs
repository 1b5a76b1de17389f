//! Attribute Helpers
//!
//! Small derived values for building attribute strings inside templates.
//! Both helpers unwrap reactive parts and track them, so the result updates
//! whenever one of those cells is written.

use indexmap::IndexSet;

use crate::component::Value;
use crate::reactive::{derived, Derived};

fn class_names(value: &Value, out: &mut IndexSet<String>) {
    match value {
        Value::List(items) => items.iter().for_each(|item| class_names(item, out)),
        Value::Reactive(handle) => class_names(&handle.read(), out),
        Value::Static(inner) => class_names(inner, out),
        other => {
            if let Some(text) = other.resolve_text(true) {
                let text = text.trim();
                if !text.is_empty() && text != "false" {
                    out.insert(text.to_string());
                }
            }
        }
    }
}

/// Join class names with single spaces.
///
/// Empty parts, `None` and `false` are skipped and repeated names appear
/// once, at their first position.
///
/// # Example
///
/// ```rust
/// use filament_core::component::Value;
/// use filament_core::helpers::cn;
/// use filament_core::reactive::Reactive;
///
/// let active = Reactive::new(Some("active"));
/// let class = cn(vec![
///     Value::from("btn"),
///     Value::from(false),
///     Value::from(&active),
///     Value::from("btn"),
/// ]);
/// assert_eq!(class.get(), "btn active");
///
/// active.set(None);
/// assert_eq!(class.get(), "btn");
/// ```
pub fn cn(parts: Vec<Value>) -> Derived<String> {
    derived(move |_| {
        let mut names = IndexSet::new();
        parts.iter().for_each(|part| class_names(part, &mut names));
        names.into_iter().collect::<Vec<_>>().join(" ")
    })
}

/// Render `key='value'` pairs separated by spaces. Pairs whose value is
/// empty are left out; single quotes in values are escaped.
pub fn attributes<I, K>(pairs: I) -> Derived<String>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let pairs: Vec<(String, Value)> = pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect();

    derived(move |_| {
        pairs
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|(key, value)| {
                let text = value.resolve_text(true)?;
                let escaped = text.replace('\'', "&#39;");
                Some(format!("{key}='{escaped}'"))
            })
            .collect::<Vec<_>>()
            .join(" ")
    })
}
