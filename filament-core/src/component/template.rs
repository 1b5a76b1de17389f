//! Templates and rendered content.
//!
//! A [`Template`] is markup with `{}` holes. Filling the holes with values
//! produces [`Content`]: the final markup plus everything the markup
//! depends on.
//!
//! `{{` and `}}` are literal braces.

use indexmap::{IndexMap, IndexSet};

use super::value::{ReactiveHandle, Value};
use super::{Component, CHILD_MARKER};
use crate::element_ref::Ref;
use crate::error::{Error, Result};

/// Parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Literal text around the holes; always one more than the hole count.
    strings: Vec<String>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut strings = vec![String::new()];
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, chars.peek().copied()) {
                ('{', Some('}')) => {
                    chars.next();
                    strings.push(String::new());
                    continue;
                }
                ('{', Some('{')) | ('}', Some('}')) => {
                    chars.next();
                }
                _ => {}
            }
            if let Some(current) = strings.last_mut() {
                current.push(c);
            }
        }

        Self { strings }
    }

    /// Number of `{}` holes.
    pub fn holes(&self) -> usize {
        self.strings.len() - 1
    }

    /// Fill the holes, reading every reactive value untracked.
    pub(crate) fn fill(&self, values: &[Value]) -> Result<Content> {
        if values.len() != self.holes() {
            return Err(Error::TemplateArity {
                holes: self.holes(),
                values: values.len(),
            });
        }

        let mut content = Content::default();
        for (i, literal) in self.strings.iter().enumerate() {
            content.html.push_str(literal);
            if let Some(value) = values.get(i) {
                content.interpolate(value);
            }
        }
        Ok(content)
    }
}

/// The result of filling a template.
#[derive(Debug, Clone, Default)]
pub(crate) struct Content {
    pub(crate) html: String,
    pub(crate) reactives: IndexSet<ReactiveHandle>,
    pub(crate) components: IndexSet<Component>,
    pub(crate) refs: IndexMap<String, Ref>,
}

impl Content {
    fn interpolate(&mut self, value: &Value) {
        match value {
            Value::Empty => {}
            Value::Text(text) => self.html.push_str(text),
            Value::List(items) => items.iter().for_each(|item| self.interpolate(item)),
            Value::Reactive(handle) => {
                self.reactives.insert(handle.clone());
                let current = handle.current();
                self.interpolate(&current);
            }
            Value::Component(component) => {
                self.components.insert(component.clone());
                self.html.push_str("<!--");
                self.html.push_str(CHILD_MARKER);
                self.html.push_str("-->");
            }
            Value::Ref(reference) => {
                self.html.push_str(reference.token());
                self.refs.insert(reference.token().to_string(), reference.clone());
            }
            Value::Static(inner) => self.interpolate(inner),
        }
    }

    /// Same markup and the same dependency sets.
    pub(crate) fn same_as(&self, other: &Content) -> bool {
        self.html == other.html
            && self.reactives == other.reactives
            && self.components == other.components
            && self.refs.len() == other.refs.len()
            && self.refs.keys().all(|token| other.refs.contains_key(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Reactive;

    #[test]
    fn parses_holes_and_escapes() {
        let template = Template::parse("<p>{}</p>{{x}}{}");
        assert_eq!(template.holes(), 2);
        assert_eq!(template.strings, vec!["<p>", "</p>{x}", ""]);
    }

    #[test]
    fn lone_braces_are_literal() {
        let template = Template::parse("a { b } c");
        assert_eq!(template.holes(), 0);
        assert_eq!(template.strings, vec!["a { b } c"]);
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let template = Template::parse("{}{}");
        let err = template.fill(&[Value::from(1)]).unwrap_err();
        assert!(matches!(err, Error::TemplateArity { holes: 2, values: 1 }));
    }

    #[test]
    fn fill_records_reactives_recursively() {
        let inner = Reactive::new(3);
        let outer = Reactive::new(Value::from(&inner));
        let template = Template::parse("<b>{}</b>");

        let content = template.fill(&[Value::from(&outer)]).unwrap();

        assert_eq!(content.html, "<b>3</b>");
        assert_eq!(content.reactives.len(), 2);
        assert_eq!(inner.subscriber_count(), 0);
    }

    #[test]
    fn fill_flattens_lists_and_skips_empty() {
        let template = Template::parse("{}");
        let value = Value::from(vec![Value::from("a"), Value::Empty, Value::from(1)]);
        let content = template.fill(&[value]).unwrap();
        assert_eq!(content.html, "a1");
    }

    #[test]
    fn same_as_compares_markup_and_dependencies() {
        let cell = Reactive::new(1);
        let template = Template::parse("{}");

        let a = template.fill(&[Value::from(&cell)]).unwrap();
        let b = template.fill(&[Value::from(&cell)]).unwrap();
        let c = template.fill(&[Value::from(Reactive::new(1))]).unwrap();

        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }
}
