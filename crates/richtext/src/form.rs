//! Form scopes, field value sources, and ordered submission data.

use std::fmt;

use crate::output::ControlId;

/// Where a declared field's value comes from at submission time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValueSource {
    /// Value fixed at declaration (hidden inputs). `None` submits nothing.
    Literal(Option<String>),
    /// Read live from the named control when the form submits.
    ExternalRef(ControlId),
}

#[derive(Clone, Debug)]
pub(crate) struct FormInput {
    pub(crate) name: Option<String>,
    pub(crate) source: FieldValueSource,
}

/// One form element's scope. Scopes persist for the lifetime of the document
/// even after the form closes; a control emitted inside a scope submits that
/// scope forever.
#[derive(Clone, Debug)]
pub(crate) struct FormScope {
    pub(crate) action: Option<String>,
    pub(crate) inputs: Vec<FormInput>,
}

/// All scopes ever opened, plus the stack of currently active ones.
#[derive(Clone, Debug, Default)]
pub(crate) struct FormStack {
    scopes: Vec<FormScope>,
    active: Vec<usize>,
}

impl FormStack {
    pub(crate) fn open(&mut self, action: Option<String>) {
        self.scopes.push(FormScope {
            action,
            inputs: Vec::new(),
        });
        self.active.push(self.scopes.len() - 1);
    }

    /// Deactivate the innermost scope. Stray closes are no-ops; the scope
    /// itself is kept for late submissions.
    pub(crate) fn close(&mut self) {
        self.active.pop();
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.active.last().copied()
    }

    /// Declare an input on the innermost active scope. Returns false (and
    /// drops the declaration) when no form is open.
    pub(crate) fn declare(&mut self, input: FormInput) -> bool {
        match self.current() {
            Some(index) => {
                self.scopes[index].inputs.push(input);
                true
            }
            None => {
                log::debug!(
                    target: "richtext.form",
                    "input {:?} declared outside any form",
                    input.name
                );
                false
            }
        }
    }

    pub(crate) fn scope(&self, index: usize) -> &FormScope {
        &self.scopes[index]
    }

    pub(crate) fn clear(&mut self) {
        self.scopes.clear();
        self.active.clear();
    }
}

/// Lookup failed because the key was never added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyNotFound {
    pub key: String,
}

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form data has no value for key {:?}", self.key)
    }
}

impl std::error::Error for KeyNotFound {}

/// Ordered multimap of submitted fields. Insertion order is the declaration
/// order of the form's inputs; duplicate keys keep every value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, or a typed error naming the missing key.
    pub fn lookup(&self, key: &str) -> Result<&str, KeyNotFound> {
        self.get(key).ok_or_else(|| KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Every value for `key`, in insertion order.
    pub fn getlist(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_multimap_semantics() {
        let mut data = FormData::new();
        data.add("a", "1");
        data.add("b", "2");
        data.add("a", "3");
        assert_eq!(data.get("a"), Some("1"));
        assert_eq!(data.getlist("a"), vec!["1", "3"]);
        assert_eq!(data.len(), 3);
        assert!(data.contains_key("b"));
        let pairs: Vec<_> = data.pairs().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("a", "3")]);
    }

    #[test]
    fn lookup_reports_the_missing_key() {
        let data = FormData::new();
        let err = data.lookup("q").unwrap_err();
        assert_eq!(err.key, "q");
        assert!(err.to_string().contains("\"q\""));
        assert_eq!(data.get("q"), None);
    }

    #[test]
    fn scopes_survive_close() {
        let mut forms = FormStack::default();
        forms.open(Some("/go".to_string()));
        let index = forms.current().unwrap();
        forms.close();
        assert_eq!(forms.current(), None);
        assert_eq!(forms.scope(index).action.as_deref(), Some("/go"));
    }

    #[test]
    fn declare_outside_any_form_is_dropped() {
        let mut forms = FormStack::default();
        let declared = forms.declare(FormInput {
            name: Some("x".to_string()),
            source: FieldValueSource::Literal(Some("1".to_string())),
        });
        assert!(!declared);
    }

    #[test]
    fn nested_scopes_stack() {
        let mut forms = FormStack::default();
        forms.open(None);
        let outer = forms.current().unwrap();
        forms.open(Some("/inner".to_string()));
        let inner = forms.current().unwrap();
        assert_ne!(outer, inner);
        forms.close();
        assert_eq!(forms.current(), Some(outer));
    }

    #[test]
    fn stray_close_is_a_no_op() {
        let mut forms = FormStack::default();
        forms.close();
        assert_eq!(forms.current(), None);
    }
}
