//! Selectors scoping list and watch calls to harness-managed objects.

use std::fmt;

/// Label carried by every object the harness creates.
pub const LABEL: &str = "argo-e2e";

/// Label and field selectors for a list or watch call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Label selector, e.g. `argo-e2e`.
    pub label_selector: String,
    /// Field selector, e.g. `metadata.name=hello`. Empty matches everything.
    pub field_selector: String,
}

impl ListOptions {
    /// Objects managed by the harness, optionally narrowed to one name.
    ///
    /// An empty `name` matches any managed object.
    pub fn managed(name: &str) -> Self {
        let field_selector = if name.is_empty() {
            String::new()
        } else {
            format!("metadata.name={}", name)
        };
        Self {
            label_selector: LABEL.to_string(),
            field_selector,
        }
    }

    /// Returns the name this selector is narrowed to, if any.
    pub fn name(&self) -> Option<&str> {
        self.field_selector.strip_prefix("metadata.name=")
    }

    /// Returns true if an object with these labels and name is selected.
    ///
    /// Supports the subset of selector syntax the harness emits: comma
    /// separated `key`, `key=value` and `key!=value` terms.
    pub fn matches(&self, labels: &std::collections::BTreeMap<String, String>, name: &str) -> bool {
        if let Some(wanted) = self.name() {
            if wanted != name {
                return false;
            }
        }
        self.label_selector
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .all(|term| {
                if let Some((key, value)) = term.split_once("!=") {
                    labels.get(key).map(String::as_str) != Some(value)
                } else if let Some((key, value)) = term.split_once('=') {
                    labels.get(key).map(String::as_str) == Some(value.trim_start_matches('='))
                } else {
                    labels.contains_key(term)
                }
            })
    }
}

impl fmt::Display for ListOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field_selector.is_empty() {
            write!(f, "{}", self.label_selector)
        } else {
            write!(f, "{},{}", self.label_selector, self.field_selector)
        }
    }
}
