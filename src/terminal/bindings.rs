//! Binding Tracker
//!
//! Lexical index of variable names seen in submitted source, used only to
//! offer `$name` completions. Matching over-reports: a name
//! that was never bound costs nothing, a missed name costs a completion.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// `$name =` (assignment target)
static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_]\w*)\s*=").expect("assignment pattern is valid"));

/// `as $v` or `as $k => $v`
static LOOP_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bas\s+&?\$([A-Za-z_]\w*)(?:\s*=>\s*&?\$([A-Za-z_]\w*))?")
        .expect("loop pattern is valid")
});

/// Parameter list after `function` / `fn`
static PARAMETER_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:function|fn)\b\s*&?\s*(?:[A-Za-z_]\w*)?\s*\(([^)]*)\)")
        .expect("parameter pattern is valid")
});

/// Any `$name`
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_]\w*)").expect("variable pattern is valid"));

/// Session-wide set of variable names, sigil included
#[derive(Debug, Clone, Default)]
pub struct BindingTracker {
    names: BTreeSet<String>,
}

impl BindingTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a unit and add every candidate name; returns the names found in it
    pub fn track(
        &mut self,
        unit: &str,
    ) -> BTreeSet<String> {
        let found = extract(unit);
        self.names.extend(found.iter().cloned());
        found
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.names.contains(name)
    }

    /// All tracked names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Union of the four scans over `unit`; names carry the `$` sigil
pub fn extract(unit: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for caps in ASSIGNMENT.captures_iter(unit) {
        names.insert(format!("${}", &caps[1]));
    }

    for caps in LOOP_BINDING.captures_iter(unit) {
        names.insert(format!("${}", &caps[1]));
        if let Some(value) = caps.get(2) {
            names.insert(format!("${}", value.as_str()));
        }
    }

    for caps in PARAMETER_LIST.captures_iter(unit) {
        for param in VARIABLE.captures_iter(&caps[1]) {
            names.insert(format!("${}", &param[1]));
        }
    }

    for caps in VARIABLE.captures_iter(unit) {
        names.insert(format!("${}", &caps[1]));
    }

    names
}
