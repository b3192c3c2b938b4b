//! Alias Table
//!
//! Records `use Vendor\Package\Name [as Short];` declarations and rewrites
//! later units so short names become fully-qualified ones. Each evaluated
//! unit runs in its own scope, so imports would otherwise be forgotten as soon
//! as the unit that declared them finished.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// `use Qualified\Name;` or `use Qualified\Name as Short;` on a whole line
static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^use\s+\\?([A-Za-z_]\w*(?:\\[A-Za-z_]\w*)*)(?:\s+as\s+([A-Za-z_]\w*))?\s*;$",
    )
    .expect("import pattern is valid")
});

/// One short name binding with its rewrite patterns
#[derive(Debug, Clone)]
struct AliasEntry {
    qualified: String,
    rewrites: Vec<Regex>,
}

impl AliasEntry {
    fn new(
        short: &str,
        qualified: &str,
    ) -> Self {
        let s = regex::escape(short);
        // Group 1 is kept before the name, group 2 (if any) after it
        let patterns = [
            format!(r"\b(new\s+){s}\b"),
            format!(r"(?m)(^|[^\w\\$>]){s}(::)"),
            format!(r"\b(instanceof\s+){s}\b"),
            format!(r"([(,]\s*\??){s}(\s+&?(?:\.\.\.)?\$)"),
            format!(r"(\)\s*:\s*\??){s}\b"),
            format!(r"\b(extends\s+){s}\b"),
            format!(r"\b(implements\s+){s}\b"),
        ];
        let rewrites = patterns
            .iter()
            .map(|p| Regex::new(p).expect("alias pattern is valid"))
            .collect();
        Self {
            qualified: qualified.to_string(),
            rewrites,
        }
    }

    fn apply(
        &self,
        text: &str,
    ) -> String {
        let mut out = text.to_string();
        for re in &self.rewrites {
            let rewritten = re.replace_all(&out, |caps: &Captures<'_>| {
                let before = caps.get(1).map_or("", |m| m.as_str());
                let after = caps.get(2).map_or("", |m| m.as_str());
                format!("{}{}{}", before, self.qualified, after)
            });
            out = rewritten.into_owned();
        }
        out
    }
}

/// Short name to fully-qualified name bindings, in declaration order
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: IndexMap<String, AliasEntry>,
}

impl AliasTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every import line of `unit`.
    ///
    /// Returns true only when the unit consists solely of import declarations
    /// (ignoring blank and comment lines), in which case the caller must not
    /// execute it. Imports found in a mixed unit are still recorded.
    pub fn observe(
        &mut self,
        unit: &str,
    ) -> bool {
        let mut imports = 0;
        let mut others = 0;

        for line in unit.lines() {
            let line = line.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }
            match IMPORT_LINE.captures(line) {
                Some(caps) => {
                    let qualified = &caps[1];
                    let short = caps
                        .get(2)
                        .map(|m| m.as_str())
                        .unwrap_or_else(|| last_segment(qualified));
                    self.declare(short, qualified);
                    imports += 1;
                }
                None => others += 1,
            }
        }

        imports > 0 && others == 0
    }

    /// Bind `short` to `qualified`, replacing any earlier binding
    pub fn declare(
        &mut self,
        short: &str,
        qualified: &str,
    ) {
        debug!("alias {} -> {}", short, qualified);
        self.entries
            .insert(short.to_string(), AliasEntry::new(short, qualified));
    }

    /// Rewrite short names in type positions, one entry at a time
    pub fn resolve(
        &self,
        unit: &str,
    ) -> String {
        self.entries
            .values()
            .fold(unit.to_string(), |text, entry| entry.apply(&text))
    }

    /// Qualified name bound to `short`
    pub fn get(
        &self,
        short: &str,
    ) -> Option<&str> {
        self.entries.get(short).map(|e| e.qualified.as_str())
    }

    /// Short names in declaration order
    pub fn short_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with('#') || line.starts_with("/*") || line.starts_with('*')
}

fn last_segment(qualified: &str) -> &str {
    qualified.rsplit('\\').next().unwrap_or(qualified)
}
