//! Completion Engine
//!
//! Classifies what the cursor sits on and produces sorted, deduplicated
//! candidates from the session state.
//!
//! Classification, first match wins:
//! 1. `$obj->` right before the cursor: members of `obj`, filtered by the
//!    word the line editor reported.
//! 2. `$obj->par` right before the cursor: members of `obj` starting with
//!    `par`.
//! 3. Anything else: the word is rebuilt by walking back over identifier
//!    characters, namespace separators and an optional `$`. A leading `\` is
//!    dropped, as declared names are never fully qualified. Variables come
//!    from the binding tracker (case-sensitive); everything else from
//!    callables, keywords, types and aliases (case-insensitive). The part of
//!    the rebuilt word that the editor did not report is stripped from every
//!    candidate, since the editor only replaces its own word.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::session::SessionState;

/// `$name->` (optionally nullsafe) at the end of the text
static MEMBER_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z_]\w*)\s*\??->$").expect("member access pattern is valid")
});

/// `$name->partial` at the end of the text
static MEMBER_PARTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z_]\w*)\??->(\w+)$").expect("member partial pattern is valid")
});

/// Magic members worth offering even though they start with `__`
pub const MAGIC_ALLOW_LIST: &[&str] = &["__invoke", "__toString"];

/// Reserved words offered by global completion
pub const KEYWORDS: &[&str] = &[
    "abstract", "and", "array", "as", "break", "callable", "case", "catch", "class", "clone",
    "const", "continue", "declare", "default", "do", "echo", "else", "elseif", "empty",
    "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "enum", "eval",
    "exit", "extends", "false", "final", "finally", "fn", "for", "foreach", "function", "global",
    "goto", "if", "implements", "include", "include_once", "instanceof", "insteadof",
    "interface", "isset", "list", "match", "namespace", "new", "null", "or", "print", "private",
    "protected", "public", "readonly", "require", "require_once", "return", "static", "switch",
    "throw", "trait", "true", "try", "unset", "use", "var", "while", "xor", "yield",
];

/// What the cursor is positioned on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Member of the object bound to `object`, filtered by `prefix`
    Member { object: String, prefix: String },
    /// `$`-prefixed word
    Variable { word: String, strip: usize },
    /// Bare or namespace-qualified word
    Global { word: String, strip: usize },
    /// Nothing to complete
    Empty,
}

/// Classify the completion context for `line` with the cursor at `cursor`
pub fn classify(
    line: &str,
    cursor: usize,
    partial: &str,
) -> CompletionContext {
    let before = text_before(line, cursor);

    if let Some(caps) = MEMBER_ACCESS.captures(before) {
        return CompletionContext::Member {
            object: caps[1].to_string(),
            prefix: partial.to_string(),
        };
    }

    if let Some(caps) = MEMBER_PARTIAL.captures(before) {
        return CompletionContext::Member {
            object: caps[1].to_string(),
            prefix: caps[2].to_string(),
        };
    }

    let word = rebuild_word(before);
    if word.is_empty() {
        return CompletionContext::Empty;
    }
    let strip = word.len().saturating_sub(partial.len());
    if word.starts_with('$') {
        CompletionContext::Variable {
            word: word.to_string(),
            strip,
        }
    } else {
        CompletionContext::Global {
            word: word.to_string(),
            strip,
        }
    }
}

/// Completion Engine
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    keywords: &'static [&'static str],
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionEngine {
    /// Create an engine with the default keyword list
    pub fn new() -> Self {
        Self { keywords: KEYWORDS }
    }

    /// Candidates for the word at `cursor`, sorted ascending
    pub fn complete(
        &self,
        state: &SessionState,
        line: &str,
        cursor: usize,
        partial: &str,
    ) -> Vec<String> {
        match classify(line, cursor, partial) {
            CompletionContext::Member { object, prefix } => {
                let Some(members) = state.registry.members(&object) else {
                    return Vec::new();
                };
                members
                    .iter()
                    .filter(|m| is_offered_member(m))
                    .filter(|m| m.starts_with(prefix.as_str()))
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            }
            CompletionContext::Variable { word, strip } => {
                let matches = state
                    .tracker
                    .names()
                    .filter(|name| name.starts_with(word.as_str()));
                strip_prefix(matches, strip)
            }
            CompletionContext::Global { word, strip } => {
                let symbols = &state.symbols;
                let matches = symbols
                    .functions
                    .iter()
                    .map(String::as_str)
                    .chain(self.keywords.iter().copied())
                    .chain(symbols.classes.iter().map(String::as_str))
                    .chain(state.aliases.short_names())
                    .filter(|name| starts_with_ignore_case(name, &word));
                strip_prefix(matches, strip)
            }
            CompletionContext::Empty => Vec::new(),
        }
    }
}

/// Sort, deduplicate and drop the first `strip` bytes of each candidate
fn strip_prefix<'a>(
    matches: impl Iterator<Item = &'a str>,
    strip: usize,
) -> Vec<String> {
    matches
        .filter_map(|name| name.get(strip..))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn is_offered_member(name: &str) -> bool {
    !name.starts_with("__") || MAGIC_ALLOW_LIST.contains(&name)
}

fn starts_with_ignore_case(
    candidate: &str,
    prefix: &str,
) -> bool {
    candidate.len() >= prefix.len()
        && candidate.is_char_boundary(prefix.len())
        && candidate[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Clamp the cursor to a char boundary and return the text before it
fn text_before(
    line: &str,
    cursor: usize,
) -> &str {
    let mut cursor = cursor.min(line.len());
    while !line.is_char_boundary(cursor) {
        cursor -= 1;
    }
    &line[..cursor]
}

/// Identifier character, as far as completion is concerned
pub fn is_word_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

/// Walk back over identifier runs, `\` separators and one leading `$`;
/// the global-namespace `\` is not part of the word
fn rebuild_word(before: &str) -> &str {
    let mut start = before.len();
    for (i, c) in before.char_indices().rev() {
        if is_word_char(c) || c == '\\' {
            start = i;
        } else {
            break;
        }
    }
    if before[..start].ends_with('$') {
        start -= 1;
    }
    let word = &before[start..];
    word.strip_prefix('\\').unwrap_or(word)
}
