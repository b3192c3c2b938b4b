//! Statement Buffer
//!
//! Accumulates input lines until they form a closed unit.
//!
//! Closure is decided lexically: the signed balance of `{}`, `[]` and `()`
//! over the whole buffer, plus the parity of unescaped single and double
//! quotes. A quote counts as escaped when the character right before it is a
//! backslash, so `'\\'` (an escaped backslash followed by the closing quote)
//! is seen as an open string. That is a known limitation of the heuristic.

/// Result of feeding one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// More lines are needed
    Incomplete,
    /// The buffer forms a unit; holds the trimmed text
    Complete(String),
    /// The buffer held only whitespace and was discarded
    Blank,
}

/// Line accumulator with a completeness check
#[derive(Debug, Clone)]
pub struct StatementBuffer {
    buffer: String,
    check_quotes: bool,
}

impl Default for StatementBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementBuffer {
    /// Buffer used for interactive input: brackets and quotes
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            check_quotes: true,
        }
    }

    /// Buffer used for preload files: bracket balance only
    pub fn brackets_only() -> Self {
        Self {
            buffer: String::new(),
            check_quotes: false,
        }
    }

    /// Append a line and report whether a unit is closed
    pub fn feed(
        &mut self,
        line: &str,
    ) -> Feed {
        self.buffer.push_str(line);
        self.buffer.push('\n');

        if !self.is_closed() {
            return Feed::Incomplete;
        }

        let unit = self.buffer.trim().to_string();
        self.buffer.clear();
        if unit.is_empty() {
            Feed::Blank
        } else {
            Feed::Complete(unit)
        }
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop pending lines
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take whatever is pending, trimmed; used at end of a preload file
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = self.buffer.trim().to_string();
        self.buffer.clear();
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    fn is_closed(&self) -> bool {
        let balance = BracketBalance::of(&self.buffer);
        if balance.any_open() {
            return false;
        }
        if self.check_quotes {
            let single = count_unescaped(&self.buffer, '\'');
            let double = count_unescaped(&self.buffer, '"');
            if single % 2 != 0 || double % 2 != 0 {
                return false;
            }
        }
        true
    }
}

/// Signed bracket counts over a text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketBalance {
    pub braces: i64,
    pub brackets: i64,
    pub parens: i64,
}

impl BracketBalance {
    /// Count opening minus closing brackets of each kind
    pub fn of(text: &str) -> Self {
        let mut balance = Self::default();
        for c in text.chars() {
            match c {
                '{' => balance.braces += 1,
                '}' => balance.braces -= 1,
                '[' => balance.brackets += 1,
                ']' => balance.brackets -= 1,
                '(' => balance.parens += 1,
                ')' => balance.parens -= 1,
                _ => {}
            }
        }
        balance
    }

    /// Any kind left open; surplus closers do not count as open
    pub fn any_open(&self) -> bool {
        self.braces > 0 || self.brackets > 0 || self.parens > 0
    }
}

/// Count `quote` characters not immediately preceded by a backslash
fn count_unescaped(
    text: &str,
    quote: char,
) -> usize {
    let mut count = 0;
    let mut prev = None;
    for c in text.chars() {
        if c == quote && prev != Some('\\') {
            count += 1;
        }
        prev = Some(c);
    }
    count
}
