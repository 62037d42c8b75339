use std::fmt::{self, Formatter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, derive_more::From,
)]
pub struct Line(pub usize);

/// Character cursor over a source string.
///
/// Tracks the start of the lexeme currently being scanned, the position of the
/// next unread character and the current line. Offsets are byte offsets, so
/// multi-byte characters are always consumed whole.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: Line,
}

impl<'a> fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The source is usually too verbose, only print it in alternate mode
        let alternate = f.alternate();
        let mut s = f.debug_struct("Cursor");
        s.field("line", &self.line).field("start", &self.start).field("current", &self.current);
        if alternate {
            s.field("source", &self.source);
        }
        s.finish()
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, start: 0, current: 0, line: Line(1) }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Starts a new lexeme at the next unread character.
    pub fn mark_start(&mut self) {
        self.start = self.current;
    }

    /// Text between the last `mark_start` and the current position.
    pub fn lexeme(&self) -> &'a str {
        &self.source[self.start..self.current]
    }

    pub fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line.0 += 1;
        }
        Some(c)
    }

    /// Consumes the next character only if it equals `expected`.
    pub fn advance_if(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Consumes characters as long as `pred` holds. Stops before the first
    /// character that doesn't match, or at the end of the source.
    pub fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}
