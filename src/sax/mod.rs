pub mod attributes;
pub mod error;
pub mod handler;
pub mod namespace;
pub mod parser;
pub mod source;

/// The position of the last character consumed by the parser.
///
/// Lines and columns start at 1. A line feed moves to the next line, after
/// end-of-line normalization has turned `\r\n` and `\r` into a single line feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    line: usize,
    column: usize,
}

impl Locator {
    pub(crate) fn new() -> Self {
        Self { line: 1, column: 0 }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub(crate) fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}
