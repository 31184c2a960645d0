use std::mem::take;

/// Text collected by a frame.
///
/// [`Accumulator::replace`] sets the current text aside and starts an empty one,
/// [`Accumulator::restore`] hands the inner text back and reactivates the text that was
/// current before the matching `replace`.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    current: String,
    saved: Vec<String>,
}

impl Accumulator {
    pub(crate) fn push(&mut self, c: char) {
        self.current.push(c);
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.current.push_str(s);
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.current
    }

    /// The length of the current text in bytes.
    pub(crate) fn len(&self) -> usize {
        self.current.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Take the current text, leaving it empty.
    pub(crate) fn take(&mut self) -> String {
        take(&mut self.current)
    }

    pub(crate) fn replace(&mut self) {
        let outer = take(&mut self.current);
        self.saved.push(outer);
    }

    pub(crate) fn restore(&mut self) -> String {
        let outer = self.saved.pop().unwrap_or_default();
        std::mem::replace(&mut self.current, outer)
    }
}
