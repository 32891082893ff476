//! Absolute line stream over a multi-page document.
//!
//! Pages are concatenated into one sequence of lines. Every line keeps the
//! 0-based index of the page it came from, and its position in the stream is
//! its absolute `line_offset`.

use std::ops::Range;

/// Page separator used by text dumps of paged documents.
pub const PAGE_SEPARATOR: char = '\x0c';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLines {
    lines: Vec<String>,
    page_of_line: Vec<usize>,
    page_count: usize,
}

impl DocumentLines {
    /// Build the stream from already-cleaned page texts.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let mut lines = Vec::new();
        let mut page_of_line = Vec::new();
        for (page, text) in pages.iter().enumerate() {
            for line in text.as_ref().split('\n') {
                lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
                page_of_line.push(page);
            }
        }
        Self {
            lines,
            page_of_line,
            page_count: pages.len(),
        }
    }

    /// Build the stream from a single text with form-feed page separators.
    pub fn from_text(text: &str) -> Self {
        let pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
        Self::from_pages(&pages)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn line(&self, offset: usize) -> Option<&str> {
        self.lines.get(offset).map(String::as_str)
    }

    pub fn page_of(&self, offset: usize) -> Option<usize> {
        self.page_of_line.get(offset).copied()
    }

    /// True when the line exists and holds only whitespace.
    pub fn is_blank(&self, offset: usize) -> bool {
        self.line(offset).is_some_and(|l| l.trim().is_empty())
    }

    /// `(line_offset, page_number, line)` for every line, in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.lines
            .iter()
            .zip(&self.page_of_line)
            .enumerate()
            .map(|(offset, (line, page))| (offset, *page, line.as_str()))
    }

    /// Lines in `range`, clamped to the document.
    pub fn slice(&self, range: Range<usize>) -> &[String] {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        &self.lines[start..end]
    }

    /// Whitespace-separated words across the lines in `range`.
    pub fn word_count(&self, range: Range<usize>) -> usize {
        self.slice(range).iter().map(|l| count_words(l)).sum()
    }
}

/// Whitespace-separated word count.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_continue_across_pages() {
        let doc = DocumentLines::from_pages(&["a\nb", "c\nd\ne"]);
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.line(2), Some("c"));
        assert_eq!(doc.page_of(1), Some(0));
        assert_eq!(doc.page_of(2), Some(1));
        assert_eq!(doc.page_of(5), None);
    }

    #[test]
    fn trailing_newline_yields_blank_line() {
        let doc = DocumentLines::from_pages(&["title\n"]);
        assert_eq!(doc.len(), 2);
        assert!(doc.is_blank(1));
        assert!(!doc.is_blank(0));
        assert!(!doc.is_blank(9), "out of range is not blank");
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let doc = DocumentLines::from_pages(&["one\r\ntwo\r"]);
        assert_eq!(doc.line(0), Some("one"));
        assert_eq!(doc.line(1), Some("two"));
    }

    #[test]
    fn from_text_splits_on_form_feed() {
        let doc = DocumentLines::from_text("page one\x0cpage two\nmore");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_of(2), Some(1));
    }

    #[test]
    fn slice_and_word_count_clamp_to_document() {
        let doc = DocumentLines::from_pages(&["one two\nthree", "four five six"]);
        assert_eq!(doc.word_count(0..3), 6);
        assert_eq!(doc.word_count(1..100), 4);
        assert!(doc.slice(10..20).is_empty());
    }
}
