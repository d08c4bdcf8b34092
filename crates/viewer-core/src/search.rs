//! Result view model: rendered page listing plus highlight spans.

use crate::extraction::ExtractedText;
use std::ops::Range;

/// Case-insensitive match of `needle` at the start of `haystack`.
///
/// Returns the matched byte length. Characters are compared one to one after
/// lowercasing, so a match always spans as many characters as the needle.
fn match_len_at(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    let mut end = 0;

    for wanted in needle.chars() {
        let (offset, found) = hay.next()?;
        if found != wanted && !found.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
        end = offset + found.len_utf8();
    }

    Some(end)
}

/// Every non-overlapping case-insensitive occurrence, scanning left to right.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    if needle.is_empty() {
        return found;
    }

    let mut start = 0;
    while start < haystack.len() {
        match match_len_at(&haystack[start..], needle) {
            Some(len) => {
                found.push(start..start + len);
                start += len;
            }
            None => {
                let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
                start += step;
            }
        }
    }

    found
}

pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .char_indices()
        .any(|(offset, _)| match_len_at(&haystack[offset..], needle).is_some())
}

/// Entries of `extracted` whose text contains `query`, in page order.
pub fn filter_pages<'a>(extracted: &'a ExtractedText, query: &str) -> Vec<(u32, &'a str)> {
    extracted.iter().filter(|(_, text)| contains_case_insensitive(text, query)).collect()
}

/// What the result panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextView {
    text: String,
    highlights: Vec<Range<usize>>,
}

impl TextView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte ranges into [`TextView::text`].
    pub fn highlights(&self) -> &[Range<usize>] {
        &self.highlights
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.highlights.clear();
    }

    /// Replaces the view with one `Page {n}:` block per entry.
    pub fn render<'a>(&mut self, entries: impl IntoIterator<Item = (u32, &'a str)>) {
        self.clear();
        for (page_number, text) in entries {
            self.text.push_str(&format!("Page {page_number}:\n{text}\n\n"));
        }
    }

    /// Marks every occurrence of `query` in the rendered text.
    pub fn highlight(&mut self, query: &str) {
        self.highlights = find_case_insensitive(&self.text, query);
    }

    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    /// The text cut into consecutive runs, flagged when highlighted.
    pub fn segments(&self) -> Vec<(&str, bool)> {
        let mut segments = Vec::with_capacity(self.highlights.len() * 2 + 1);
        let mut cursor = 0;

        for span in &self.highlights {
            if span.start > cursor {
                segments.push((&self.text[cursor..span.start], false));
            }
            segments.push((&self.text[span.clone()], true));
            cursor = span.end;
        }
        if cursor < self.text.len() {
            segments.push((&self.text[cursor..], false));
        }

        segments
    }
}
