//! Quote-aware splitting of the entry text into address ranges
//!
//! The entry text is a list of addresses separated by commas. A `"` toggles
//! quoted state and commas inside quotes never separate addresses. Spaces
//! directly after a separating comma (or at the start of the text) belong to
//! the separator, not to the following range.
//!
//! Every function scans from the start of the text; nothing is cached, so
//! callers re-derive ranges after each mutation. Offsets are in characters.
//!
//! An unterminated quote leaves the remainder of the text quoted.

use std::ops::Range;

/// `[start, end)` span of one address in the entry text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive of `end`, so a cursor sitting right after the last
    /// character still counts as inside.
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos <= self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Range containing `pos`, or None for an empty text.
pub fn range_at(text: &str, pos: usize) -> Option<TextRange> {
    if text.is_empty() {
        return None;
    }

    let mut quoted = false;
    let mut start = 0;
    let mut end = None;

    for (i, c) in text.chars().enumerate() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                if i < pos {
                    start = i + 1;
                } else {
                    end = Some(i);
                    break;
                }
            }
            ' ' if i == start => start += 1,
            _ => {}
        }
    }

    let end = end.unwrap_or_else(|| text.chars().count());
    Some(TextRange::new(start.min(end), end))
}

/// Whether `pos` lies inside a quoted segment.
pub fn is_quoted_at(text: &str, pos: usize) -> bool {
    text.chars().take(pos).filter(|&c| c == '"').count() % 2 == 1
}

/// Index of the address containing `pos`: unquoted commas strictly before it.
pub fn index_at(text: &str, pos: usize) -> usize {
    let mut quoted = false;
    let mut n = 0;
    for c in text.chars().take(pos) {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => n += 1,
            _ => {}
        }
    }
    n
}

/// Range of the `index`-th address, or None when there are fewer addresses.
pub fn range_by_index(text: &str, index: usize) -> Option<TextRange> {
    let mut quoted = false;
    let mut n = 0;
    let mut pos = 0;

    for c in text.chars() {
        if n >= index {
            break;
        }
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => n += 1,
            _ => {}
        }
        pos += 1;
    }

    if n < index {
        return None;
    }
    range_at(text, pos)
}

/// Text of the address containing `pos`.
pub fn address_at(text: &str, pos: usize) -> Option<String> {
    let range = range_at(text, pos)?;
    Some(slice(text, range))
}

/// Number of address ranges: zero for an empty text, else unquoted commas + 1.
pub fn range_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        index_at(text, usize::MAX) + 1
    }
}

/// All address ranges in order.
pub fn ranges(text: &str) -> Vec<TextRange> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    let mut len = 0;
    for (i, c) in text.chars().enumerate() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                out.push(TextRange::new(start, i));
                start = i + 1;
            }
            ' ' if i == start => start += 1,
            _ => {}
        }
        len = i + 1;
    }
    out.push(TextRange::new(start.min(len), len));
    out
}

/// Characters of `text` covered by `range`.
pub fn slice(text: &str, range: TextRange) -> String {
    text.chars()
        .skip(range.start)
        .take(range.len())
        .collect()
}

/// Strip unquoted commas, tabs and newlines so a textual representation
/// can be written into the entry without creating new ranges.
pub fn sanitize(text: &str) -> String {
    let mut quoted = false;
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => continue,
            '\t' | '\n' => continue,
            _ => {}
        }
        out.push(c);
    }
    out
}
