//! Selection over character offsets of a single-line buffer.

/// A text selection with anchor (start point) and head (cursor position).
/// The anchor stays fixed while the head moves during selection extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the cursor is (moving point)
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is empty (anchor == head)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Clamp both ends to a buffer of `len` characters.
    pub fn clamp(&mut self, len: usize) {
        self.anchor = self.anchor.min(len);
        self.head = self.head.min(len);
    }

    /// Shift both ends to account for `removed` characters at `start`
    /// being replaced by `inserted` characters.
    ///
    /// Offsets before the edit are untouched, offsets inside the removed
    /// span collapse to its start, and offsets after it move by the delta.
    /// An offset exactly at a pure insertion point stays in front of it.
    pub fn adjust_for_edit(&mut self, start: usize, removed: usize, inserted: usize) {
        self.anchor = map_offset(self.anchor, start, removed, inserted);
        self.head = map_offset(self.head, start, removed, inserted);
    }
}

fn map_offset(pos: usize, start: usize, removed: usize, inserted: usize) -> usize {
    let end = start + removed;
    if pos <= start {
        pos
    } else if pos >= end {
        pos - removed + inserted
    } else {
        start
    }
}
