//! EditableState - a text buffer with one cursor and its selection.

use super::buffer::{TextBuffer, TextBufferMut};
use super::selection::Selection;

/// Editable text with a single cursor.
///
/// Every mutation goes through [`EditableState::replace_range`] so the
/// selection follows the text it was attached to.
#[derive(Debug, Clone, Default)]
pub struct EditableState<B: TextBuffer> {
    /// The text buffer
    pub buffer: B,
    selection: Selection,
}

impl<B: TextBuffer> EditableState<B> {
    pub fn new(buffer: B) -> Self {
        let len = buffer.len_chars();
        Self {
            buffer,
            selection: Selection::collapsed(len),
        }
    }

    /// Cursor offset (the selection head)
    pub fn cursor(&self) -> usize {
        self.selection.head
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selected span as (start, end), None when collapsed
    pub fn selection_bounds(&self) -> Option<(usize, usize)> {
        if self.selection.is_empty() {
            None
        } else {
            Some((self.selection.start(), self.selection.end()))
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Move the cursor and drop any selection
    pub fn set_cursor(&mut self, pos: usize) {
        let pos = pos.min(self.len());
        self.selection = Selection::collapsed(pos);
    }

    /// Select `[anchor, head)`; the cursor ends up at `head`
    pub fn select(&mut self, anchor: usize, head: usize) {
        let len = self.len();
        self.selection = Selection::new(anchor.min(len), head.min(len));
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::new(0, self.len());
    }
}

impl<B: TextBufferMut> EditableState<B> {
    /// Replace `[start, end)` with `text`, keeping the selection attached.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.buffer.remove(start..end);
        self.buffer.insert(start, text);
        self.selection
            .adjust_for_edit(start, end - start, text.chars().count());
        self.selection.clamp(self.len());
    }

    pub fn insert(&mut self, pos: usize, text: &str) {
        self.replace_range(pos, pos, text);
    }

    pub fn remove(&mut self, start: usize, end: usize) {
        self.replace_range(start, end, "");
    }

    /// Replace the whole content, preserving the selection where it still fits
    pub fn set_text(&mut self, text: &str) {
        let selection = self.selection;
        self.buffer.set_content(text);
        self.selection = selection;
        self.selection.clamp(self.len());
    }
}
