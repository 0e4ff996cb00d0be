//! Text-driven synchronization: insertions and deletions made by the user
//! are applied to the text and mirrored onto the store.

use super::{DestinationEntry, SyncDirection};
use crate::address::normalize_semicolon_list;
use crate::commands::TimerKind;
use crate::destination::Destination;
use crate::tokenizer::{self, TextRange};

impl DestinationEntry {
    /// Insert text at the cursor, replacing the selection
    pub fn insert_text(&mut self, text: &str) {
        if self.sync != SyncDirection::Idle {
            tracing::trace!("Ignoring insertion during {:?} sync", self.sync);
            return;
        }
        if text.is_empty() {
            return;
        }

        if let Some((start, end)) = self.text.selection_bounds() {
            self.delete_range(start, end);
        }

        let text = normalize_semicolon_list(text).unwrap_or_else(|| text.to_string());
        let mut pos = self.text.cursor();

        let inserted = self.text_driven(|this| {
            let mut inserted = 0;

            if !this.has_focus && pos > 0 && pos == this.text.len() {
                // appending to a committed line starts a new address
                this.text.insert(pos, ", ");
                pos += 2;
                this.insert_destination_at(pos);
            }

            if !text.contains(|c: char| matches!(c, ' ' | ',' | '\t' | '\n')) {
                let count = text.chars().count();
                this.text.insert(pos, &text);
                pos += count;
                inserted += count;
                this.after_plain_insert(pos, text.contains('"'));
                return inserted;
            }

            for c in text.chars() {
                let c = match c {
                    '\r' => continue,
                    '\n' | '\t' => {
                        if this.follows_separator(pos) {
                            continue;
                        }
                        ','
                    }
                    c => c,
                };
                inserted += this.insert_unichar(&mut pos, c);
            }
            inserted
        });

        self.text.set_cursor(pos);

        if inserted > 0 && self.has_focus {
            self.completion.set_type_ahead_allowed(true);
            let popup = self
                .completion
                .arm(TimerKind::UpdateCompletions, self.config.popup_refresh_delay_ms);
            let type_ahead = self
                .completion
                .arm(TimerKind::TypeAhead, self.config.type_ahead_delay_ms);
            self.push(popup);
            self.push(type_ahead);
        }
    }

    /// Delete `[start, end)`
    pub fn delete_range(&mut self, start: usize, end: usize) {
        if self.sync != SyncDirection::Idle {
            tracing::trace!("Ignoring deletion during {:?} sync", self.sync);
            return;
        }
        let end = end.min(self.text.len());
        if start >= end {
            return;
        }

        if self.has_focus && end - start == 1 {
            let cmd = self
                .completion
                .arm(TimerKind::UpdateCompletions, self.config.popup_refresh_delay_ms);
            self.push(cmd);
        }
        let cmd = self.completion.cancel(TimerKind::TypeAhead);
        self.push(cmd);
        self.completion.set_type_ahead_allowed(false);

        let text = self.snapshot();
        let first = tokenizer::index_at(&text, start);
        let last = tokenizer::index_at(&text, end);
        let separator = separator_in(&text, start, end);

        let cursor = self.text_driven(|this| {
            if let Some(comma) = separator {
                this.delete_separator(&text, comma, tokenizer::index_at(&text, comma))
            } else if first == last {
                this.delete_within_range(&text, start, end)
            } else {
                this.delete_across_ranges(&text, start, end, first, last)
            }
        });
        self.text.set_cursor(cursor);
    }

    /// Backspace
    pub fn delete_backward(&mut self) {
        if let Some((start, end)) = self.text.selection_bounds() {
            self.delete_range(start, end);
        } else {
            let cursor = self.text.cursor();
            if cursor > 0 {
                self.delete_range(cursor - 1, cursor);
            }
        }
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        if let Some((start, end)) = self.text.selection_bounds() {
            self.delete_range(start, end);
        } else {
            let cursor = self.text.cursor();
            self.delete_range(cursor, cursor + 1);
        }
    }

    /// Insert one character at `pos`, advancing it past whatever was
    /// written. Returns the number of characters written.
    pub(super) fn insert_unichar(&mut self, pos: &mut usize, c: char) -> usize {
        let text = self.snapshot();
        let at = *pos;
        let prev = at.checked_sub(1).and_then(|i| text.chars().nth(i));
        let next = text.chars().nth(at);

        if c == ' ' && (at == 0 || prev == Some(' ') || next == Some(' ')) {
            return 0;
        }

        if c == ',' && !tokenizer::is_quoted_at(&text, at) {
            if at == 0 || prev == Some(',') {
                return 0;
            }
            let Some(range) = tokenizer::range_at(&text, at) else {
                return 0;
            };

            self.text.insert(at, ", ");
            *pos = at + 2;

            if at >= range.end {
                self.insert_destination_at(*pos);
                self.sync_destination_at(at, pos);
            } else if at <= range.start {
                self.insert_destination_at(at);
            } else {
                self.insert_destination_at(*pos);
                self.modify_destination_at(at);
            }
            return 2;
        }

        self.text.insert(at, c.encode_utf8(&mut [0; 4]));
        *pos = at + 1;
        self.after_plain_insert(*pos, c == '"');
        1
    }

    /// Nothing but spaces since the last separator or the start of the text
    fn follows_separator(&self, pos: usize) -> bool {
        let before: String = self.text().chars().take(pos).collect();
        matches!(before.trim_end_matches(' ').chars().last(), None | Some(','))
    }

    fn after_plain_insert(&mut self, pos: usize, quote_changed: bool) {
        if quote_changed {
            self.resync_ranges_from(pos);
            return;
        }
        let index = tokenizer::index_at(self.text(), pos);
        if index < self.store.len() {
            self.modify_destination_at(pos);
        } else {
            self.insert_destination_at(pos);
        }
    }

    /// New destination holding the range at `pos`
    pub(super) fn insert_destination_at(&mut self, pos: usize) {
        let text = self.snapshot();
        let index = tokenizer::index_at(&text, pos);
        let raw = tokenizer::address_at(&text, pos).unwrap_or_default();
        self.store.insert(index, Destination::from_raw(raw));
    }

    /// Point the destination at `pos` to the text of its range. A range that
    /// still reads as the destination's own representation keeps it intact.
    pub(super) fn modify_destination_at(&mut self, pos: usize) -> bool {
        let text = self.snapshot();
        let index = tokenizer::index_at(&text, pos);
        let Some(dest) = self.store.get(index) else {
            return false;
        };
        let raw = tokenizer::address_at(&text, pos).unwrap_or_default();
        if raw != self.textrep_for(dest) {
            self.store.set_raw(index, &raw);
        }
        true
    }

    /// Rewrite the range at `pos` to its destination's representation,
    /// keeping `cursor` on the same logical spot.
    pub(super) fn sync_destination_at(&mut self, pos: usize, cursor: &mut usize) {
        let text = self.snapshot();
        let index = tokenizer::index_at(&text, pos);
        let Some(dest) = self.store.get(index) else {
            return;
        };
        let Some(range) = tokenizer::range_at(&text, pos) else {
            return;
        };
        let rep = self.textrep_for(dest);
        let rep_len = rep.chars().count();

        if *cursor >= range.end {
            *cursor = *cursor - range.len() + rep_len;
        } else if *cursor > range.start {
            *cursor = range.start + rep_len;
        }

        if tokenizer::slice(&text, range) != rep {
            self.text.replace_range(range.start, range.end, &rep);
        }
    }

    /// A quote changed how everything after `pos` splits; make the store
    /// match the ranges from the one at `pos` onwards.
    fn resync_ranges_from(&mut self, pos: usize) {
        let text = self.snapshot();
        let ranges = tokenizer::ranges(&text);
        let index = tokenizer::index_at(&text, pos);

        while self.store.len() < ranges.len() {
            self.store.insert(index + 1, Destination::new());
        }
        while self.store.len() > ranges.len() && index + 1 < self.store.len() {
            self.store.remove_at(index + 1);
        }

        for (i, range) in ranges.iter().enumerate().skip(index) {
            let raw = tokenizer::slice(&text, *range);
            if let Some(dest) = self.store.get(i) {
                if raw != self.textrep_for(dest) {
                    self.store.set_raw(i, &raw);
                }
            }
        }
    }

    /// Delete the unquoted comma at `comma` separating ranges `index` and
    /// `index + 1`. Only an empty neighbour is merged away; between two
    /// addresses the separator is rewritten as it was.
    fn delete_separator(&mut self, text: &str, comma: usize, index: usize) -> usize {
        let before = tokenizer::range_by_index(text, index);
        let after = tokenizer::range_by_index(text, index + 1);
        let (Some(before), Some(after)) = (before, after) else {
            tracing::error!("Separator at {} is not between two ranges", comma);
            return comma;
        };

        if after.is_empty() {
            self.text.remove(comma, after.start);
            if index + 1 < self.store.len() {
                self.store.remove_at(index + 1);
            }
        } else if before.is_empty() {
            self.text.remove(comma, after.start);
            if index < self.store.len() {
                self.store.remove_at(index);
            }
        }
        comma
    }

    fn delete_within_range(&mut self, text: &str, start: usize, end: usize) -> usize {
        let removed = tokenizer::slice(text, TextRange::new(start, end));
        self.text.remove(start, end);

        if self.text.is_empty() {
            if !self.store.is_empty() {
                self.store.remove_at(0);
            }
        } else if removed.contains('"') {
            self.resync_ranges_from(start);
        } else {
            self.modify_destination_at(start);
        }
        start
    }

    /// Deletion spanning a separator. Every range is classified as
    /// untouched, partially deleted (the rest stays as raw text) or fully
    /// covered (its destination goes), and the text is rebuilt from what is
    /// left.
    fn delete_across_ranges(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        first: usize,
        last: usize,
    ) -> usize {
        let mut pieces: Vec<String> = Vec::new();
        let mut rewrites: Vec<(usize, String)> = Vec::new();
        let mut removals: Vec<usize> = Vec::new();
        let mut joined_len = 0;
        let mut cursor = 0;

        for (i, range) in tokenizer::ranges(text).into_iter().enumerate() {
            let touched = (first..=last).contains(&i) && range.end > start && range.start < end;

            let piece = if touched {
                let head = if range.start < start {
                    tokenizer::slice(text, TextRange::new(range.start, start))
                } else {
                    String::new()
                };
                let tail = if range.end > end {
                    tokenizer::slice(text, TextRange::new(end, range.end))
                } else {
                    String::new()
                };
                let rest = format!("{}{}", head, tail).trim().to_string();
                if rest.is_empty() {
                    removals.push(i);
                    continue;
                }
                rewrites.push((i, rest.clone()));
                rest
            } else {
                tokenizer::slice(text, range)
            };

            let offset = if pieces.is_empty() { 0 } else { joined_len + 2 };
            let piece_len = piece.chars().count();
            if range.start < start {
                cursor = offset + piece_len;
            }
            joined_len = offset + piece_len;
            pieces.push(piece);
        }

        let rebuilt = pieces.join(", ");
        let len = self.text.len();
        self.text.replace_range(0, len, &rebuilt);

        for (index, raw) in rewrites {
            if let Some(dest) = self.store.get(index) {
                if raw != self.textrep_for(dest) {
                    self.store.set_raw(index, &raw);
                }
            }
        }
        for index in removals.into_iter().rev() {
            if index < self.store.len() {
                self.store.remove_at(index);
            }
        }

        let removed = tokenizer::slice(text, TextRange::new(start, end));
        if removed.contains('"') && !self.text.is_empty() {
            self.resync_ranges_from(cursor);
        }
        cursor
    }
}

/// Offset of the one unquoted comma when `[start, end)` holds nothing but
/// that comma and spaces
fn separator_in(text: &str, start: usize, end: usize) -> Option<usize> {
    let mut comma = None;
    for (pos, c) in text.chars().enumerate().skip(start).take(end - start) {
        match c {
            ' ' => {}
            ',' if comma.is_none() && !tokenizer::is_quoted_at(text, pos) => comma = Some(pos),
            _ => return None,
        }
    }
    comma
}
