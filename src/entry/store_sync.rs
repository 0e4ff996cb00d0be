//! Store-driven synchronization: destinations inserted, changed or removed
//! through the store API are written into the text.

use super::{range_for_index, DestinationEntry, SyncDirection};
use crate::destination::Destination;
use crate::store::{ChangeKind, DestinationStore, StoreChange};
use crate::tokenizer;

impl DestinationEntry {
    /// Mutate the store directly; the text follows once `f` returns
    pub fn edit_store<R>(&mut self, f: impl FnOnce(&mut DestinationStore) -> R) -> R {
        let result = f(&mut self.store);
        self.apply_store_changes();
        result
    }

    pub fn set_destinations(&mut self, destinations: Vec<Destination>) {
        self.edit_store(|store| store.replace_all(destinations));
    }

    fn apply_store_changes(&mut self) {
        let changes = self.store.take_changes();
        if changes.is_empty() {
            return;
        }
        if self.sync == SyncDirection::TextDriven {
            tracing::trace!("Dropping {} store changes during text edit", changes.len());
            return;
        }

        let previous = std::mem::replace(&mut self.sync, SyncDirection::StoreDriven);

        if changes.iter().any(|c| c.kind == ChangeKind::Reset) {
            self.rebuild_text();
        } else {
            for change in &changes {
                if !self.apply_store_change(change) {
                    break;
                }
            }
            if !self.is_consistent() {
                tracing::warn!(
                    "Entry text {:?} out of step with {} destinations, rebuilding",
                    self.text(),
                    self.store.len()
                );
                self.rebuild_text();
            }
        }

        self.sync = previous;
        let cmd = self.completion.clear();
        self.push(cmd);
    }

    fn apply_store_change(&mut self, change: &StoreChange) -> bool {
        match (change.kind, &change.new) {
            (ChangeKind::Inserted, Some(dest)) => self.row_inserted(change.index, dest),
            (ChangeKind::Changed, Some(dest)) => self.row_changed(change.index, dest),
            (ChangeKind::Removed, _) => self.row_removed(change.index),
            (ChangeKind::Reset, _) => {
                self.rebuild_text();
                true
            }
            (kind, None) => {
                tracing::error!("{:?} change at {} carries no destination", kind, change.index);
                false
            }
        }
    }

    fn row_inserted(&mut self, index: usize, dest: &Destination) -> bool {
        let text = self.snapshot();
        let rep = self.textrep_for(dest);

        match range_for_index(&text, index) {
            Some(range) if !text.is_empty() && (!range.is_empty() || index == 0) => {
                self.text.insert(range.start, &format!("{}, ", rep));
            }
            _ if index > 0 => {
                let Some(prev) = range_for_index(&text, index - 1) else {
                    tracing::error!(
                        "Destination inserted at {} but text {:?} has no range {}",
                        index,
                        text,
                        index - 1
                    );
                    return false;
                };
                self.text.insert(prev.end, &format!(", {}", rep));
            }
            _ => self.text.insert(0, &rep),
        }
        true
    }

    fn row_changed(&mut self, index: usize, dest: &Destination) -> bool {
        let text = self.snapshot();
        let Some(range) = range_for_index(&text, index) else {
            tracing::error!(
                "Destination changed at {} but text {:?} has no such range",
                index,
                text
            );
            return false;
        };
        let rep = self.textrep_for(dest);
        if tokenizer::slice(&text, range) != rep {
            self.text.replace_range(range.start, range.end, &rep);
        }
        true
    }

    fn row_removed(&mut self, index: usize) -> bool {
        let text = self.snapshot();
        if text.is_empty() {
            return true;
        }
        let ranges = tokenizer::ranges(&text);
        let Some(range) = ranges.get(index) else {
            tracing::error!(
                "Destination removed at {} but text {:?} has no such range",
                index,
                text
            );
            return false;
        };

        if let Some(next) = ranges.get(index + 1) {
            self.text.remove(range.start, next.start);
        } else if index > 0 {
            self.text.remove(ranges[index - 1].end, range.end);
        } else {
            self.text.remove(0, self.text.len());
        }
        true
    }

    /// Rewrite the whole text from the store
    pub(super) fn rebuild_text(&mut self) {
        let text = self.joined_textreps();
        self.text.set_text(&text);
    }

    /// One range per destination; an empty text stands for at most one
    /// empty destination.
    pub(crate) fn is_consistent(&self) -> bool {
        let text = self.text();
        if text.is_empty() {
            return self.store.len() <= 1 && self.store.iter().all(Destination::is_empty);
        }
        tokenizer::range_count(text) == self.store.len()
    }
}
