//! Completion-facing operations: timer firings, query results, type-ahead,
//! popup acceptance and activation.

use super::DestinationEntry;
use crate::commands::{Cmd, TimerKind};
use crate::contact::{ContactField, ContactHit};
use crate::destination::{Destination, DestinationId};
use crate::tokenizer;

impl DestinationEntry {
    pub fn on_timer(&mut self, kind: TimerKind, generation: u64) {
        if !self.completion.accept_timer(kind, generation) {
            return;
        }
        if !self.has_focus {
            tracing::trace!("Ignoring {:?} timer without focus", kind);
            return;
        }
        match kind {
            TimerKind::UpdateCompletions => self.update_completions(),
            TimerKind::TypeAhead => self.type_ahead(),
        }
    }

    /// Query for the range under the cursor, or drop the candidates when
    /// the cursor is not at the end of a long enough range.
    fn update_completions(&mut self) {
        let text = self.snapshot();
        let cursor = self.text.cursor();
        let cmd = match tokenizer::range_at(&text, cursor) {
            Some(range)
                if range.len() >= self.config.minimum_query_length && cursor == range.end =>
            {
                let cue = tokenizer::slice(&text, range);
                self.completion.start_query(&cue)
            }
            _ => self.completion.clear(),
        };
        self.push(cmd);
    }

    /// Complete the range under the cursor to the best match and bind its
    /// destination. The completed suffix is left selected.
    fn type_ahead(&mut self) {
        let text = self.snapshot();
        let cursor = self.text.cursor();
        let Some(range) = tokenizer::range_at(&text, cursor) else {
            return;
        };
        if range.len() < self.config.minimum_query_length {
            return;
        }
        let index = tokenizer::index_at(&text, cursor);
        let cue = tokenizer::slice(&text, range);

        if let Some(dest) = self.store.get(index) {
            if dest.is_resolved() && self.textrep_for(dest) == cue {
                return;
            }
        }

        let Some(best) = self.completion.best_match(&cue) else {
            return;
        };
        let completion = tokenizer::sanitize(&best.text);
        let completion_len = completion.chars().count();
        let email_index = match best.cue_match.field {
            ContactField::Email => best.cue_match.email_index,
            _ => 0,
        };
        tracing::debug!(cue = %cue, completion = %completion, "type-ahead");

        self.text_driven(|this| {
            if completion_len > range.len() {
                // keep what the user typed, case included
                let merged: String = cue
                    .chars()
                    .chain(completion.chars().skip(range.len()))
                    .collect();
                this.text.replace_range(range.start, range.end, &merged);
                this.text.select(range.end, range.start + completion_len);
                this.completion.mark_type_ahead_applied();
            }

            if index < this.store.len() {
                this.store.set_contact(index, &best.hit, email_index);
            } else {
                this.store
                    .insert(index, Destination::from_contact(&best.hit, email_index));
            }
        });
    }

    pub fn on_query_result(&mut self, generation: u64, hit: ContactHit) {
        if !self.completion.on_result(generation, hit) {
            return;
        }
        if self.has_focus
            && self.completion.type_ahead_allowed()
            && !self.completion.is_armed(TimerKind::TypeAhead)
        {
            let cmd = self
                .completion
                .arm(TimerKind::TypeAhead, self.config.results_delay_ms);
            self.push(cmd);
        }
    }

    pub fn on_query_failed(&mut self, generation: u64, error: &str) {
        self.completion.on_failed(generation, error);
    }

    pub fn on_query_finished(&mut self, generation: u64) {
        self.completion.on_finished(generation);
    }

    /// Bind the destination under the cursor to a popup row and open a new
    /// empty address after it.
    pub fn accept_candidate(&mut self, row: usize) {
        let Some(candidate) = self.completion.candidates().into_iter().nth(row) else {
            tracing::debug!("No popup row {}", row);
            return;
        };

        let text = self.snapshot();
        let cursor = self.text.cursor();
        let index = tokenizer::index_at(&text, cursor);
        let mut pos = cursor;

        let id = self.text_driven(|this| {
            if index >= this.store.len() {
                this.insert_destination_at(cursor);
            }
            this.store
                .set_contact(index, &candidate.hit, candidate.email_index);
            this.sync_destination_at(cursor, &mut pos);

            this.text.insert(pos, ", ");
            pos += 2;
            this.insert_destination_at(pos);
            this.store.get(index).and_then(Destination::id)
        });

        self.text.set_cursor(pos);
        self.push(Cmd::NotifyUpdated { destination: id });
        let cmd = self.completion.reset();
        self.push(cmd);
    }

    /// Enter: commit the destination under the cursor
    pub fn activate(&mut self) {
        let text = self.snapshot();
        let cursor = self.text.cursor();
        let Some(range) = tokenizer::range_at(&text, cursor) else {
            return;
        };
        if range.len() < self.config.minimum_query_length {
            return;
        }
        let index = tokenizer::index_at(&text, cursor);
        if self.store.get(index).is_none() {
            return;
        }

        let completing = self.completion.is_completing();
        let had_selection = self.text.selection_bounds().is_some();
        let mut pos = cursor;

        let (id, end) = self.text_driven(|this| {
            this.sync_destination_at(cursor, &mut pos);
            let id = this.store.get(index).and_then(Destination::id);

            let text = this.snapshot();
            let mut end = tokenizer::range_at(&text, pos).map_or(pos, |r| r.end);
            if completing {
                if text.chars().nth(end) == Some(',') {
                    end = (end + 2).min(this.text.len());
                } else {
                    this.insert_unichar(&mut end, ',');
                }
            }
            (id, end)
        });

        if completing || !had_selection {
            self.text.set_cursor(end);
        }
        self.push(Cmd::NotifyUpdated { destination: id });
        if completing {
            let cmd = self.completion.clear();
            self.push(cmd);
        }
    }

    /// Comma typed over a selection: accept what the selection shows, then
    /// continue after it.
    pub fn commit_selection(&mut self) {
        let Some((_, end)) = self.text.selection_bounds() else {
            return;
        };
        self.activate();
        let cmd = self.completion.reset();
        self.push(cmd);
        self.sanitize();
        self.text.set_cursor(end);
    }

    /// A re-fetched contact replaces the one the destination is bound to
    pub fn on_contact_resolved(&mut self, destination: DestinationId, hit: Option<ContactHit>) {
        let Some(index) = self.store.index_of(destination) else {
            tracing::debug!("Resolved contact for departed destination {:?}", destination);
            return;
        };
        let Some(hit) = hit else {
            tracing::debug!("Contact for destination {:?} no longer exists", destination);
            return;
        };
        let email_index = self
            .store
            .get(index)
            .map_or(0, Destination::email_index)
            .min(hit.contact.emails.len().saturating_sub(1));
        self.edit_store(|store| store.set_contact(index, &hit, email_index));
    }
}
