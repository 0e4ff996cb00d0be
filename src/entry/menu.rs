//! Per-destination operations (the context menu) and the clipboard.
//!
//! Both work on whole destinations. The store is edited directly and the
//! text follows through the store-driven path.

use super::DestinationEntry;
use crate::commands::Cmd;
use crate::destination::Destination;
use crate::tokenizer;

impl DestinationEntry {
    fn index_at_pos(&self, at: usize) -> Option<usize> {
        let index = tokenizer::index_at(self.text(), at);
        (index < self.store.len()).then_some(index)
    }

    /// Bind a resolved contact destination to another of its addresses
    pub fn select_email(&mut self, at: usize, email_index: usize) {
        let Some(index) = self.index_at_pos(at) else {
            return;
        };
        let Some(hit) = self.store.get(index).and_then(Destination::hit) else {
            tracing::debug!("Destination {} has no contact to pick an address from", index);
            return;
        };
        if hit.contact.is_list || email_index >= hit.contact.emails.len() {
            tracing::debug!("Contact {} has no address {}", hit.contact.id, email_index);
            return;
        }
        self.edit_store(|store| store.set_contact(index, &hit, email_index));
    }

    pub fn set_list_member_ignored(&mut self, at: usize, member: usize, ignored: bool) {
        let Some(index) = self.index_at_pos(at) else {
            return;
        };
        self.edit_store(|store| store.set_member_ignored(index, member, ignored));
    }

    /// Replace a list destination by its enabled members, in place
    pub fn expand_list(&mut self, at: usize) {
        let Some(index) = self.index_at_pos(at) else {
            return;
        };
        let Some(list) = self.store.get(index).filter(|d| d.is_list()) else {
            return;
        };
        let members: Vec<Destination> = list
            .members()
            .iter()
            .filter(|m| !m.is_ignored())
            .map(|m| Destination::from_raw(m.textrep(true)))
            .collect();

        self.edit_store(|store| {
            store.remove_at(index);
            for (offset, member) in members.into_iter().enumerate() {
                store.insert(index + offset, member);
            }
        });
    }

    pub fn remove_destination(&mut self, at: usize) {
        let Some(index) = self.index_at_pos(at) else {
            return;
        };
        self.edit_store(|store| store.remove_at(index));
    }

    pub fn copy_destination(&mut self, at: usize) {
        let Some(text) = self
            .index_at_pos(at)
            .and_then(|index| self.store.get(index))
            .map(clipboard_text)
        else {
            return;
        };
        self.push(Cmd::SetClipboard { text });
    }

    pub fn cut_destination(&mut self, at: usize) {
        self.copy_destination(at);
        self.remove_destination(at);
    }

    /// Ask for a fresh copy of the destination's contact
    pub fn refresh_contact(&mut self, at: usize) {
        let Some(dest) = self.index_at_pos(at).and_then(|index| self.store.get(index)) else {
            return;
        };
        let (Some(id), Some(contact)) = (dest.id(), dest.contact_ref()) else {
            return;
        };
        self.push(Cmd::ResolveContact {
            destination: id,
            contact_id: contact.contact_id,
            book: contact.source_id,
        });
    }

    /// Destinations whose ranges the selection touches; the one under the
    /// cursor when nothing is selected.
    fn selected_indices(&self) -> Vec<usize> {
        let text = self.text();
        let (start, end) = self
            .text
            .selection_bounds()
            .unwrap_or((self.text.cursor(), self.text.cursor()));

        let mut indices: Vec<usize> = tokenizer::ranges(text)
            .iter()
            .enumerate()
            .filter(|(_, r)| r.start < end && r.end > start)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            indices.push(tokenizer::index_at(text, start));
        }
        indices.retain(|&i| i < self.store.len());
        indices
    }

    pub fn copy_selection(&mut self) {
        let text = self
            .selected_indices()
            .into_iter()
            .filter_map(|i| self.store.get(i))
            .filter(|d| !d.is_empty())
            .map(clipboard_text)
            .collect::<Vec<_>>()
            .join(", ");
        if !text.is_empty() {
            self.push(Cmd::SetClipboard { text });
        }
    }

    pub fn cut_selection(&mut self) {
        let indices = self.selected_indices();
        if indices.is_empty() {
            return;
        }
        self.copy_selection();
        let start = self
            .text
            .selection_bounds()
            .map_or(self.text.cursor(), |(start, _)| start);
        self.edit_store(|store| {
            for index in indices.into_iter().rev() {
                store.remove_at(index);
            }
        });
        self.text.set_cursor(start);
    }

    pub fn paste(&mut self, text: &str) {
        self.insert_text(text);
    }
}

/// "Name <email>" for contacts, the list name for lists, raw text otherwise
fn clipboard_text(dest: &Destination) -> String {
    tokenizer::sanitize(&dest.textrep(!dest.is_list()))
}
