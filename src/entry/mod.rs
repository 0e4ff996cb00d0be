//! Destination entry - an editable address line kept in step with a store
//!
//! The text is a comma-separated list of addresses and the store holds one
//! destination per address range, in the same order. Edits flow in one
//! direction at a time:
//! - `text_sync` - user edits to the text, mapped onto the store
//! - `store_sync` - store mutations, mapped onto the text
//! - `complete` - timers, type-ahead, popup acceptance and activation
//! - `menu` - per-destination operations and the clipboard
//!
//! While one direction is applying its change the other direction's
//! handlers are suppressed; see [`SyncDirection`].

mod complete;
mod menu;
mod store_sync;
mod text_sync;

use crate::commands::Cmd;
use crate::completion::{Candidate, CompletionEngine};
use crate::config::EntryConfig;
use crate::destination::{Destination, DestinationSummary};
use crate::editable::{EditableState, StringBuffer};
use crate::store::DestinationStore;
use crate::tokenizer::{self, TextRange};

/// Which side is currently propagating a change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncDirection {
    #[default]
    Idle,
    /// A text edit is being mapped onto the store; store notifications
    /// are dropped.
    TextDriven,
    /// A store change is being mapped onto the text; user edit handlers
    /// are ignored.
    StoreDriven,
}

#[derive(Debug, Default)]
pub struct DestinationEntry {
    text: EditableState<StringBuffer>,
    store: DestinationStore,
    completion: CompletionEngine,
    config: EntryConfig,
    sync: SyncDirection,
    has_focus: bool,
    /// Commands produced since the last `take_commands`
    outbox: Vec<Cmd>,
}

impl DestinationEntry {
    pub fn new(config: EntryConfig) -> Self {
        Self {
            config: config.normalized(),
            ..Self::default()
        }
    }

    /// Entry showing `destinations`, unfocused
    pub fn with_destinations(config: EntryConfig, destinations: Vec<Destination>) -> Self {
        let mut entry = Self::new(config);
        entry.set_destinations(destinations);
        entry.outbox.clear();
        entry
    }

    pub fn text(&self) -> &str {
        self.text.buffer.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.text.cursor()
    }

    pub fn selection_bounds(&self) -> Option<(usize, usize)> {
        self.text.selection_bounds()
    }

    pub fn store(&self) -> &DestinationStore {
        &self.store
    }

    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    pub fn completion(&self) -> &CompletionEngine {
        &self.completion
    }

    /// Popup rows for the current cue
    pub fn candidates(&self) -> Vec<Candidate> {
        self.completion.candidates()
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn sync_direction(&self) -> SyncDirection {
        self.sync
    }

    /// Destination under a text position
    pub fn destination_at(&self, pos: usize) -> Option<&Destination> {
        self.store.get(tokenizer::index_at(self.text(), pos))
    }

    /// Non-empty destinations as the composer reads them
    pub fn summaries(&self) -> Vec<DestinationSummary> {
        self.store
            .iter()
            .filter(|d| !d.is_empty())
            .map(Destination::summary)
            .collect()
    }

    /// Text written into the entry for a destination. The address is shown
    /// when configured, or when the contact has several to choose from.
    pub fn textrep_for(&self, destination: &Destination) -> String {
        let show_email = !destination.is_list()
            && (self.config.show_address
                || destination.contact().is_some_and(|c| c.emails.len() > 1));
        tokenizer::sanitize(&destination.textrep(show_email))
    }

    /// Drain commands produced by the operations since the last call
    pub fn take_commands(&mut self) -> Cmd {
        Cmd::batch(std::mem::take(&mut self.outbox))
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.text.set_cursor(pos);
    }

    pub fn select(&mut self, anchor: usize, head: usize) {
        self.text.select(anchor, head);
    }

    pub fn select_all(&mut self) {
        self.text.select_all();
    }

    /// Rebuild the text from the store, leaving room for a new address
    pub fn focus_in(&mut self) {
        if self.has_focus {
            return;
        }
        self.has_focus = true;

        self.text_driven(|this| {
            let mut text = this.joined_textreps();
            let tail: Vec<char> = text.chars().rev().take(2).collect();
            let open = tail.len() == 2 && (tail[0] == ' ' || tail[1] == ',');
            let has_placeholder = this.store.iter().last().is_some_and(Destination::is_empty);

            if !open && !has_placeholder {
                this.store.append(Destination::new());
                if !text.is_empty() {
                    text.push_str(", ");
                }
            }
            this.text.set_text(&text);
        });
    }

    /// Commit the address under the cursor and drop everything unfinished
    pub fn focus_out(&mut self) {
        if !self.has_focus {
            return;
        }
        self.activate();
        let cmd = self.completion.reset();
        self.push(cmd);
        self.sanitize();
        self.has_focus = false;
    }

    /// Abort completion, keeping the text
    pub fn escape(&mut self) {
        let cmd = self.completion.reset();
        self.push(cmd);
    }

    /// Drop destinations without an address and rewrite the text from the
    /// rest.
    pub fn sanitize(&mut self) {
        self.text_driven(|this| {
            let empty: Vec<usize> = this
                .store
                .iter()
                .enumerate()
                .filter(|(_, d)| d.address().is_none())
                .map(|(i, _)| i)
                .collect();
            for index in empty.into_iter().rev() {
                this.store.remove_at(index);
            }
            let text = this.joined_textreps();
            this.text.set_text(&text);
        });
    }

    fn push(&mut self, cmd: Cmd) {
        if !cmd.is_none() {
            self.outbox.push(cmd);
        }
    }

    /// Run a text-side edit. Store notifications raised inside are dropped.
    fn text_driven<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.sync, SyncDirection::TextDriven);
        let result = f(self);
        let dropped = self.store.take_changes();
        if !dropped.is_empty() {
            tracing::trace!("Suppressed {} store notifications", dropped.len());
        }
        self.sync = previous;
        result
    }

    fn snapshot(&self) -> String {
        self.text().to_string()
    }

    fn joined_textreps(&self) -> String {
        self.store
            .iter()
            .map(|d| self.textrep_for(d))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Range of the `index`-th address. An empty text has one empty range.
fn range_for_index(text: &str, index: usize) -> Option<TextRange> {
    if text.is_empty() {
        return (index == 0).then(|| TextRange::new(0, 0));
    }
    tokenizer::range_by_index(text, index)
}
