//! Completion engine - debounce timers, query generations and ranking
//!
//! The engine never touches the entry text. It tracks which timer firings
//! and query results are still current, collects the contacts delivered for
//! the current cue and ranks them for type-ahead and the popup.
//!
//! Ranking: field rank (full name, nickname, file-as, email), then the
//! matched value compared case-insensitively, then arrival order.

use std::collections::HashMap;

use crate::commands::{Cmd, TimerKind};
use crate::contact::{ContactHit, CueMatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionState {
    #[default]
    Idle,
    /// A query for the current cue is outstanding
    Querying,
    /// The range under the cursor was rewritten to the best match
    TypeAheadApplied,
    /// Candidates are available for the popup
    PopupShown,
}

#[derive(Debug, Clone, Copy, Default)]
struct TimerSlot {
    generation: u64,
    armed: bool,
}

/// One popup row: a contact address, or a whole list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub hit: ContactHit,
    pub email_index: usize,
    pub text: String,
    /// Field rank of the cue match, 4 when the row did not match the cue
    pub rank: u8,
}

/// Best type-ahead match for a cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMatch {
    pub hit: ContactHit,
    pub cue_match: CueMatch,
    /// Text to write into the entry
    pub text: String,
}

#[derive(Debug, Default)]
pub struct CompletionEngine {
    state: CompletionState,
    update_timer: TimerSlot,
    type_ahead_timer: TimerSlot,
    query_generation: u64,
    query_active: bool,
    cue: Option<String>,
    results: Vec<ContactHit>,
    /// Contact description -> source ident of the first book that sent it
    known_contacts: HashMap<String, String>,
    is_completing: bool,
    /// Results may trigger type-ahead; off after a deletion
    type_ahead_allowed: bool,
}

impl CompletionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn cue(&self) -> Option<&str> {
        self.cue.as_deref()
    }

    pub fn query_generation(&self) -> u64 {
        self.query_generation
    }

    /// A type-ahead rewrite is waiting to be accepted or overwritten
    pub fn is_completing(&self) -> bool {
        self.is_completing
    }

    pub fn type_ahead_allowed(&self) -> bool {
        self.type_ahead_allowed
    }

    pub fn set_type_ahead_allowed(&mut self, allowed: bool) {
        self.type_ahead_allowed = allowed;
    }

    pub fn results(&self) -> &[ContactHit] {
        &self.results
    }

    fn slot(&mut self, kind: TimerKind) -> &mut TimerSlot {
        match kind {
            TimerKind::UpdateCompletions => &mut self.update_timer,
            TimerKind::TypeAhead => &mut self.type_ahead_timer,
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::UpdateCompletions => self.update_timer.armed,
            TimerKind::TypeAhead => self.type_ahead_timer.armed,
        }
    }

    /// (Re)arm a timer. Earlier firings of the same kind become stale.
    pub fn arm(&mut self, kind: TimerKind, delay_ms: u64) -> Cmd {
        let slot = self.slot(kind);
        slot.generation += 1;
        slot.armed = true;
        Cmd::StartTimer {
            kind,
            generation: slot.generation,
            delay_ms,
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) -> Cmd {
        let slot = self.slot(kind);
        slot.generation += 1;
        if std::mem::replace(&mut slot.armed, false) {
            Cmd::CancelTimer { kind }
        } else {
            Cmd::None
        }
    }

    pub fn cancel_timers(&mut self) -> Cmd {
        Cmd::batch(vec![
            self.cancel(TimerKind::UpdateCompletions),
            self.cancel(TimerKind::TypeAhead),
        ])
    }

    /// Consume a timer firing; false when it was cancelled or re-armed since
    pub fn accept_timer(&mut self, kind: TimerKind, generation: u64) -> bool {
        let slot = self.slot(kind);
        if !slot.armed || slot.generation != generation {
            tracing::trace!(
                "Ignoring stale {:?} timer: generation {} (current {}, armed {})",
                kind,
                generation,
                slot.generation,
                slot.armed
            );
            return false;
        }
        slot.armed = false;
        true
    }

    /// Supersede any outstanding query with one for `cue`
    pub fn start_query(&mut self, cue: &str) -> Cmd {
        self.query_generation += 1;
        self.query_active = true;
        self.cue = Some(cue.to_string());
        self.results.clear();
        self.known_contacts.clear();
        self.state = CompletionState::Querying;
        tracing::debug!(generation = self.query_generation, cue, "completion query");
        Cmd::batch(vec![
            Cmd::CancelQueries,
            Cmd::QueryContacts {
                generation: self.query_generation,
                cue: cue.to_string(),
            },
        ])
    }

    /// Drop the candidate model. Late results of the current query are
    /// discarded from now on.
    pub fn clear(&mut self) -> Cmd {
        self.query_generation += 1;
        self.cue = None;
        self.results.clear();
        self.known_contacts.clear();
        self.is_completing = false;
        self.state = CompletionState::Idle;
        if std::mem::replace(&mut self.query_active, false) {
            Cmd::CancelQueries
        } else {
            Cmd::None
        }
    }

    /// Timers and queries both stopped
    pub fn reset(&mut self) -> Cmd {
        Cmd::batch(vec![self.cancel_timers(), self.clear()])
    }

    /// Record one delivered contact. Returns false for stale generations and
    /// for contacts already delivered by another book.
    pub fn on_result(&mut self, generation: u64, hit: ContactHit) -> bool {
        if generation != self.query_generation {
            tracing::debug!(
                "Skipping stale query result: generation {} != current {}",
                generation,
                self.query_generation
            );
            return false;
        }

        if self.is_duplicate_and_remember(&hit) {
            tracing::debug!("Hiding duplicate contact {} from {}", hit.contact.id, hit.book);
            return false;
        }

        self.results.push(hit);
        if self.state == CompletionState::Querying {
            self.state = CompletionState::PopupShown;
        }
        true
    }

    pub fn on_failed(&mut self, generation: u64, error: &str) {
        if generation == self.query_generation {
            tracing::warn!("Contact query failed, treating as no match: {}", error);
        }
    }

    pub fn on_finished(&mut self, generation: u64) {
        if generation == self.query_generation {
            self.query_active = false;
            if self.state == CompletionState::Querying {
                self.state = CompletionState::Idle;
            }
        }
    }

    fn is_duplicate_and_remember(&mut self, hit: &ContactHit) -> bool {
        let Some(description) = hit.contact.description() else {
            return false;
        };
        let source = hit.source_ident();
        match self.known_contacts.get(&description) {
            Some(known) => *known != source,
            None => {
                self.known_contacts.insert(description, source);
                false
            }
        }
    }

    pub fn mark_type_ahead_applied(&mut self) {
        self.is_completing = true;
        self.state = CompletionState::TypeAheadApplied;
    }

    /// Best match for `cue` among the delivered contacts
    pub fn best_match(&self, cue: &str) -> Option<BestMatch> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(arrival, hit)| {
                let m = hit.contact.match_cue(cue)?;
                let key = (m.field.rank(), m.value.to_lowercase(), arrival);
                Some((key, hit, m))
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .and_then(|(_, hit, m)| {
                let text = hit.contact.completion_text(&m)?;
                Some(BestMatch {
                    hit: hit.clone(),
                    cue_match: m,
                    text,
                })
            })
    }

    /// Popup rows ranked against the current cue
    pub fn candidates(&self) -> Vec<Candidate> {
        let cue = self.cue.as_deref().unwrap_or_default();
        let mut rows: Vec<(Candidate, String, usize)> = Vec::new();

        for (arrival, hit) in self.results.iter().enumerate() {
            let contact = &hit.contact;
            let cue_match = contact.match_cue(cue);
            let indices: Vec<usize> = if contact.is_list {
                vec![0]
            } else {
                (0..contact.emails.len()).collect()
            };

            for email_index in indices {
                let rank = match &cue_match {
                    Some(m) if m.field != crate::contact::ContactField::Email => m.field.rank(),
                    Some(m) if m.email_index == email_index => m.field.rank(),
                    _ => 4,
                };
                let text = contact.popup_text(email_index);
                let key = text.to_lowercase();
                rows.push((
                    Candidate {
                        hit: hit.clone(),
                        email_index,
                        text,
                        rank,
                    },
                    key,
                    arrival,
                ));
            }
        }

        rows.sort_by(|a, b| {
            (a.0.rank, &a.1, a.2, a.0.email_index).cmp(&(b.0.rank, &b.1, b.2, b.0.email_index))
        });
        rows.into_iter().map(|(c, _, _)| c).collect()
    }
}
