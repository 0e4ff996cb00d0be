//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.
//! The entry itself never sleeps, spawns or talks to a contact source; the
//! runtime executes these and feeds the outcome back as messages.

use crate::contact::BookRef;
use crate::destination::DestinationId;

/// The two debounce timers of the completion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Refresh the popup candidate list for the range under the cursor
    UpdateCompletions,
    /// Rewrite the range under the cursor to the best match
    TypeAhead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Start (or restart) a debounce timer
    /// After delay_ms, sends CompletionMsg::TimerFired with the same generation
    StartTimer {
        kind: TimerKind,
        generation: u64,
        delay_ms: u64,
    },
    /// Drop a pending timer
    CancelTimer { kind: TimerKind },
    /// Query the contact source; results come back tagged with `generation`
    QueryContacts { generation: u64, cue: String },
    /// Cancel every outstanding contact query
    CancelQueries,
    /// Fetch a fresh copy of a contact
    /// Sends CompletionMsg::ContactResolved when done
    ResolveContact {
        destination: DestinationId,
        contact_id: String,
        book: BookRef,
    },
    /// Put text on the clipboard
    SetClipboard { text: String },
    /// A destination was committed (Enter, popup acceptance)
    NotifyUpdated { destination: Option<DestinationId> },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Combine commands, dropping `None`s and unwrapping a single survivor
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Cmd::None))
            .collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    /// `Some(self)` unless this is `Cmd::None`
    pub fn into_option(self) -> Option<Cmd> {
        match self {
            Cmd::None => None,
            cmd => Some(cmd),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Flatten nested batches into a list of leaf commands
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            cmd => vec![cmd],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_drops_none() {
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::None]), Cmd::None);
        assert_eq!(
            Cmd::batch(vec![Cmd::None, Cmd::CancelQueries]),
            Cmd::CancelQueries
        );
    }

    #[test]
    fn test_flatten_nested_batches() {
        let cmd = Cmd::Batch(vec![
            Cmd::CancelQueries,
            Cmd::Batch(vec![Cmd::None, Cmd::CancelTimer { kind: TimerKind::TypeAhead }]),
        ]);
        assert_eq!(
            cmd.flatten(),
            vec![
                Cmd::CancelQueries,
                Cmd::CancelTimer { kind: TimerKind::TypeAhead }
            ]
        );
    }
}
