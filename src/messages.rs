//! Message types for the Elm-style architecture
//!
//! All state changes of a [`crate::DestinationEntry`] flow through these
//! message types.

use crate::commands::TimerKind;
use crate::contact::ContactHit;
use crate::destination::DestinationId;

/// Text editing and focus messages from the input layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMsg {
    // === Insertion ===
    /// A typed character, replacing the selection
    InsertChar(char),
    /// Typed or input-method text, replacing the selection
    InsertText(String),

    // === Deletion ===
    /// Backspace: the selection, or the character before the cursor
    DeleteBackward,
    /// Delete: the selection, or the character after the cursor
    DeleteForward,
    /// Delete an explicit character span
    DeleteRange { start: usize, end: usize },

    // === Cursor and selection ===
    /// Set cursor to specific position (from mouse click)
    SetCursor(usize),
    Select { anchor: usize, head: usize },
    SelectAll,

    // === Entry lifecycle ===
    FocusIn,
    FocusOut,
    /// Enter key
    Activate,
    /// Escape key: abort completion, keep the text
    Escape,
}

/// Completion pipeline messages, mostly produced by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionMsg {
    /// A debounce timer started with `Cmd::StartTimer` ran out
    TimerFired { kind: TimerKind, generation: u64 },
    /// One contact delivered by the query started as `generation`
    QueryResult { generation: u64, hit: ContactHit },
    /// The contact source reported an error for `generation`
    QueryFailed { generation: u64, error: String },
    /// The query stream for `generation` ended
    QueryFinished { generation: u64 },
    /// The user picked a popup row
    AcceptCandidate(usize),
    /// A contact re-fetched with `Cmd::ResolveContact`
    ContactResolved {
        destination: DestinationId,
        hit: Option<ContactHit>,
    },
}

/// Context-menu operations on the destination under a text position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupMsg {
    /// Bind the destination to another address of its contact
    SelectEmail { at: usize, email_index: usize },
    /// Enable or disable one member of a list destination
    SetListMemberIgnored {
        at: usize,
        member: usize,
        ignored: bool,
    },
    /// Replace a list destination by its enabled members
    ExpandList { at: usize },
    Remove { at: usize },
    Copy { at: usize },
    Cut { at: usize },
    /// Re-fetch the destination's contact from its book
    RefreshContact { at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardMsg {
    /// Copy the destinations touched by the selection
    Copy,
    /// Copy then remove the destinations touched by the selection
    Cut,
    /// Insert clipboard text at the cursor
    Paste(String),
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Edit(EditMsg),
    Completion(CompletionMsg),
    Popup(PopupMsg),
    Clipboard(ClipboardMsg),
}

impl From<EditMsg> for Msg {
    fn from(msg: EditMsg) -> Self {
        Msg::Edit(msg)
    }
}

impl From<CompletionMsg> for Msg {
    fn from(msg: CompletionMsg) -> Self {
        Msg::Completion(msg)
    }
}

impl From<PopupMsg> for Msg {
    fn from(msg: PopupMsg) -> Self {
        Msg::Popup(msg)
    }
}

impl From<ClipboardMsg> for Msg {
    fn from(msg: ClipboardMsg) -> Self {
        Msg::Clipboard(msg)
    }
}
