//! Update functions for the Elm-style architecture
//!
//! All state transformations of a [`DestinationEntry`] flow through these
//! functions. Each returns the commands the runtime has to execute.

mod completion;
mod edit;
mod popup;

use crate::commands::Cmd;
use crate::entry::DestinationEntry;
use crate::messages::Msg;

#[cfg(debug_assertions)]
use tracing::{debug, span, warn, Level};

pub use completion::update_completion;
pub use edit::update_edit;
pub use popup::{update_clipboard, update_popup};

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
#[inline]
pub fn update(entry: &mut DestinationEntry, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(entry, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(entry, msg)
    }
}

fn update_inner(entry: &mut DestinationEntry, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Edit(m) => update_edit(entry, m),
        Msg::Completion(m) => update_completion(entry, m),
        Msg::Popup(m) => update_popup(entry, m),
        Msg::Clipboard(m) => update_clipboard(entry, m),
    }
    entry.take_commands().into_option()
}

/// Traced update wrapper (debug builds only)
///
/// Logs each message and the text it produced, and flags text and store
/// falling out of step.
#[cfg(debug_assertions)]
fn update_traced(entry: &mut DestinationEntry, msg: Msg) -> Option<Cmd> {
    use crate::messages::CompletionMsg;

    // Result streams can be long
    let is_noisy = matches!(&msg, Msg::Completion(CompletionMsg::QueryResult { .. }));

    let msg_name = format!("{:?}", msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let before = entry.text().to_string();
    let result = update_inner(entry, msg);

    if entry.text() != before {
        debug!(target: "entry", text = %entry.text(), cursor = entry.cursor(), "text changed");
    }
    if !entry.is_consistent() {
        warn!(
            "After {}: text {:?} has {} ranges for {} destinations",
            msg_name,
            entry.text(),
            crate::tokenizer::range_count(entry.text()),
            entry.store().len()
        );
    }

    result
}
