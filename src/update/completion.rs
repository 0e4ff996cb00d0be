//! Completion pipeline message handlers
//!
//! Timer firings and query results carry the generation they were started
//! with; anything older than the engine's current generation is dropped
//! inside the entry.

use crate::entry::DestinationEntry;
use crate::messages::CompletionMsg;

pub fn update_completion(entry: &mut DestinationEntry, msg: CompletionMsg) {
    match msg {
        CompletionMsg::TimerFired { kind, generation } => entry.on_timer(kind, generation),
        CompletionMsg::QueryResult { generation, hit } => entry.on_query_result(generation, hit),
        CompletionMsg::QueryFailed { generation, error } => {
            entry.on_query_failed(generation, &error)
        }
        CompletionMsg::QueryFinished { generation } => entry.on_query_finished(generation),
        CompletionMsg::AcceptCandidate(row) => entry.accept_candidate(row),
        CompletionMsg::ContactResolved { destination, hit } => {
            entry.on_contact_resolved(destination, hit)
        }
    }
}
