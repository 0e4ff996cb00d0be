//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use destination_entry::commands::{Cmd, TimerKind};
use destination_entry::contact::{Contact, ContactHit};
use destination_entry::messages::{CompletionMsg, EditMsg, Msg};
use destination_entry::source::MemoryContactSource;
use destination_entry::update::update;
use destination_entry::{Destination, DestinationEntry, EntryConfig};

/// Focused, empty entry
pub fn focused_entry(config: EntryConfig) -> DestinationEntry {
    let mut entry = DestinationEntry::new(config);
    update(&mut entry, Msg::Edit(EditMsg::FocusIn));
    entry
}

/// Unfocused entry showing raw destinations
pub fn entry_with_raws(raws: &[&str]) -> DestinationEntry {
    DestinationEntry::with_destinations(
        EntryConfig::default(),
        raws.iter().map(|r| Destination::from_raw(*r)).collect(),
    )
}

/// Type text one character at a time, collecting the commands produced
pub fn type_text(entry: &mut DestinationEntry, text: &str) -> Vec<Cmd> {
    text.chars()
        .filter_map(|c| update(entry, Msg::Edit(EditMsg::InsertChar(c))))
        .flat_map(Cmd::flatten)
        .collect()
}

pub fn backspace(entry: &mut DestinationEntry, times: usize) -> Vec<Cmd> {
    (0..times)
        .filter_map(|_| update(entry, Msg::Edit(EditMsg::DeleteBackward)))
        .flat_map(Cmd::flatten)
        .collect()
}

/// Generation of the most recent arming of `kind`
pub fn last_timer(cmds: &[Cmd], kind: TimerKind) -> Option<u64> {
    cmds.iter()
        .filter_map(|c| match c {
            Cmd::StartTimer {
                kind: k,
                generation,
                ..
            } if *k == kind => Some(*generation),
            _ => None,
        })
        .last()
}

pub fn query_of(cmds: &[Cmd]) -> Option<(u64, String)> {
    cmds.iter().find_map(|c| match c {
        Cmd::QueryContacts { generation, cue } => Some((*generation, cue.clone())),
        _ => None,
    })
}

pub fn fire(entry: &mut DestinationEntry, kind: TimerKind, generation: u64) -> Vec<Cmd> {
    update(
        entry,
        Msg::Completion(CompletionMsg::TimerFired { kind, generation }),
    )
    .map(Cmd::flatten)
    .unwrap_or_default()
}

pub fn deliver(entry: &mut DestinationEntry, generation: u64, hits: &[ContactHit]) -> Vec<Cmd> {
    hits.iter()
        .filter_map(|hit| {
            update(
                entry,
                Msg::Completion(CompletionMsg::QueryResult {
                    generation,
                    hit: hit.clone(),
                }),
            )
        })
        .flat_map(Cmd::flatten)
        .collect()
}

/// Type `cue`, fire the popup timer and deliver `hits` to the query it
/// starts. Returns the type-ahead timer generation armed by typing.
pub fn type_and_query(entry: &mut DestinationEntry, cue: &str, hits: &[ContactHit]) -> u64 {
    let cmds = type_text(entry, cue);
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).expect("popup timer armed");
    let type_ahead = last_timer(&cmds, TimerKind::TypeAhead).expect("type-ahead armed");
    let cmds = fire(entry, TimerKind::UpdateCompletions, popup);
    let (generation, _) = query_of(&cmds).expect("query started");
    deliver(entry, generation, hits);
    type_ahead
}

pub fn raws(entry: &DestinationEntry) -> Vec<String> {
    entry
        .store()
        .iter()
        .map(|d| d.raw().unwrap_or_default().to_string())
        .collect()
}

pub fn john() -> ContactHit {
    ContactHit::new(
        Contact::new("c-john")
            .with_full_name("John Doe")
            .with_email("john@x.com"),
        "personal",
    )
}

pub fn joan() -> ContactHit {
    ContactHit::new(
        Contact::new("c-joan")
            .with_full_name("Joan Smith")
            .with_nickname("jo")
            .with_email("joan@home.com")
            .with_email("joan@work.com"),
        "personal",
    )
}

pub fn team() -> ContactHit {
    ContactHit::new(
        Contact::new("l-team")
            .with_full_name("Jolly Team")
            .with_member(Some("Ann"), "ann@x.com")
            .with_member(Some("Bob"), "bob@x.com"),
        "work",
    )
}

pub fn address_books() -> MemoryContactSource {
    MemoryContactSource::new()
        .with_book(
            "personal",
            vec![
                (*john().contact).clone(),
                (*joan().contact).clone(),
            ],
        )
        .with_book("work", vec![(*team().contact).clone()])
}
