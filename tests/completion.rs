//! Completion pipeline driven through messages: debounce timers, query
//! generations, type-ahead and popup acceptance

mod common;

use common::{
    backspace, deliver, fire, focused_entry, joan, john, last_timer, query_of, team, type_and_query,
    type_text,
};
use destination_entry::commands::{Cmd, TimerKind};
use destination_entry::contact::ContactHit;
use destination_entry::messages::{CompletionMsg, EditMsg, Msg};
use destination_entry::update::update;
use destination_entry::{CompletionState, EntryConfig};

fn short_cues() -> EntryConfig {
    EntryConfig::default()
        .with_minimum_query_length(2)
        .with_show_address(true)
}

// ========================================================================
// Type-ahead
// ========================================================================

#[test]
fn test_type_ahead_then_comma_commits_contact() {
    let mut entry = focused_entry(short_cues());
    let type_ahead = type_and_query(&mut entry, "jo", &[john()]);

    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    assert_eq!(entry.text(), "john Doe <john@x.com>");
    assert_eq!(entry.selection_bounds(), Some((2, 21)));
    assert_eq!(entry.completion().state(), CompletionState::TypeAheadApplied);

    type_text(&mut entry, ",");
    assert_eq!(entry.text(), "John Doe <john@x.com>, ");
    assert_eq!(entry.cursor(), 23);
    assert_eq!(entry.store().len(), 2);
    assert!(entry.store().get(0).unwrap().is_resolved());
    assert!(entry.store().get(1).unwrap().is_empty());

    let summaries = entry.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].email.as_deref(), Some("john@x.com"));
}

#[test]
fn test_type_ahead_on_resolved_range_is_idempotent() {
    let mut entry = focused_entry(short_cues());
    let cmds = type_text(&mut entry, "Jo");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let type_ahead = last_timer(&cmds, TimerKind::TypeAhead).unwrap();
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    let (generation, _) = query_of(&cmds).unwrap();
    deliver(&mut entry, generation, &[john()]);

    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    assert_eq!(entry.text(), "John Doe <john@x.com>");
    let bound = entry.store().get(0).unwrap().contact_ref();
    assert!(bound.is_some());

    // a late result re-arms type-ahead over the already bound range
    let cmds = deliver(&mut entry, generation, &[joan()]);
    let again = last_timer(&cmds, TimerKind::TypeAhead).expect("type-ahead re-armed");
    fire(&mut entry, TimerKind::TypeAhead, again);

    assert_eq!(entry.text(), "John Doe <john@x.com>");
    assert_eq!(entry.selection_bounds(), Some((2, 21)));
    assert_eq!(entry.store().len(), 1);
    assert_eq!(entry.store().get(0).unwrap().contact_ref(), bound);
}

#[test]
fn test_enter_commits_type_ahead() {
    let mut entry = focused_entry(EntryConfig::default());
    let type_ahead = type_and_query(&mut entry, "joh", &[john()]);
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);

    let cmds = update(&mut entry, Msg::Edit(EditMsg::Activate))
        .map(Cmd::flatten)
        .unwrap_or_default();
    assert_eq!(entry.text(), "John Doe, ");
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::NotifyUpdated { destination: Some(_) })));
    assert!(!entry.completion().is_completing());
}

#[test]
fn test_typing_over_completion_replaces_it() {
    let mut entry = focused_entry(short_cues());
    let type_ahead = type_and_query(&mut entry, "jo", &[john()]);
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);

    type_text(&mut entry, "a");
    assert_eq!(entry.text(), "joa");
    assert_eq!(entry.selection_bounds(), None);
    assert!(!entry.store().get(0).unwrap().is_resolved());
}

#[test]
fn test_best_match_prefers_name_order() {
    let mut entry = focused_entry(short_cues());
    let type_ahead = type_and_query(&mut entry, "jo", &[john(), joan()]);
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    assert_eq!(entry.text(), "joan Smith <joan@home.com>");
}

#[test]
fn test_list_completes_to_its_name() {
    let mut entry = focused_entry(EntryConfig::default());
    let type_ahead = type_and_query(&mut entry, "jol", &[team()]);
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    assert_eq!(entry.text(), "jolly Team");
    assert!(entry.store().get(0).unwrap().is_list());
}

#[test]
fn test_type_ahead_before_results_does_nothing() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "joh");
    let type_ahead = last_timer(&cmds, TimerKind::TypeAhead).unwrap();
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    assert_eq!(entry.text(), "joh");
    assert_eq!(entry.selection_bounds(), None);
}

#[test]
fn test_results_rearm_type_ahead_once_fired() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "joh");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let type_ahead = last_timer(&cmds, TimerKind::TypeAhead).unwrap();

    fire(&mut entry, TimerKind::TypeAhead, type_ahead);
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    let (generation, _) = query_of(&cmds).unwrap();

    let cmds = deliver(&mut entry, generation, &[john()]);
    assert_eq!(
        cmds,
        vec![Cmd::StartTimer {
            kind: TimerKind::TypeAhead,
            generation: type_ahead + 1,
            delay_ms: 50,
        }]
    );

    fire(&mut entry, TimerKind::TypeAhead, type_ahead + 1);
    assert_eq!(entry.text(), "john Doe <john@x.com>");
}

#[test]
fn test_results_after_backspace_do_not_type_ahead() {
    let mut entry = focused_entry(short_cues());
    type_text(&mut entry, "joh");
    let cmds = backspace(&mut entry, 1);
    assert!(cmds.contains(&Cmd::CancelTimer {
        kind: TimerKind::TypeAhead
    }));

    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    let (generation, cue) = query_of(&cmds).unwrap();
    assert_eq!(cue, "jo");

    let cmds = deliver(&mut entry, generation, &[john()]);
    assert!(cmds.is_empty());
    assert_eq!(entry.completion().results().len(), 1);
    assert_eq!(entry.text(), "jo");
}

// ========================================================================
// Queries
// ========================================================================

#[test]
fn test_query_only_at_end_of_range() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "john");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();

    update(&mut entry, Msg::Edit(EditMsg::SetCursor(2)));
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    assert_eq!(query_of(&cmds), None);
    assert_eq!(entry.completion().cue(), None);
}

#[test]
fn test_new_query_supersedes_old_one() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "joh");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    let (first, _) = query_of(&cmds).unwrap();

    let cmds = type_text(&mut entry, "n");
    // the popup timer armed by "joh" is stale now
    assert!(fire(&mut entry, TimerKind::UpdateCompletions, popup).is_empty());

    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    assert!(cmds.contains(&Cmd::CancelQueries));
    let (second, cue) = query_of(&cmds).unwrap();
    assert_eq!(cue, "john");
    assert!(second > first);

    deliver(&mut entry, first, &[joan()]);
    assert!(entry.completion().results().is_empty());
    deliver(&mut entry, second, &[john()]);
    assert_eq!(entry.completion().results().len(), 1);
}

#[test]
fn test_same_contact_from_two_books_shown_once() {
    let mut entry = focused_entry(EntryConfig::default());
    let copy = ContactHit::new((*john().contact).clone(), "work");
    type_and_query(&mut entry, "joh", &[john(), copy]);

    assert_eq!(entry.completion().results().len(), 1);
    assert_eq!(entry.completion().results()[0].book.0, "personal");
}

#[test]
fn test_failed_query_leaves_entry_usable() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "joh");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    let cmds = fire(&mut entry, TimerKind::UpdateCompletions, popup);
    let (generation, _) = query_of(&cmds).unwrap();

    update(
        &mut entry,
        Msg::Completion(CompletionMsg::QueryFailed {
            generation,
            error: "book offline".to_string(),
        }),
    );
    update(
        &mut entry,
        Msg::Completion(CompletionMsg::QueryFinished { generation }),
    );
    assert_eq!(entry.completion().state(), CompletionState::Idle);
    assert!(entry.candidates().is_empty());
    assert_eq!(entry.text(), "joh");
}

#[test]
fn test_unfocused_timers_are_ignored() {
    let mut entry = focused_entry(EntryConfig::default());
    let cmds = type_text(&mut entry, "joh");
    let popup = last_timer(&cmds, TimerKind::UpdateCompletions).unwrap();
    update(&mut entry, Msg::Edit(EditMsg::FocusOut));
    assert!(fire(&mut entry, TimerKind::UpdateCompletions, popup).is_empty());
}

// ========================================================================
// Popup
// ========================================================================

#[test]
fn test_popup_lists_every_address() {
    let mut entry = focused_entry(EntryConfig::default());
    type_and_query(&mut entry, "joa", &[joan()]);

    let rows: Vec<(String, usize)> = entry
        .candidates()
        .into_iter()
        .map(|c| (c.hit.contact.id.clone(), c.email_index))
        .collect();
    assert_eq!(
        rows,
        vec![("c-joan".to_string(), 0), ("c-joan".to_string(), 1)]
    );
}

#[test]
fn test_accept_second_address() {
    let mut entry = focused_entry(EntryConfig::default());
    type_and_query(&mut entry, "joa", &[joan()]);

    update(&mut entry, Msg::Completion(CompletionMsg::AcceptCandidate(1)));
    assert_eq!(entry.text(), "Joan Smith <joan@work.com>, ");
    assert_eq!(entry.cursor(), 28);
    assert_eq!(
        entry.store().get(0).unwrap().email().as_deref(),
        Some("joan@work.com")
    );
    assert!(entry.candidates().is_empty());
}

#[test]
fn test_accept_missing_row_is_ignored() {
    let mut entry = focused_entry(EntryConfig::default());
    type_and_query(&mut entry, "joh", &[john()]);
    update(&mut entry, Msg::Completion(CompletionMsg::AcceptCandidate(5)));
    assert_eq!(entry.text(), "joh");
}

#[test]
fn test_escape_drops_candidates_keeps_text() {
    let mut entry = focused_entry(EntryConfig::default());
    let type_ahead = type_and_query(&mut entry, "joh", &[john()]);
    fire(&mut entry, TimerKind::TypeAhead, type_ahead);

    update(&mut entry, Msg::Edit(EditMsg::Escape));
    assert_eq!(entry.text(), "john Doe <john@x.com>");
    assert!(entry.candidates().is_empty());
    assert!(!entry.completion().is_completing());
}
