//! Store-driven synchronization and per-destination operations

mod common;

use common::{entry_with_raws, focused_entry, john, joan, raws, team, type_text};
use destination_entry::commands::Cmd;
use destination_entry::messages::{ClipboardMsg, CompletionMsg, EditMsg, Msg, PopupMsg};
use destination_entry::update::update;
use destination_entry::{Destination, DestinationEntry, EntryConfig, SyncDirection};

fn clipboard_of(cmd: Option<Cmd>) -> Option<String> {
    cmd?.flatten().into_iter().find_map(|c| match c {
        Cmd::SetClipboard { text } => Some(text),
        _ => None,
    })
}

// ========================================================================
// Store-driven edits
// ========================================================================

#[test]
fn test_replace_all_rewrites_text() {
    let mut entry = entry_with_raws(&["a@x.com", "b@x.com"]);
    entry.set_destinations(vec![
        Destination::from_contact(&john(), 0),
        Destination::from_contact(&team(), 0),
    ]);
    assert_eq!(entry.text(), "John Doe, Jolly Team");
    assert_eq!(entry.store().len(), 2);
    assert_eq!(entry.sync_direction(), SyncDirection::Idle);
}

#[test]
fn test_store_insert_and_remove_follow_in_text() {
    let mut entry = entry_with_raws(&["a@x.com", "c@x.com"]);
    entry.edit_store(|s| s.insert(1, Destination::from_raw("b@x.com")));
    assert_eq!(entry.text(), "a@x.com, b@x.com, c@x.com");

    entry.edit_store(|s| s.remove_at(2));
    assert_eq!(entry.text(), "a@x.com, b@x.com");
    assert_eq!(raws(&entry), vec!["a@x.com", "b@x.com"]);
}

#[test]
fn test_store_edit_while_focused_keeps_placeholder() {
    let mut entry = focused_entry(EntryConfig::default());
    type_text(&mut entry, "a@x.com,");
    assert_eq!(entry.text(), "a@x.com, ");

    entry.edit_store(|s| s.insert(1, Destination::from_contact(&john(), 0)));
    assert_eq!(entry.text(), "a@x.com, John Doe, ");
    assert_eq!(entry.store().len(), 3);
}

#[test]
fn test_store_edit_drops_candidates() {
    let mut entry = focused_entry(EntryConfig::default());
    common::type_and_query(&mut entry, "joh", &[john()]);
    assert_eq!(entry.candidates().len(), 1);

    entry.edit_store(|s| s.append(Destination::from_raw("z@x.com")));
    assert!(entry.candidates().is_empty());
    assert!(entry
        .take_commands()
        .flatten()
        .contains(&Cmd::CancelQueries));
}

#[test]
fn test_resolved_contact_updates_text() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![Destination::from_contact(&john(), 0)],
    );
    let id = entry.store().get(0).unwrap().id().unwrap();

    let mut renamed = (*john().contact).clone();
    renamed.full_name = Some("Johnny Doe".to_string());
    let hit = destination_entry::ContactHit::new(renamed, "personal");

    update(
        &mut entry,
        Msg::Completion(CompletionMsg::ContactResolved {
            destination: id,
            hit: Some(hit),
        }),
    );
    assert_eq!(entry.text(), "Johnny Doe");
}

// ========================================================================
// Context menu
// ========================================================================

#[test]
fn test_select_other_email() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![
            Destination::from_raw("a@x.com"),
            Destination::from_contact(&joan(), 0),
        ],
    );
    assert_eq!(entry.text(), "a@x.com, Joan Smith <joan@home.com>");

    update(
        &mut entry,
        Msg::Popup(PopupMsg::SelectEmail {
            at: 12,
            email_index: 1,
        }),
    );
    assert_eq!(entry.text(), "a@x.com, Joan Smith <joan@work.com>");
    assert_eq!(
        entry.summaries()[1].email.as_deref(),
        Some("joan@work.com")
    );
}

#[test]
fn test_list_members_and_expansion() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![Destination::from_contact(&team(), 0)],
    );
    update(
        &mut entry,
        Msg::Popup(PopupMsg::SetListMemberIgnored {
            at: 0,
            member: 0,
            ignored: true,
        }),
    );
    let summary = &entry.summaries()[0];
    assert!(summary.is_list);
    assert_eq!(summary.members.as_ref().map(Vec::len), Some(1));

    update(&mut entry, Msg::Popup(PopupMsg::ExpandList { at: 0 }));
    assert_eq!(entry.text(), "Bob <bob@x.com>");
    assert!(!entry.store().get(0).unwrap().is_list());
}

#[test]
fn test_copy_and_cut_destination() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![
            Destination::from_contact(&john(), 0),
            Destination::from_raw("b@x.com"),
        ],
    );

    let copied = clipboard_of(update(&mut entry, Msg::Popup(PopupMsg::Copy { at: 1 })));
    assert_eq!(copied.as_deref(), Some("John Doe <john@x.com>"));
    assert_eq!(entry.store().len(), 2);

    let cut = clipboard_of(update(&mut entry, Msg::Popup(PopupMsg::Cut { at: 12 })));
    assert_eq!(cut.as_deref(), Some("b@x.com"));
    assert_eq!(entry.text(), "John Doe");
}

#[test]
fn test_copy_list_uses_its_name() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![Destination::from_contact(&team(), 0)],
    );
    let copied = clipboard_of(update(&mut entry, Msg::Popup(PopupMsg::Copy { at: 0 })));
    assert_eq!(copied.as_deref(), Some("Jolly Team"));
}

#[test]
fn test_remove_destination_under_position() {
    let mut entry = entry_with_raws(&["a@x.com", "b@x.com", "c@x.com"]);
    update(&mut entry, Msg::Popup(PopupMsg::Remove { at: 12 }));
    assert_eq!(entry.text(), "a@x.com, c@x.com");
    assert_eq!(raws(&entry), vec!["a@x.com", "c@x.com"]);
}

#[test]
fn test_refresh_contact_command() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![Destination::from_contact(&john(), 0)],
    );
    let cmds = update(&mut entry, Msg::Popup(PopupMsg::RefreshContact { at: 0 }))
        .map(Cmd::flatten)
        .unwrap_or_default();
    assert!(matches!(
        cmds.as_slice(),
        [Cmd::ResolveContact { contact_id, book, .. }] if contact_id == "c-john" && book.0 == "personal"
    ));
}

// ========================================================================
// Clipboard
// ========================================================================

#[test]
fn test_copy_selection_then_paste_elsewhere() {
    let mut entry = DestinationEntry::with_destinations(
        EntryConfig::default(),
        vec![
            Destination::from_contact(&john(), 0),
            Destination::from_raw("b@x.com"),
        ],
    );
    update(&mut entry, Msg::Edit(EditMsg::SelectAll));
    let copied = clipboard_of(update(&mut entry, Msg::Clipboard(ClipboardMsg::Copy)))
        .expect("clipboard set");
    assert_eq!(copied, "John Doe <john@x.com>, b@x.com");

    let mut other = focused_entry(EntryConfig::default());
    update(&mut other, Msg::Clipboard(ClipboardMsg::Paste(copied)));
    assert_eq!(other.text(), "John Doe <john@x.com>, b@x.com");
    assert_eq!(raws(&other), vec!["John Doe <john@x.com>", "b@x.com"]);
}

#[test]
fn test_cut_selection() {
    let mut entry = entry_with_raws(&["a@x.com", "b@x.com", "c@x.com"]);
    update(&mut entry, Msg::Edit(EditMsg::Select { anchor: 10, head: 12 }));
    let cut = clipboard_of(update(&mut entry, Msg::Clipboard(ClipboardMsg::Cut)));
    assert_eq!(cut.as_deref(), Some("b@x.com"));
    assert_eq!(entry.text(), "a@x.com, c@x.com");
}

// ========================================================================
// Text round trip
// ========================================================================

fn mixed_destinations() -> Vec<Destination> {
    let quoted = destination_entry::ContactHit::new(
        destination_entry::Contact::new("c-jim")
            .with_full_name("Jim \"JJ")
            .with_email("jim@x.com"),
        "personal",
    );
    vec![
        Destination::from_raw("a@x.com"),
        Destination::from_contact(&john(), 0),
        Destination::from_raw("\"Doe, Jane\" <jane@x.com>"),
        Destination::from_contact(&team(), 0),
        Destination::from_contact(&joan(), 1),
        Destination::from_contact(&quoted, 0),
        Destination::from_raw("Bob <bob@x.com>"),
    ]
}

fn assert_one_range_per_destination(entry: &DestinationEntry) {
    let text = entry.text();
    let ranges = destination_entry::tokenizer::ranges(&text);
    assert_eq!(ranges.len(), entry.store().len(), "ranges of {:?}", text);
    for (range, dest) in ranges.into_iter().zip(entry.store().iter()) {
        assert_eq!(
            destination_entry::tokenizer::slice(&text, range),
            entry.textrep_for(dest)
        );
    }
}

#[test]
fn test_every_destination_owns_one_range() {
    for config in [
        EntryConfig::default(),
        EntryConfig::default().with_show_address(true),
    ] {
        let entry = DestinationEntry::with_destinations(config.clone(), mixed_destinations());
        assert_eq!(entry.store().len(), 7);
        assert_one_range_per_destination(&entry);

        let mut entry = DestinationEntry::new(config);
        for dest in mixed_destinations() {
            entry.edit_store(|s| s.append(dest));
            assert_one_range_per_destination(&entry);
        }
        entry.edit_store(|s| s.remove_at(2));
        assert_eq!(entry.store().len(), 6);
        assert_one_range_per_destination(&entry);
    }
}
