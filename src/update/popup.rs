//! Context menu and clipboard message handlers

use crate::entry::DestinationEntry;
use crate::messages::{ClipboardMsg, PopupMsg};

pub fn update_popup(entry: &mut DestinationEntry, msg: PopupMsg) {
    match msg {
        PopupMsg::SelectEmail { at, email_index } => entry.select_email(at, email_index),
        PopupMsg::SetListMemberIgnored {
            at,
            member,
            ignored,
        } => entry.set_list_member_ignored(at, member, ignored),
        PopupMsg::ExpandList { at } => entry.expand_list(at),
        PopupMsg::Remove { at } => entry.remove_destination(at),
        PopupMsg::Copy { at } => entry.copy_destination(at),
        PopupMsg::Cut { at } => entry.cut_destination(at),
        PopupMsg::RefreshContact { at } => entry.refresh_contact(at),
    }
}

pub fn update_clipboard(entry: &mut DestinationEntry, msg: ClipboardMsg) {
    match msg {
        ClipboardMsg::Copy => entry.copy_selection(),
        ClipboardMsg::Cut => entry.cut_selection(),
        ClipboardMsg::Paste(text) => entry.paste(&text),
    }
}
