//! Text editing and focus message handlers

use crate::entry::DestinationEntry;
use crate::messages::EditMsg;

pub fn update_edit(entry: &mut DestinationEntry, msg: EditMsg) {
    match msg {
        EditMsg::InsertChar(',') if entry.selection_bounds().is_some() => {
            entry.commit_selection();
            entry.insert_text(",");
        }
        EditMsg::InsertChar(c) => entry.insert_text(c.encode_utf8(&mut [0; 4])),
        EditMsg::InsertText(text) => entry.insert_text(&text),

        EditMsg::DeleteBackward => entry.delete_backward(),
        EditMsg::DeleteForward => entry.delete_forward(),
        EditMsg::DeleteRange { start, end } => entry.delete_range(start, end),

        EditMsg::SetCursor(pos) => entry.set_cursor(pos),
        EditMsg::Select { anchor, head } => entry.select(anchor, head),
        EditMsg::SelectAll => entry.select_all(),

        EditMsg::FocusIn => entry.focus_in(),
        EditMsg::FocusOut => entry.focus_out(),
        EditMsg::Activate => entry.activate(),
        EditMsg::Escape => entry.escape(),
    }
}
