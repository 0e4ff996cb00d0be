//! Single-line editable text used by the destination entry.
//!
//! - [`TextBuffer`] / [`TextBufferMut`]: Traits abstracting over buffer implementations
//! - [`StringBuffer`]: Buffer backed by `String`, addressed in characters
//! - [`Selection`]: Anchor/head pair over character offsets
//! - [`EditableState`]: Buffer plus cursor and selection

mod buffer;
mod selection;
mod state;

pub use buffer::{StringBuffer, TextBuffer, TextBufferMut};
pub use selection::Selection;
pub use state::EditableState;
