//! Destination entry - a comma-separated recipient line for a mail composer
//!
//! The text the user edits and an ordered store of destinations are kept in
//! step in both directions, with debounced contact completion on top. The
//! crate follows the Elm Architecture: messages go through [`update`],
//! which mutates a [`DestinationEntry`] and returns [`Cmd`]s for the
//! [`runtime`] to execute.

pub mod address;
pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod config_paths;
pub mod contact;
pub mod destination;
pub mod editable;
pub mod entry;
pub mod messages;
pub mod runtime;
pub mod source;
pub mod store;
pub mod tokenizer;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::{Cmd, TimerKind};
pub use completion::{Candidate, CompletionEngine, CompletionState};
pub use config::EntryConfig;
pub use contact::{BookRef, Contact, ContactHit};
pub use destination::{Destination, DestinationId, DestinationSummary};
pub use entry::{DestinationEntry, SyncDirection};
pub use messages::Msg;
pub use runtime::EntryDriver;
pub use source::{ContactSource, MemoryContactSource, SourceError};
pub use store::DestinationStore;
pub use update::update;
