//! Contact sources - where completion candidates come from
//!
//! A source answers cue queries with a stream of contacts and re-fetches
//! single contacts by id. Both return owned futures so the runtime can run
//! them on spawned tasks and drop them when cancelled.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use serde::Deserialize;
use thiserror::Error;

use crate::contact::{BookRef, Contact, ContactHit};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("address book {0} is not available")]
    BookUnavailable(BookRef),
    #[error("contact query failed: {0}")]
    Query(String),
}

pub trait ContactSource {
    /// Contacts whose name, nickname, file-as name or address starts with
    /// `cue`, in book order.
    fn query(&self, cue: &str) -> BoxStream<'static, Result<ContactHit, SourceError>>;

    /// Current version of a contact, None when it no longer exists
    fn resolve(
        &self,
        contact_id: &str,
        book: &BookRef,
    ) -> BoxFuture<'static, Result<Option<ContactHit>, SourceError>>;
}

/// Address books held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryContactSource {
    books: Vec<(BookRef, Vec<Arc<Contact>>)>,
}

#[derive(Debug, Deserialize)]
struct BookFile {
    #[serde(default)]
    books: Vec<BookEntry>,
}

#[derive(Debug, Deserialize)]
struct BookEntry {
    name: String,
    #[serde(default)]
    contacts: Vec<Contact>,
}

impl MemoryContactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, name: impl Into<String>, contacts: Vec<Contact>) -> Self {
        self.add_book(name, contacts);
        self
    }

    pub fn add_book(&mut self, name: impl Into<String>, contacts: Vec<Contact>) {
        let book = BookRef(name.into());
        let contacts = contacts.into_iter().map(Arc::new).collect();
        match self.books.iter_mut().find(|(b, _)| *b == book) {
            Some((_, existing)) => *existing = contacts,
            None => self.books.push((book, contacts)),
        }
    }

    /// Parse books from YAML:
    ///
    /// ```yaml
    /// books:
    ///   - name: personal
    ///     contacts:
    ///       - id: c1
    ///         full_name: John Doe
    ///         emails: [john@example.com]
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: BookFile = serde_yaml::from_str(yaml).context("Failed to parse address books")?;
        let mut source = Self::new();
        for book in file.books {
            source.add_book(book.name, book.contacts);
        }
        Ok(source)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read address books at {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn books(&self) -> impl Iterator<Item = &BookRef> {
        self.books.iter().map(|(b, _)| b)
    }

    pub fn contact_count(&self) -> usize {
        self.books.iter().map(|(_, c)| c.len()).sum()
    }
}

impl ContactSource for MemoryContactSource {
    fn query(&self, cue: &str) -> BoxStream<'static, Result<ContactHit, SourceError>> {
        let hits: Vec<Result<ContactHit, SourceError>> = self
            .books
            .iter()
            .flat_map(|(book, contacts)| {
                contacts
                    .iter()
                    .filter(|c| c.match_cue(cue).is_some())
                    .map(move |c| {
                        Ok(ContactHit {
                            contact: Arc::clone(c),
                            book: book.clone(),
                        })
                    })
            })
            .collect();
        tracing::trace!(cue, count = hits.len(), "memory query");
        futures::stream::iter(hits).boxed()
    }

    fn resolve(
        &self,
        contact_id: &str,
        book: &BookRef,
    ) -> BoxFuture<'static, Result<Option<ContactHit>, SourceError>> {
        let result = match self.books.iter().find(|(b, _)| b == book) {
            Some((book, contacts)) => Ok(contacts
                .iter()
                .find(|c| c.id == contact_id)
                .map(|c| ContactHit {
                    contact: Arc::clone(c),
                    book: book.clone(),
                })),
            None => Err(SourceError::BookUnavailable(book.clone())),
        };
        futures::future::ready(result).boxed()
    }
}
