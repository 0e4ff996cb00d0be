//! Destination - one addressee in the entry
//!
//! A destination is either raw text the user typed, or bound to a contact
//! and one of its addresses. Binding a contact clears the raw text and
//! setting different raw text clears the contact.

use std::sync::Arc;

use crate::address::{format_address, strip_quotes, Mailbox};
use crate::contact::{BookRef, Contact, ContactHit};

/// Identity of a destination inside a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(pub u64);

/// Reference to the contact a destination is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactRef {
    pub contact_id: String,
    pub email_index: usize,
    pub source_id: BookRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    contact: Arc<Contact>,
    book: BookRef,
    email_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    id: Option<DestinationId>,
    raw: Option<String>,
    binding: Option<Binding>,
    members: Vec<Destination>,
    ignored: bool,
}

impl Destination {
    /// Empty destination, the placeholder for the next address
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(text: impl Into<String>) -> Self {
        let mut dest = Self::new();
        dest.set_raw(text);
        dest
    }

    pub fn from_contact(hit: &ContactHit, email_index: usize) -> Self {
        let mut dest = Self::new();
        dest.set_contact(hit, email_index);
        dest
    }

    /// Store-assigned identity, None until inserted
    pub fn id(&self) -> Option<DestinationId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DestinationId) {
        self.id = Some(id);
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Set the literal text. Returns whether anything changed.
    pub fn set_raw(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.raw.as_deref() == Some(text.as_str()) && self.binding.is_none() {
            return false;
        }
        self.binding = None;
        self.members.clear();
        self.raw = Some(text);
        true
    }

    /// Bind to a contact address. Lists get one member destination per
    /// list member, all enabled.
    pub fn set_contact(&mut self, hit: &ContactHit, email_index: usize) {
        self.raw = None;
        self.members = if hit.contact.is_list {
            hit.contact
                .members
                .iter()
                .map(|m| Destination::from_raw(format_address(m.name.as_deref(), &m.email)))
                .collect()
        } else {
            Vec::new()
        };
        self.binding = Some(Binding {
            contact: Arc::clone(&hit.contact),
            book: hit.book.clone(),
            email_index,
        });
    }

    pub fn contact(&self) -> Option<&Arc<Contact>> {
        self.binding.as_ref().map(|b| &b.contact)
    }

    pub fn contact_ref(&self) -> Option<ContactRef> {
        self.binding.as_ref().map(|b| ContactRef {
            contact_id: b.contact.id.clone(),
            email_index: b.email_index,
            source_id: b.book.clone(),
        })
    }

    pub fn hit(&self) -> Option<ContactHit> {
        self.binding.as_ref().map(|b| ContactHit {
            contact: Arc::clone(&b.contact),
            book: b.book.clone(),
        })
    }

    pub fn email_index(&self) -> usize {
        self.binding.as_ref().map_or(0, |b| b.email_index)
    }

    pub fn is_resolved(&self) -> bool {
        self.binding.is_some()
    }

    pub fn is_list(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| b.contact.is_list)
    }

    pub fn members(&self) -> &[Destination] {
        &self.members
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Enable or disable a list member without removing it
    pub fn set_member_ignored(&mut self, member: usize, ignored: bool) -> bool {
        match self.members.get_mut(member) {
            Some(m) if m.ignored != ignored => {
                m.ignored = ignored;
                true
            }
            _ => false,
        }
    }

    fn parsed_raw(&self) -> Option<Mailbox> {
        self.raw.as_deref().and_then(Mailbox::parse)
    }

    pub fn name(&self) -> Option<String> {
        match &self.binding {
            Some(b) => b.contact.display_name(),
            None => self.parsed_raw().and_then(|m| m.name),
        }
    }

    pub fn email(&self) -> Option<String> {
        match &self.binding {
            Some(b) if b.contact.is_list => None,
            Some(b) => b.contact.email(b.email_index).map(str::to_string),
            None => self.parsed_raw().map(|m| m.email),
        }
    }

    /// Full address, or None for an empty destination. Lists expand to
    /// their enabled members.
    pub fn address(&self) -> Option<String> {
        if self.is_list() {
            let members: Vec<String> = self
                .members
                .iter()
                .filter(|m| !m.ignored)
                .filter_map(Destination::address)
                .collect();
            return (!members.is_empty()).then(|| members.join(", "));
        }

        match &self.binding {
            Some(_) => self
                .email()
                .map(|email| format_address(self.name().as_deref(), &email)),
            None => self.parsed_raw().map(|m| m.format()),
        }
    }

    /// Textual representation: the raw text when unresolved, otherwise the
    /// contact's name, with the address appended when `include_email` is set.
    pub fn textrep(&self, include_email: bool) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let name = self.name();
        let email = self.email();

        if self.binding.is_some() {
            if let Some(name) = &name {
                if !include_email || email.is_none() {
                    return strip_quotes(name);
                }
            }
        }

        match (name, email) {
            (Some(name), Some(email)) => format_address(Some(&name), &email),
            (None, Some(email)) => email,
            _ => String::new(),
        }
    }

    /// No contact and no non-blank raw text
    pub fn is_empty(&self) -> bool {
        self.binding.is_none() && self.raw.as_deref().map_or(true, |r| r.trim().is_empty())
    }

    pub fn summary(&self) -> DestinationSummary {
        DestinationSummary {
            display_text: self.textrep(true),
            email: self.email(),
            is_list: self.is_list(),
            members: self.is_list().then(|| {
                self.members
                    .iter()
                    .filter(|m| !m.ignored)
                    .map(Destination::summary)
                    .collect()
            }),
        }
    }
}

/// What the composer reads out of the entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSummary {
    pub display_text: String,
    pub email: Option<String>,
    pub is_list: bool,
    pub members: Option<Vec<DestinationSummary>>,
}
