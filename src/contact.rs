//! Contacts as delivered by a contact source, and cue matching against them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::address::{format_address, strip_quotes};
use crate::tokenizer;

/// Identifies the address book a contact came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRef(pub String);

impl fmt::Display for BookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One member of a contact list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMember {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub file_as: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub is_list: bool,
    /// Lists only: show member addresses instead of the list name
    #[serde(default)]
    pub list_show_addresses: bool,
    #[serde(default)]
    pub members: Vec<ListMember>,
}

impl Contact {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_nickname(mut self, name: impl Into<String>) -> Self {
        self.nickname = Some(name.into());
        self
    }

    pub fn with_file_as(mut self, name: impl Into<String>) -> Self {
        self.file_as = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }

    pub fn with_member(mut self, name: Option<&str>, email: impl Into<String>) -> Self {
        self.is_list = true;
        self.members.push(ListMember {
            name: name.map(str::to_string),
            email: email.into(),
        });
        self
    }

    /// Display name: full name, then file-as, then a placeholder for lists
    pub fn display_name(&self) -> Option<String> {
        non_empty(self.full_name.as_deref())
            .or_else(|| non_empty(self.file_as.as_deref()))
            .map(str::to_string)
            .or_else(|| self.is_list.then(|| "Unnamed List".to_string()))
    }

    pub fn email(&self, index: usize) -> Option<&str> {
        non_empty(self.emails.get(index).map(String::as_str))
    }

    pub fn field(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::FullName => non_empty(self.full_name.as_deref()),
            ContactField::Nickname => non_empty(self.nickname.as_deref()),
            ContactField::FileAs => non_empty(self.file_as.as_deref()),
            ContactField::Email => self.email(0),
        }
    }

    /// Identity used to hide the same person delivered by several books.
    ///
    /// None for individuals with several addresses; those are never merged.
    pub fn description(&self) -> Option<String> {
        if !self.is_list && self.emails.len() > 1 {
            return None;
        }

        let mut emails: Vec<String> = self.emails.iter().map(|e| e.to_lowercase()).collect();
        emails.sort();

        Some(format!(
            "{}\n{}\n{}\n{}",
            if self.is_list { "list" } else { "indv" },
            self.file_as.as_deref().unwrap_or_default(),
            self.full_name.as_deref().unwrap_or_default(),
            emails.join("\n")
        ))
    }

    /// Match `cue` as a case-insensitive prefix of the contact's fields,
    /// tried in rank order. Lists never match on email.
    pub fn match_cue(&self, cue: &str) -> Option<CueMatch> {
        if cue.is_empty() || (self.email(0).is_none() && !self.is_list) {
            return None;
        }

        let cue = cue.to_lowercase();

        for field in [ContactField::FullName, ContactField::Nickname, ContactField::FileAs] {
            if let Some(value) = self.field(field) {
                if tokenizer::sanitize(value).to_lowercase().starts_with(&cue) {
                    return Some(CueMatch {
                        field,
                        email_index: 0,
                        value: value.to_string(),
                    });
                }
            }
        }

        if self.is_list {
            return None;
        }

        self.emails.iter().enumerate().find_map(|(i, email)| {
            tokenizer::sanitize(email)
                .to_lowercase()
                .starts_with(&cue)
                .then(|| CueMatch {
                    field: ContactField::Email,
                    email_index: i,
                    value: email.clone(),
                })
        })
    }

    /// Text written into the entry when a match completes: the matched name
    /// with the first address, or the matched address alone.
    pub fn completion_text(&self, m: &CueMatch) -> Option<String> {
        let text = match m.field {
            ContactField::Email => self.email(m.email_index)?.to_string(),
            field if self.is_list => strip_quotes(self.field(field)?),
            field => format!("{} <{}>", strip_quotes(self.field(field)?), self.email(0)?),
        };
        Some(tokenizer::sanitize(&text))
    }

    /// Row shown in the popup for one of the contact's addresses
    pub fn popup_text(&self, email_index: usize) -> String {
        if self.is_list {
            return self.display_name().unwrap_or_default();
        }
        let email = self.email(email_index).unwrap_or_default();
        format_address(self.display_name().as_deref(), email)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Contact fields a cue is matched against, in rank order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    FullName,
    Nickname,
    FileAs,
    Email,
}

impl ContactField {
    /// Lower is better
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Result of matching a cue against one contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueMatch {
    pub field: ContactField,
    pub email_index: usize,
    /// The field value the cue matched
    pub value: String,
}

/// A contact together with the book it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactHit {
    pub contact: Arc<Contact>,
    pub book: BookRef,
}

impl ContactHit {
    pub fn new(contact: Contact, book: impl Into<String>) -> Self {
        Self {
            contact: Arc::new(contact),
            book: BookRef(book.into()),
        }
    }

    pub fn source_ident(&self) -> String {
        format!("{}\n{}", self.book, self.contact.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> Contact {
        Contact::new("c1")
            .with_full_name("John Doe")
            .with_nickname("Johnny")
            .with_email("john@x.com")
            .with_email("jd@work.com")
    }

    #[test]
    fn test_match_prefers_full_name() {
        let m = john().match_cue("jo").unwrap();
        assert_eq!(m.field, ContactField::FullName);
        assert_eq!(m.email_index, 0);
    }

    #[test]
    fn test_match_email_index() {
        let m = john().match_cue("JD@").unwrap();
        assert_eq!(m.field, ContactField::Email);
        assert_eq!(m.email_index, 1);
        assert_eq!(john().completion_text(&m).as_deref(), Some("jd@work.com"));
    }

    #[test]
    fn test_contact_without_email_never_matches() {
        let c = Contact::new("c2").with_full_name("Nobody");
        assert!(c.match_cue("no").is_none());
    }

    #[test]
    fn test_lists_do_not_match_on_email() {
        let list = Contact::new("l1")
            .with_full_name("Team")
            .with_email("team@x.com")
            .with_member(Some("A"), "a@x.com");
        assert!(list.match_cue("team@").is_none());
        assert_eq!(list.match_cue("te").unwrap().field, ContactField::FullName);
    }

    #[test]
    fn test_completion_text_for_name_uses_first_email() {
        let m = john().match_cue("john").unwrap();
        assert_eq!(
            john().completion_text(&m).as_deref(),
            Some("John Doe <john@x.com>")
        );
    }

    #[test]
    fn test_completion_text_drops_quotes_from_name() {
        let jim = Contact::new("c9")
            .with_full_name("Jim \"JJ")
            .with_email("jim@x.com");
        let m = jim.match_cue("jim").unwrap();
        assert_eq!(jim.completion_text(&m).as_deref(), Some("Jim JJ <jim@x.com>"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let c = Contact::new("c3").with_file_as("Doe, Jane").with_email("j@x.com");
        assert_eq!(c.display_name().as_deref(), Some("Doe, Jane"));

        let list = Contact::new("l2").with_member(None, "a@x.com");
        assert_eq!(list.display_name().as_deref(), Some("Unnamed List"));
    }

    #[test]
    fn test_description_skips_multi_address_individuals() {
        assert!(john().description().is_none());
        let single = Contact::new("c4").with_full_name("A").with_email("A@x.com");
        assert_eq!(single.description().unwrap(), "indv\n\nA\na@x.com");
    }
}
