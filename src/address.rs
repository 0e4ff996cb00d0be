//! Parsing and formatting of `Name <email>` mailbox strings

use mailparse::{MailAddr, SingleInfo};

/// A mailbox split into its optional display name and address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub email: String,
}

impl Mailbox {
    /// Parse one RFC 5322 mailbox: `Name <email>`, `"Quoted, Name" <email>`,
    /// `<email>` or a bare address, with encoded words in the name decoded.
    /// Text that is not a single mailbox (a half-typed `jo`, an unclosed
    /// `<`) is kept whole as the address. Returns None when nothing but
    /// whitespace is left.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match parse_single(text) {
            Some(info) => {
                let email = info.addr.trim();
                let name = info
                    .display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty());
                match (name, email.is_empty()) {
                    (_, false) => Some(Self {
                        name: name.map(str::to_string),
                        email: email.to_string(),
                    }),
                    (Some(name), true) => Some(Self {
                        name: None,
                        email: name.to_string(),
                    }),
                    (None, true) => None,
                }
            }
            None => {
                let bare = unquote(text)
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .trim();
                (!bare.is_empty()).then(|| Self {
                    name: None,
                    email: bare.to_string(),
                })
            }
        }
    }

    /// Render as `Name <email>`, or the bare email without a name.
    pub fn format(&self) -> String {
        format_address(self.name.as_deref(), &self.email)
    }
}

/// Format a display name and address.
///
/// Double quotes are dropped from the name; a name containing a separator
/// (`,` or `;`) is wrapped in quotes so the result stays a single range.
pub fn format_address(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            let name = strip_quotes(name);
            if needs_quoting(&name) {
                format!("\"{}\" <{}>", name, email)
            } else {
                format!("{} <{}>", name, email)
            }
        }
        None => email.to_string(),
    }
}

/// A display name with its double quotes dropped, so it can never open a
/// quoted span in the entry text
pub fn strip_quotes(name: &str) -> String {
    name.chars().filter(|&c| c != '"').collect()
}

/// The single mailbox in `text`, if that is all it holds
fn parse_single(text: &str) -> Option<SingleInfo> {
    let parsed = if text.contains("=?") {
        // encoded words are only decoded when parsed as a header
        let header = format!("To: {}", text);
        mailparse::parse_header(header.as_bytes())
            .and_then(|(header, _)| mailparse::addrparse_header(&header))
    } else {
        mailparse::addrparse(text)
    };

    let list = match parsed {
        Ok(list) => list,
        Err(e) => {
            tracing::trace!("Not a mailbox {:?}: {}", text, e);
            return None;
        }
    };
    match list.as_slice() {
        [MailAddr::Single(info)] => Some(info.clone()),
        _ => None,
    }
}

fn needs_quoting(name: &str) -> bool {
    name.contains(|c| c == ',' || c == ';')
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Rewrite a `;`-delimited address list into the comma-delimited form the
/// entry understands.
///
/// Each part with exactly one well-formed `<...>` and no `:` or `"` becomes
/// `Name <email>` with the name quoted when it contains a comma. Other parts
/// are kept verbatim. Returns None when the text has no semicolon.
pub fn normalize_semicolon_list(text: &str) -> Option<String> {
    if !text.contains(';') {
        return None;
    }

    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut from = 0;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ';' if !in_quote => {
                parts.push(text[from..i].trim());
                from = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[from..].trim());

    let rewritten: Vec<String> = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(rewrite_part)
        .collect();

    if rewritten.is_empty() {
        return None;
    }
    Some(rewritten.join(", "))
}

fn rewrite_part(part: &str) -> String {
    if part.contains(':') || part.contains('"') || !has_single_angle_address(part) {
        return part.to_string();
    }

    let Some(addr_start) = part.find('<') else {
        return part.to_string();
    };
    let name = part[..addr_start].trim_end();
    let addr = &part[addr_start..];

    if name.is_empty() {
        addr.to_string()
    } else if name.contains(',') {
        format!("\"{}\" {}", name, addr)
    } else {
        format!("{} {}", name, addr)
    }
}

fn has_single_angle_address(part: &str) -> bool {
    let mut opens = 0;
    let mut closes = 0;
    let mut in_addr = false;
    for c in part.chars() {
        match c {
            '<' => {
                if in_addr {
                    return false;
                }
                in_addr = true;
                opens += 1;
            }
            '>' => {
                if !in_addr {
                    return false;
                }
                in_addr = false;
                closes += 1;
            }
            _ => {}
        }
    }
    !in_addr && opens == 1 && closes == 1
}
