//! Typed IMAP data elements and their wire serialization.
//!
//! Every argument an IMAP command carries is one of a small set of syntactic
//! shapes defined by [RFC 3501 section
//! 4](https://tools.ietf.org/html/rfc3501#section-4): atoms, strings that
//! quote on demand, strings that always quote, `NIL`-able strings, numbers,
//! dates, and parenthesized lists. [`Element`] models those shapes; building
//! commands out of `Element`s instead of raw strings is what keeps quoting
//! and escaping correct in one place.
//!
//! `escape()` produces the wire-ready form, `verbatim()` the raw value, and
//! `verify()` rejects values the shape cannot carry at all (an atom with a
//! space in it, a quoted string with a line break).

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::ValidateError;
use crate::types::MailboxName;

/// Characters that terminate an atom per RFC 3501 (`atom-specials`), plus
/// the quoting trigger set for astrings.
fn is_atom_special(c: char) -> bool {
    matches!(c, '(' | ')' | '{' | '%' | '*' | '"' | '\\' | ' ') || c.is_control()
}

fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn needs_quoting(value: &str, exempt_wildcards: bool) -> bool {
    value.is_empty()
        || value.chars().any(|c| {
            if exempt_wildcards && (c == '%' || c == '*') {
                return false;
            }
            is_atom_special(c) || !c.is_ascii()
        })
}

/// Reject values that cannot be carried even inside a quoted string; CR and
/// LF would need a literal, which command builders emit explicitly.
fn verify_quotable(value: &str) -> Result<(), ValidateError> {
    for c in value.chars() {
        if c == '\r' || c == '\n' {
            return Err(ValidateError(c));
        }
    }
    Ok(())
}

/// A typed IMAP wire-format value.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A bare atom; fails verification if it holds atom-special characters.
    Atom(String),
    /// An atom that switches to a quoted string when the value needs it.
    Astring(String),
    /// A string, always quoted.
    String(String),
    /// A string or the absence of one; `None` escapes to `NIL`.
    Nstring(Option<String>),
    /// A non-negative number.
    Number(u64),
    /// A date, rendered `dd-Mon-yyyy`.
    Date(NaiveDate),
    /// A date-time, rendered `"dd-Mon-yyyy hh:mm:ss +zzzz"` (always quoted).
    DateTime(DateTime<FixedOffset>),
    /// The `NIL` token.
    Nil,
    /// A parenthesized list of nested elements.
    List(Vec<Element>),
    /// A mailbox name: encoded to modified UTF-7, then escaped like an
    /// astring.
    Mailbox(MailboxName),
    /// A mailbox name or pattern for `LIST`/`LSUB`: like [`Element::Astring`]
    /// but the `%` and `*` wildcards do not trigger quoting.
    ListMailbox(String),
}

impl Element {
    /// Build a `List` from anything iterable, wrapping plain strings as
    /// atoms.
    pub fn list<I, E>(items: I) -> Element
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Element::List(items.into_iter().map(Into::into).collect())
    }

    /// The unescaped value.
    pub fn verbatim(&self) -> String {
        match *self {
            Element::Atom(ref v)
            | Element::Astring(ref v)
            | Element::String(ref v)
            | Element::ListMailbox(ref v) => v.clone(),
            Element::Nstring(ref v) => v.clone().unwrap_or_default(),
            Element::Number(n) => n.to_string(),
            Element::Date(d) => d.format("%d-%b-%Y").to_string(),
            Element::DateTime(dt) => dt.format("%d-%b-%Y %H:%M:%S %z").to_string(),
            Element::Nil => String::new(),
            Element::List(ref items) => {
                let inner: Vec<String> = items.iter().map(Element::verbatim).collect();
                format!("({})", inner.join(" "))
            }
            Element::Mailbox(ref m) => m.utf8().to_string(),
        }
    }

    /// The wire-ready form, with quoting and escaping applied.
    pub fn escape(&self) -> String {
        match *self {
            Element::Atom(ref v) => v.clone(),
            Element::Astring(ref v) => {
                if needs_quoting(v, false) {
                    quoted(v)
                } else {
                    v.clone()
                }
            }
            Element::String(ref v) => quoted(v),
            Element::Nstring(ref v) => match v {
                Some(v) => quoted(v),
                None => "NIL".to_string(),
            },
            Element::Number(n) => n.to_string(),
            Element::Date(d) => {
                let v = d.format("%d-%b-%Y").to_string();
                // no specials in a date, so this stays bare
                Element::Astring(v).escape()
            }
            Element::DateTime(dt) => quoted(&dt.format("%d-%b-%Y %H:%M:%S %z").to_string()),
            Element::Nil => "NIL".to_string(),
            Element::List(ref items) => {
                let inner: Vec<String> = items.iter().map(Element::escape).collect();
                format!("({})", inner.join(" "))
            }
            Element::Mailbox(ref m) => {
                let v = m.utf7imap();
                if needs_quoting(v, false) {
                    quoted(v)
                } else {
                    v.to_string()
                }
            }
            Element::ListMailbox(ref v) => {
                let v = crate::utf7::utf8_to_utf7imap(v, true);
                if needs_quoting(&v, true) {
                    quoted(&v)
                } else {
                    v
                }
            }
        }
    }

    /// Check that the value is representable in this shape.
    pub fn verify(&self) -> Result<(), ValidateError> {
        match *self {
            Element::Atom(ref v) => {
                for c in v.chars() {
                    if is_atom_special(c) {
                        return Err(ValidateError(c));
                    }
                }
                Ok(())
            }
            Element::Astring(ref v) | Element::String(ref v) | Element::ListMailbox(ref v) => {
                verify_quotable(v)
            }
            Element::Nstring(ref v) => match v {
                Some(v) => verify_quotable(v),
                None => Ok(()),
            },
            Element::Mailbox(ref m) => verify_quotable(m.utf7imap()),
            Element::Number(_) | Element::Date(_) | Element::DateTime(_) | Element::Nil => Ok(()),
            Element::List(ref items) => {
                for item in items {
                    item.verify()?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Element {
        Element::Atom(s.to_string())
    }
}

impl From<String> for Element {
    fn from(s: String) -> Element {
        Element::Atom(s)
    }
}

impl From<Vec<Element>> for Element {
    fn from(items: Vec<Element>) -> Element {
        Element::List(items)
    }
}
