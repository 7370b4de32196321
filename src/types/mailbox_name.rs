use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utf7::{utf7imap_to_utf8, utf8_to_utf7imap};

/// A mailbox name, cached in both of its canonical forms: UTF-8 for humans
/// and modified UTF-7 (UTF7-IMAP) for the wire.
///
/// Equality and hashing are defined on the UTF7-IMAP form, since that is the
/// identity a server knows the mailbox by.
#[derive(Debug, Clone)]
pub struct MailboxName {
    utf8: String,
    utf7: String,
}

impl MailboxName {
    /// Wrap a human-readable UTF-8 name.
    pub fn from_utf8(name: &str) -> MailboxName {
        MailboxName {
            utf8: name.to_string(),
            utf7: utf8_to_utf7imap(name, true),
        }
    }

    /// Wrap a wire-form (modified UTF-7) name, e.g. one returned by `LIST`.
    pub fn from_utf7imap(name: &str) -> MailboxName {
        MailboxName {
            utf8: utf7imap_to_utf8(name),
            utf7: name.to_string(),
        }
    }

    /// Guess which form `name` is in and wrap it.
    ///
    /// This is best-effort and inherently ambiguous: a name like
    /// `"Foo&Bar-2011"` scans as valid UTF7-IMAP (`&Bar-` is a well-formed
    /// encoded run) and is treated as the wire form even if the user meant a
    /// literal ampersand. Callers that know which form they hold should use
    /// [`MailboxName::from_utf8`] or [`MailboxName::from_utf7imap`].
    pub fn auto(name: &str) -> MailboxName {
        if name.contains('&') && looks_like_utf7imap(name) {
            MailboxName::from_utf7imap(name)
        } else {
            MailboxName::from_utf8(name)
        }
    }

    /// The human-readable form.
    pub fn utf8(&self) -> &str {
        &self.utf8
    }

    /// The wire form.
    pub fn utf7imap(&self) -> &str {
        &self.utf7
    }

    /// True for the special `INBOX` name (case-insensitive per RFC 3501).
    pub fn is_inbox(&self) -> bool {
        self.utf7.eq_ignore_ascii_case("INBOX")
    }
}

// Every '&' must start a terminated run of modified-base64 characters (or
// the "&-" escape), and the whole name must already be ASCII.
fn looks_like_utf7imap(name: &str) -> bool {
    if !name.is_ascii() {
        return false;
    }
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            let Some(dash) = bytes[i + 1..].iter().position(|&b| b == b'-') else {
                return false;
            };
            if !bytes[i + 1..i + 1 + dash]
                .iter()
                .all(|&b| b.is_ascii_alphanumeric() || b == b'+' || b == b',')
            {
                return false;
            }
            i += dash + 2;
        } else {
            i += 1;
        }
    }
    true
}

impl PartialEq for MailboxName {
    fn eq(&self, other: &MailboxName) -> bool {
        self.utf7 == other.utf7
    }
}

impl Eq for MailboxName {}

impl Hash for MailboxName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.utf7.hash(state);
    }
}

impl fmt::Display for MailboxName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.utf8)
    }
}

impl From<&str> for MailboxName {
    /// Treats the input as UTF-8.
    fn from(name: &str) -> MailboxName {
        MailboxName::from_utf8(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_forms_cached() {
        let m = MailboxName::from_utf8("Envoyé");
        assert_eq!(m.utf8(), "Envoyé");
        assert_eq!(m.utf7imap(), "Envoy&AOk-");

        let w = MailboxName::from_utf7imap("Envoy&AOk-");
        assert_eq!(w.utf8(), "Envoyé");
        assert_eq!(m, w);
    }

    #[test]
    fn equality_is_wire_form() {
        let a = MailboxName::from_utf8("INBOX.Sent");
        let b = MailboxName::from_utf7imap("INBOX.Sent");
        assert_eq!(a, b);
    }

    #[test]
    fn auto_detection_is_best_effort() {
        assert_eq!(MailboxName::auto("Envoy&AOk-").utf8(), "Envoyé");
        assert_eq!(MailboxName::auto("Plain").utf8(), "Plain");
        // non-ASCII input can only be UTF-8
        assert_eq!(MailboxName::auto("Envoyé").utf7imap(), "Envoy&AOk-");
        // the documented ambiguity: "&Bar-" scans as an encoded run, so this
        // input is taken as wire form; read as UTF-8 it would have encoded
        // the ampersand and named a different mailbox
        let ambiguous = MailboxName::auto("Foo&Bar-2011");
        assert_eq!(ambiguous.utf7imap(), "Foo&Bar-2011");
        assert_ne!(ambiguous, MailboxName::from_utf8("Foo&Bar-2011"));
        assert_eq!(
            MailboxName::from_utf8("Foo&Bar-2011").utf7imap(),
            "Foo&-Bar-2011"
        );
    }

    #[test]
    fn inbox_is_case_insensitive() {
        assert!(MailboxName::from_utf8("inbox").is_inbox());
        assert!(!MailboxName::from_utf8("INBOX.child").is_inbox());
    }
}
