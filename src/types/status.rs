use std::fmt;

use super::{Seq, Uid};

/// One attribute requested from, or reported by, the `STATUS` command
/// ([RFC 3501 section
/// 6.3.10](https://tools.ietf.org/html/rfc3501#section-6.3.10), extended
/// with `HIGHESTMODSEQ` from RFC 7162).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum StatusItem {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
    HighestModSeq,
}

impl fmt::Display for StatusItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            StatusItem::Messages => "MESSAGES",
            StatusItem::Recent => "RECENT",
            StatusItem::UidNext => "UIDNEXT",
            StatusItem::UidValidity => "UIDVALIDITY",
            StatusItem::Unseen => "UNSEEN",
            StatusItem::HighestModSeq => "HIGHESTMODSEQ",
        })
    }
}

/// One reported status attribute with its value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum StatusAttribute {
    Messages(u32),
    Recent(u32),
    UidNext(Uid),
    UidValidity(u32),
    Unseen(Seq),
    HighestModSeq(u64),
}

/// The result of a `STATUS` command for one mailbox.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct MailboxStatus {
    /// The mailbox the status refers to, decoded to UTF-8.
    pub mailbox: String,
    pub messages: Option<u32>,
    pub recent: Option<u32>,
    pub uid_next: Option<Uid>,
    pub uid_validity: Option<u32>,
    pub unseen: Option<Seq>,
    pub highest_mod_seq: Option<u64>,
}

impl MailboxStatus {
    pub(crate) fn apply(&mut self, attr: StatusAttribute) {
        match attr {
            StatusAttribute::Messages(n) => self.messages = Some(n),
            StatusAttribute::Recent(n) => self.recent = Some(n),
            StatusAttribute::UidNext(n) => self.uid_next = Some(n),
            StatusAttribute::UidValidity(n) => self.uid_validity = Some(n),
            StatusAttribute::Unseen(n) => self.unseen = Some(n),
            StatusAttribute::HighestModSeq(n) => self.highest_mod_seq = Some(n),
        }
    }
}
