use std::fmt;

use super::{Flag, Uid};

/// The quantities a server reports when a mailbox is opened with `SELECT` or
/// `EXAMINE` (see [RFC 3501 section
/// 6.3.1](https://tools.ietf.org/html/rfc3501#section-6.3.1)).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Mailbox {
    /// Flags defined in this mailbox.
    pub flags: Vec<Flag>,
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of messages with the `\Recent` flag set.
    pub recent: u32,
    /// Sequence number of the first message without the `\Seen` flag, if any
    /// message lacks it.
    pub unseen: Option<u32>,
    /// Flags the client can change permanently. May include `\*`.
    pub permanent_flags: Vec<Flag>,
    /// Predicted UID of the next arriving message.
    pub uid_next: Option<Uid>,
    /// The UID validity value of this mailbox incarnation.
    pub uid_validity: Option<u32>,
    /// Highest mod-sequence of the mailbox, when the server supports
    /// CONDSTORE (RFC 7162).
    pub highest_mod_seq: Option<u64>,
    /// True when the mailbox was opened read-only: either via `EXAMINE`, or
    /// because the server said `[READ-ONLY]`.
    pub read_only: bool,
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flags: {:?}, exists: {}, recent: {}, unseen: {:?}, permanent_flags: {:?}, \
             uid_next: {:?}, uid_validity: {:?}, highest_mod_seq: {:?}, read_only: {}",
            self.flags,
            self.exists,
            self.recent,
            self.unseen,
            self.permanent_flags,
            self.uid_next,
            self.uid_validity,
            self.highest_mod_seq,
            self.read_only
        )
    }
}
