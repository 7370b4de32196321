use chrono::{DateTime, FixedOffset};

use super::{Flag, Seq, Uid};

/// An IMAP [`FETCH` response](https://tools.ietf.org/html/rfc3501#section-7.4.2)
/// that contains data about a particular message. This response occurs as
/// the result of a `FETCH` or `STORE` command, as well as by unilateral
/// server decision (e.g., flag updates).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Fetch {
    /// The ordinal number of this message in its containing mailbox.
    pub message: Seq,

    /// The unique identifier of the message, if `UID` was fetched (always
    /// present for `UID FETCH` results).
    pub uid: Option<Uid>,

    /// The message's `RFC822.SIZE`, if fetched.
    pub size: Option<u32>,

    /// The message's mod-sequence, if the server reported one (CONDSTORE).
    pub modseq: Option<u64>,

    /// The server's `INTERNALDATE` for the message, if fetched.
    pub internal_date: Option<DateTime<FixedOffset>>,

    pub(crate) flags: Vec<Flag>,
    // BODY[...] / RFC822* data items, keyed by the item name as echoed by
    // the server (uppercased), e.g. "BODY[]" or "BODY[HEADER]"
    pub(crate) sections: Vec<(String, Option<Vec<u8>>)>,
}

impl Fetch {
    /// A list of flags that are set for this message.
    pub fn flags(&self) -> &[Flag] {
        &self.flags[..]
    }

    /// The data of an arbitrary `BODY[...]` data item echoed by the server,
    /// named exactly as requested (case-insensitive), e.g.
    /// `section("BODY[1.2]")`.
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        self.sections
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    /// The entire message, if `BODY[]` or `RFC822` was fetched.
    pub fn body(&self) -> Option<&[u8]> {
        self.section("BODY[]").or_else(|| self.section("RFC822"))
    }

    /// The message's header, if `BODY[HEADER]` or `RFC822.HEADER` was
    /// fetched.
    pub fn header(&self) -> Option<&[u8]> {
        self.section("BODY[HEADER]")
            .or_else(|| self.section("RFC822.HEADER"))
    }

    /// The message's body text, if `BODY[TEXT]` or `RFC822.TEXT` was
    /// fetched.
    pub fn text(&self) -> Option<&[u8]> {
        self.section("BODY[TEXT]")
            .or_else(|| self.section("RFC822.TEXT"))
    }
}
