use std::fmt;

use super::Uid;

/// Meta-information about a message, as returned by
/// [`APPEND`](https://tools.ietf.org/html/rfc3501#section-6.3.11).
/// Note that `APPEND` only returns any data if certain extensions are
/// enabled, for example [`UIDPLUS`](https://tools.ietf.org/html/rfc4315).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Appended {
    /// The unique identifier validity value of the mailbox the message was
    /// appended to. Only present if the server supports `UIDPLUS`.
    pub uid_validity: Option<u32>,

    /// The unique identifiers of the appended messages. Only present if the
    /// server supports `UIDPLUS`; more than one value only with
    /// [`MULTIAPPEND`](https://tools.ietf.org/html/rfc3502).
    pub uids: Option<Vec<Uid>>,
}

impl fmt::Display for Appended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uid_validity: {:?}, uids: {:?}",
            self.uid_validity, self.uids,
        )
    }
}
