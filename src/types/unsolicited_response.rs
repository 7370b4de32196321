use super::{Flag, ResponseCode, Seq, StatusAttribute, Uid};

/// Responses the server sends that are not related to the current command.
/// [RFC 3501 section 7](https://tools.ietf.org/html/rfc3501#section-7)
/// states that clients need to be able to accept any response at any time.
///
/// Note that `Recent`, `Exists` and `Expunge` responses refer to the
/// currently selected mailbox, so the user must take care when interpreting
/// them; the session's own bookkeeping has already been updated by the time
/// these are delivered.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum UnsolicitedResponse {
    /// An unsolicited [`STATUS` response](https://tools.ietf.org/html/rfc3501#section-7.2.4)
    /// for a mailbox other than the one a `STATUS` command asked about.
    Status {
        /// The mailbox that this status response is for.
        mailbox: String,
        /// The attributes of this mailbox.
        attributes: Vec<StatusAttribute>,
    },

    /// An unsolicited [`RECENT` response](https://tools.ietf.org/html/rfc3501#section-7.3.2)
    /// indicating the number of messages with the `\Recent` flag set.
    Recent(u32),

    /// An unsolicited [`EXISTS` response](https://tools.ietf.org/html/rfc3501#section-7.3.1)
    /// that reports the number of messages in the mailbox.
    Exists(u32),

    /// An unsolicited [`EXPUNGE` response](https://tools.ietf.org/html/rfc3501#section-7.4.1):
    /// the message with this sequence number has been permanently removed,
    /// and every later sequence number has shifted down by one.
    Expunge(Seq),

    /// A `VANISHED (EARLIER)`-style response (RFC 7162) reporting removed
    /// messages by UID.
    Vanished(Vec<Uid>),

    /// An unsolicited [`FETCH` response](https://tools.ietf.org/html/rfc3501#section-7.4.2),
    /// usually announcing a flag change made by another session.
    Fetch {
        /// Message sequence number.
        id: Seq,
        /// The message's UID, when the server includes it.
        uid: Option<Uid>,
        /// The message's current flags.
        flags: Vec<Flag>,
    },

    /// An unsolicited [`OK` response](https://tools.ietf.org/html/rfc3501#section-7.1.1).
    Ok {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`NO` response](https://tools.ietf.org/html/rfc3501#section-7.1.2).
    No {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`BAD` response](https://tools.ietf.org/html/rfc3501#section-7.1.3).
    Bad {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`BYE` response](https://tools.ietf.org/html/rfc3501#section-7.1.5),
    /// e.g. an autologout warning.
    Bye {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// A new capability list announced outside a `CAPABILITY` command.
    Capabilities(Vec<String>),
}
