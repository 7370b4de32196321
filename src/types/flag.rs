use std::fmt;

/// With the exception of [`Flag::Custom`], these are the system flags
/// pre-defined in [RFC 3501 section
/// 2.3.2](https://tools.ietf.org/html/rfc3501#section-2.3.2). All system
/// flags begin with `\` in the IMAP protocol. Certain system flags
/// (`\Deleted` and `\Seen`) have special semantics described elsewhere.
///
/// A flag can be permanent or session-only on a per-flag basis. Permanent
/// flags are those which the client can add or remove from the message flags
/// permanently; changes to session flags are valid only in that session.
///
/// > Note: The `\Recent` system flag is a special case of a session flag.
/// > `\Recent` can not be used as an argument in a `STORE` or `APPEND`
/// > command, and thus can not be changed at all.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum Flag {
    /// Message has been read
    Seen,

    /// Message has been answered
    Answered,

    /// Message is "flagged" for urgent/special attention
    Flagged,

    /// Message is "deleted" for removal by later EXPUNGE
    Deleted,

    /// Message has not completed composition (marked as a draft).
    Draft,

    /// Message is "recently" arrived in this mailbox. This session is the
    /// first session to have been notified about this message. This flag
    /// can not be altered by the client.
    Recent,

    /// [`Mailbox::permanent_flags`](super::Mailbox::permanent_flags) can
    /// include this special flag (`\*`), which indicates that it is possible
    /// to create new keywords by attempting to store those flags in the
    /// mailbox.
    MayCreate,

    /// A non-standard user- or server-defined flag.
    Custom(String),
}

impl Flag {
    fn system(s: &str) -> Option<Flag> {
        match s {
            "\\Seen" => Some(Flag::Seen),
            "\\Answered" => Some(Flag::Answered),
            "\\Flagged" => Some(Flag::Flagged),
            "\\Deleted" => Some(Flag::Deleted),
            "\\Draft" => Some(Flag::Draft),
            "\\Recent" => Some(Flag::Recent),
            "\\*" => Some(Flag::MayCreate),
            _ => None,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Flag::Seen => write!(f, "\\Seen"),
            Flag::Answered => write!(f, "\\Answered"),
            Flag::Flagged => write!(f, "\\Flagged"),
            Flag::Deleted => write!(f, "\\Deleted"),
            Flag::Draft => write!(f, "\\Draft"),
            Flag::Recent => write!(f, "\\Recent"),
            Flag::MayCreate => write!(f, "\\*"),
            Flag::Custom(ref s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for Flag {
    fn from(s: String) -> Flag {
        match Flag::system(&s) {
            Some(f) => f,
            None => Flag::Custom(s),
        }
    }
}

impl From<&str> for Flag {
    fn from(s: &str) -> Flag {
        match Flag::system(s) {
            Some(f) => f,
            None => Flag::Custom(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_flags_round_trip() {
        for s in ["\\Seen", "\\Answered", "\\Flagged", "\\Deleted", "\\Draft", "\\Recent", "\\*"] {
            assert_eq!(Flag::from(s).to_string(), s);
        }
    }

    #[test]
    fn custom_flag() {
        assert_eq!(Flag::from("$Forwarded"), Flag::Custom("$Forwarded".into()));
        assert_eq!(Flag::from("$Forwarded").to_string(), "$Forwarded");
    }
}
