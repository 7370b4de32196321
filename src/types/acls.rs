use std::collections::BTreeSet;
use std::fmt;

/// How `SETACL` should combine the given rights with the existing ones.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AclModifyMode {
    /// Replace all rights on the identifier for the mailbox.
    Replace,
    /// Add the given rights to the identifier for the mailbox.
    Add,
    /// Remove the given rights from the identifier for the mailbox.
    Remove,
}

/// A single right from [RFC 4314 section
/// 2](https://datatracker.ietf.org/doc/html/rfc4314#section-2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum AclRight {
    /// `l` - mailbox is visible to LIST/LSUB
    Lookup,
    /// `r` - SELECT the mailbox, perform STATUS
    Read,
    /// `s` - keep seen/unseen information across sessions
    Seen,
    /// `w` - set or clear flags other than \Seen and \Deleted
    Write,
    /// `i` - perform APPEND, COPY into mailbox
    Insert,
    /// `p` - send mail to submission address for mailbox
    Post,
    /// `k` - create mailboxes
    CreateMailbox,
    /// `x` - delete mailbox
    DeleteMailbox,
    /// `t` - set or clear \Deleted flag
    DeleteMessage,
    /// `e` - perform EXPUNGE and expunge as part of CLOSE
    Expunge,
    /// `a` - administer (perform SETACL/DELETEACL/GETACL/LISTRIGHTS)
    Administer,
    /// Any other right the server grants.
    Custom(char),
}

impl From<char> for AclRight {
    fn from(c: char) -> AclRight {
        match c {
            'l' => AclRight::Lookup,
            'r' => AclRight::Read,
            's' => AclRight::Seen,
            'w' => AclRight::Write,
            'i' => AclRight::Insert,
            'p' => AclRight::Post,
            'k' => AclRight::CreateMailbox,
            'x' => AclRight::DeleteMailbox,
            't' => AclRight::DeleteMessage,
            'e' => AclRight::Expunge,
            'a' => AclRight::Administer,
            c => AclRight::Custom(c),
        }
    }
}

impl From<AclRight> for char {
    fn from(right: AclRight) -> char {
        match right {
            AclRight::Lookup => 'l',
            AclRight::Read => 'r',
            AclRight::Seen => 's',
            AclRight::Write => 'w',
            AclRight::Insert => 'i',
            AclRight::Post => 'p',
            AclRight::CreateMailbox => 'k',
            AclRight::DeleteMailbox => 'x',
            AclRight::DeleteMessage => 't',
            AclRight::Expunge => 'e',
            AclRight::Administer => 'a',
            AclRight::Custom(c) => c,
        }
    }
}

/// A set of rights, rendered on the wire as a string of right characters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AclRights {
    pub(crate) data: BTreeSet<AclRight>,
}

impl AclRights {
    /// Whether the set contains the given right (either as a char or an
    /// [`AclRight`]).
    pub fn has_right<T: Into<AclRight>>(&self, right: T) -> bool {
        self.data.contains(&right.into())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AclRight> + '_ {
        self.data.iter().copied()
    }
}

impl fmt::Display for AclRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars: Vec<char> = self.data.iter().map(|&r| char::from(r)).collect();
        chars.sort_unstable();
        write!(f, "{}", chars.into_iter().collect::<String>())
    }
}

impl From<&str> for AclRights {
    fn from(s: &str) -> AclRights {
        AclRights {
            data: s.chars().map(AclRight::from).collect(),
        }
    }
}

impl From<Vec<AclRight>> for AclRights {
    fn from(v: Vec<AclRight>) -> AclRights {
        AclRights {
            data: v.into_iter().collect(),
        }
    }
}

/// The `ACL` response to a `GETACL` command ([RFC 4314 section
/// 3.6](https://datatracker.ietf.org/doc/html/rfc4314#section-3.6)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Acl {
    /// The mailbox these identifier/rights pairs are for, decoded to UTF-8.
    pub mailbox: String,
    /// The list of identifier/rights pairs for the mailbox.
    pub acls: Vec<AclEntry>,
}

/// One identifier/rights pair in an [`Acl`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AclEntry {
    /// The user identifier the rights are for.
    pub identifier: String,
    /// The rights for the provided identifier.
    pub rights: AclRights,
}

/// The `LISTRIGHTS` response ([RFC 4314 section
/// 3.7](https://datatracker.ietf.org/doc/html/rfc4314#section-3.7)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListRights {
    /// The mailbox for the rights, decoded to UTF-8.
    pub mailbox: String,
    /// The user identifier for the rights.
    pub identifier: String,
    /// The set of rights always granted to this identifier.
    pub required: AclRights,
    /// The sets of rights that can be granted to the identifier, flattened.
    pub optional: AclRights,
}

/// The `MYRIGHTS` response ([RFC 4314 section
/// 3.8](https://datatracker.ietf.org/doc/html/rfc4314#section-3.8)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MyRights {
    /// The mailbox for the rights, decoded to UTF-8.
    pub mailbox: String,
    /// The rights the current user has on the mailbox.
    pub rights: AclRights,
}
