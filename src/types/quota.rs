use std::fmt;

/// A resource type from [RFC 2087 section
/// 3](https://datatracker.ietf.org/doc/html/rfc2087#section-3).
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum QuotaResourceName {
    /// Sum of messages' RFC822.SIZE, in units of 1024 octets.
    Storage,
    /// Number of messages.
    Message,
    /// Any other resource (for future RFCs).
    Atom(String),
}

impl From<&str> for QuotaResourceName {
    fn from(s: &str) -> QuotaResourceName {
        if s.eq_ignore_ascii_case("STORAGE") {
            QuotaResourceName::Storage
        } else if s.eq_ignore_ascii_case("MESSAGE") {
            QuotaResourceName::Message
        } else {
            QuotaResourceName::Atom(s.to_string())
        }
    }
}

impl fmt::Display for QuotaResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QuotaResourceName::Storage => f.write_str("STORAGE"),
            QuotaResourceName::Message => f.write_str("MESSAGE"),
            QuotaResourceName::Atom(ref s) => f.write_str(s),
        }
    }
}

/// Usage and limit of one resource within a quota root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuotaResource {
    /// The resource type.
    pub name: QuotaResourceName,
    /// Current usage.
    pub usage: u64,
    /// The enforced limit.
    pub limit: u64,
}

/// A limit to set with `SETQUOTA`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuotaLimit {
    /// The resource type.
    pub name: QuotaResourceName,
    /// The amount for that resource.
    pub amount: u64,
}

impl fmt::Display for QuotaLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.amount)
    }
}

/// The `QUOTA` response for one quota root ([RFC 2087 section
/// 5.1](https://datatracker.ietf.org/doc/html/rfc2087#section-5.1)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Quota {
    /// The quota root this listing is for.
    pub root_name: String,
    /// Usage and limits per resource.
    pub resources: Vec<QuotaResource>,
}

/// The `QUOTAROOT` response: the quota roots a mailbox lives under, plus the
/// quota listings the server volunteered alongside.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuotaRoot {
    /// The mailbox name asked about, decoded to UTF-8.
    pub mailbox_name: String,
    /// The quota roots that apply to the mailbox.
    pub quota_root_names: Vec<String>,
    /// The quota listings for those roots.
    pub quotas: Vec<Quota>,
}
