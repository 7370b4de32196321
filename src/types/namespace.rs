/// One namespace prefix/delimiter pair from a `NAMESPACE` response
/// ([RFC 2342](https://tools.ietf.org/html/rfc2342)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Namespace {
    /// The namespace prefix, decoded to UTF-8.
    pub prefix: String,
    /// The hierarchy delimiter used below this prefix.
    pub delimiter: Option<String>,
}

/// The three namespace groups a server reports.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Namespaces {
    /// Namespaces holding the user's own mailboxes.
    pub personal: Vec<Namespace>,
    /// Namespaces holding other users' mailboxes.
    pub other_users: Vec<Namespace>,
    /// Shared namespaces.
    pub shared: Vec<Namespace>,
}
