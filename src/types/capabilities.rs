use std::collections::hash_set;
use std::collections::HashSet;

/// From [section 7.2.1 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-7.2.1).
///
/// The set of capability names a server supports. The list always includes
/// the atom `IMAP4rev1`. A name beginning with `AUTH=` indicates that the
/// server supports that particular authentication mechanism; other names
/// indicate extensions such as `CONDSTORE` or `QUOTA`.
///
/// Client implementations SHOULD NOT require any capability name other than
/// `IMAP4rev1`, and MUST ignore any unknown capability names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Capabilities(pub(crate) HashSet<String>);

impl Capabilities {
    /// Build a capability set from names, mostly useful for gating query
    /// builders in tests.
    pub fn from_names<I, S>(names: I) -> Capabilities
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Capabilities(names.into_iter().map(Into::into).collect())
    }

    /// Check if the server has the given capability (exact,
    /// case-sensitive — capability names are sent in their canonical
    /// uppercase form).
    pub fn has(&self, s: &str) -> bool {
        self.0.contains(s)
    }

    /// Check for a capability with parameters, e.g.
    /// `has_param("SEARCH", "FUZZY")` matches `SEARCH=FUZZY`.
    pub fn has_param(&self, name: &str, param: &str) -> bool {
        self.0.contains(&format!("{}={}", name, param))
    }

    /// Iterate over all the server's capabilities.
    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns how many capabilities the server has.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the server purports to have no capabilities.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        let caps = Capabilities::from_names(["IMAP4rev1", "QUOTA", "SEARCH=FUZZY"]);
        assert!(caps.has("QUOTA"));
        assert!(!caps.has("quota"));
        assert!(caps.has_param("SEARCH", "FUZZY"));
        assert!(!caps.has_param("SEARCH", "FULLTEXT"));
        assert_eq!(caps.len(), 3);
    }
}
