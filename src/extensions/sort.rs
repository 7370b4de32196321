//! Criteria types for the `SORT` and `THREAD` commands of [RFC
//! 5256](https://tools.ietf.org/html/rfc5256).
//!
//! `SORT` is a variant of `SEARCH` with sorting semantics for the results;
//! `THREAD` is a variant that groups the results into threads. Both take
//! their selector as an argument before the searching charset.

use std::fmt;

pub(crate) struct SortCriteria<'c>(pub(crate) &'c [SortCriterion<'c>]);

impl<'c> fmt::Display for SortCriteria<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "")
        } else {
            let criteria: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
            write!(f, "({})", criteria.join(" "))
        }
    }
}

/// The defined sort criteria. If the associated
/// [RFC-822](https://tools.ietf.org/html/rfc822) header for a particular
/// criterion is absent, it is treated as the empty string, which collates
/// before non-empty strings.
pub enum SortCriterion<'c> {
    /// Internal date and time of the message. This differs from the
    /// ON criteria in SEARCH, which uses just the internal date.
    Arrival,

    /// IMAP addr-mailbox of the first "cc" address.
    Cc,

    /// Sent date and time, as described in
    /// [section 2.2](https://tools.ietf.org/html/rfc5256#section-2.2).
    Date,

    /// IMAP addr-mailbox of the first "From" address.
    From,

    /// Followed by another sort criterion, has the effect of that
    /// criterion but in reverse (descending) order.
    Reverse(&'c SortCriterion<'c>),

    /// Size of the message in octets.
    Size,

    /// Base subject text.
    Subject,

    /// IMAP addr-mailbox of the first "To" address.
    To,
}

impl<'c> fmt::Display for SortCriterion<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SortCriterion::*;

        match self {
            Arrival => write!(f, "ARRIVAL"),
            Cc => write!(f, "CC"),
            Date => write!(f, "DATE"),
            From => write!(f, "FROM"),
            Reverse(c) => write!(f, "REVERSE {}", c),
            Size => write!(f, "SIZE"),
            Subject => write!(f, "SUBJECT"),
            To => write!(f, "TO"),
        }
    }
}

/// The threading algorithm a `THREAD` command should use. Servers advertise
/// each supported algorithm as a `THREAD=<name>` capability.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThreadAlgorithm {
    /// Threads built by base subject only.
    OrderedSubject,
    /// Threads built from the `References`/`In-Reply-To` headers, falling
    /// back to base subject.
    References,
}

impl fmt::Display for ThreadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ThreadAlgorithm::OrderedSubject => write!(f, "ORDEREDSUBJECT"),
            ThreadAlgorithm::References => write!(f, "REFERENCES"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_to_string() {
        use SortCriterion::*;

        assert_eq!("ARRIVAL", Arrival.to_string());
        assert_eq!("CC", Cc.to_string());
        assert_eq!("DATE", Date.to_string());
        assert_eq!("FROM", From.to_string());
        assert_eq!("SIZE", Size.to_string());
        assert_eq!("SUBJECT", Subject.to_string());
        assert_eq!("TO", To.to_string());
        assert_eq!("REVERSE TO", Reverse(&To).to_string());
        assert_eq!("REVERSE REVERSE TO", Reverse(&Reverse(&To)).to_string());
    }

    #[test]
    fn test_criteria_to_string() {
        use SortCriterion::*;

        assert_eq!("", SortCriteria(&[]).to_string());
        assert_eq!("(ARRIVAL)", SortCriteria(&[Arrival]).to_string());
        assert_eq!(
            "(ARRIVAL REVERSE FROM)",
            SortCriteria(&[Arrival, Reverse(&From)]).to_string()
        );
    }

    #[test]
    fn test_algorithm_to_string() {
        assert_eq!("REFERENCES", ThreadAlgorithm::References.to_string());
        assert_eq!(
            "ORDEREDSUBJECT",
            ThreadAlgorithm::OrderedSubject.to_string()
        );
    }
}
