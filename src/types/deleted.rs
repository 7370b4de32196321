use super::{Seq, Uid};

/// The message identifiers removed by an `EXPUNGE` (or `UID EXPUNGE`)
/// command.
///
/// A pre-QRESYNC server reports expunges as a series of `EXPUNGE` responses
/// carrying message sequence numbers; with
/// [QRESYNC](https://tools.ietf.org/html/rfc7162#section-3.2.7) enabled it
/// sends a single `VANISHED` response carrying UIDs, along with the
/// mod-sequence of the operation.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Deleted {
    /// The list of messages that were expunged.
    pub messages: DeletedMessages,
    /// The mod sequence of the performed operation, when the `QRESYNC`
    /// extension is enabled.
    pub mod_seq: Option<u64>,
}

/// Which identifier space an expunge was reported in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeletedMessages {
    /// Message sequence numbers given in `EXPUNGE` responses, in server
    /// order. Note the immediate-decrement rule of RFC 3501: each number is
    /// relative to the state after the previous response.
    Expunged(Vec<Seq>),
    /// Message UIDs given in a `VANISHED` response.
    Vanished(Vec<Uid>),
}

impl Deleted {
    pub(crate) fn from_expunged(v: Vec<Seq>, mod_seq: Option<u64>) -> Deleted {
        Deleted {
            messages: DeletedMessages::Expunged(v),
            mod_seq,
        }
    }

    pub(crate) fn from_vanished(v: Vec<Uid>, mod_seq: Option<u64>) -> Deleted {
        Deleted {
            messages: DeletedMessages::Vanished(v),
            mod_seq,
        }
    }

    /// Iterator over the message sequence numbers from `EXPUNGE` responses;
    /// empty if the server reported UIDs instead.
    pub fn seqs(&self) -> impl Iterator<Item = Seq> + '_ {
        match self.messages {
            DeletedMessages::Expunged(ref s) => s.iter(),
            DeletedMessages::Vanished(_) => [].iter(),
        }
        .copied()
    }

    /// Iterator over the UIDs from a `VANISHED` response; empty if the
    /// server reported sequence numbers instead.
    pub fn uids(&self) -> impl Iterator<Item = Uid> + '_ {
        match self.messages {
            DeletedMessages::Expunged(_) => [].iter(),
            DeletedMessages::Vanished(ref s) => s.iter(),
        }
        .copied()
    }

    /// True if nothing was expunged.
    pub fn is_empty(&self) -> bool {
        match self.messages {
            DeletedMessages::Expunged(ref v) => v.is_empty(),
            DeletedMessages::Vanished(ref v) => v.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seqs_only_for_expunged() {
        let d = Deleted::from_expunged(vec![3, 6, 9], None);
        assert_eq!(d.seqs().collect::<Vec<_>>(), vec![3, 6, 9]);
        assert_eq!(d.uids().count(), 0);
        assert!(!d.is_empty());
    }

    #[test]
    fn uids_only_for_vanished() {
        let d = Deleted::from_vanished(vec![405, 407, 410], Some(122));
        assert_eq!(d.uids().collect::<Vec<_>>(), vec![405, 407, 410]);
        assert_eq!(d.seqs().count(), 0);
        assert_eq!(d.mod_seq, Some(122));
    }
}
