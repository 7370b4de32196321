//! Typed builder for the `FETCH` data-item list.
//!
//! A [`FetchQuery`] accumulates the message data items to request and
//! serializes them as the parenthesized list of a `FETCH` command, in
//! insertion order. Items that need an extension (`MODSEQ`, `CHANGEDSINCE`)
//! are gated on the server's capability set the same way search criteria
//! are.

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::types::Capabilities;

#[derive(Clone, Debug, Eq, PartialEq)]
enum FetchItem {
    Flags,
    Uid,
    InternalDate,
    Size,
    Envelope,
    BodyStructure,
    /// `BODY[]` — the full message.
    FullText { peek: bool },
    /// `BODY[HEADER]`.
    HeaderText { peek: bool },
    /// `BODY[TEXT]`.
    BodyText { peek: bool },
    /// `BODY[<section>]`, optionally a partial `<start.length>` range.
    BodyPart {
        section: String,
        peek: bool,
        partial: Option<(u32, u32)>,
    },
    ModSeq,
}

impl FetchItem {
    fn render(&self, out: &mut String) {
        fn body(out: &mut String, peek: bool, section: &str) {
            out.push_str(if peek { "BODY.PEEK[" } else { "BODY[" });
            out.push_str(section);
            out.push(']');
        }
        match *self {
            FetchItem::Flags => out.push_str("FLAGS"),
            FetchItem::Uid => out.push_str("UID"),
            FetchItem::InternalDate => out.push_str("INTERNALDATE"),
            FetchItem::Size => out.push_str("RFC822.SIZE"),
            FetchItem::Envelope => out.push_str("ENVELOPE"),
            FetchItem::BodyStructure => out.push_str("BODYSTRUCTURE"),
            FetchItem::FullText { peek } => body(out, peek, ""),
            FetchItem::HeaderText { peek } => body(out, peek, "HEADER"),
            FetchItem::BodyText { peek } => body(out, peek, "TEXT"),
            FetchItem::BodyPart {
                ref section,
                peek,
                partial,
            } => {
                body(out, peek, section);
                if let Some((start, len)) = partial {
                    let _ = write!(out, "<{}.{}>", start, len);
                }
            }
            FetchItem::ModSeq => out.push_str("MODSEQ"),
        }
    }
}

/// A composable `FETCH` data-item list.
#[derive(Clone, Debug, Default)]
pub struct FetchQuery {
    items: Vec<FetchItem>,
    changed_since: Option<u64>,
}

impl FetchQuery {
    pub fn new() -> FetchQuery {
        FetchQuery::default()
    }

    fn add(&mut self, item: FetchItem) -> &mut Self {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
        self
    }

    /// Request the message's flags.
    pub fn flags(&mut self) -> &mut Self {
        self.add(FetchItem::Flags)
    }

    /// Request the message's UID.
    pub fn uid(&mut self) -> &mut Self {
        self.add(FetchItem::Uid)
    }

    /// Request the server's internal (arrival) date.
    pub fn internal_date(&mut self) -> &mut Self {
        self.add(FetchItem::InternalDate)
    }

    /// Request the message's `RFC822.SIZE`.
    pub fn size(&mut self) -> &mut Self {
        self.add(FetchItem::Size)
    }

    /// Request the message's envelope structure.
    pub fn envelope(&mut self) -> &mut Self {
        self.add(FetchItem::Envelope)
    }

    /// Request the message's body structure.
    pub fn body_structure(&mut self) -> &mut Self {
        self.add(FetchItem::BodyStructure)
    }

    /// Request the entire message. With `peek`, does not set `\Seen`.
    pub fn full_text(&mut self, peek: bool) -> &mut Self {
        self.add(FetchItem::FullText { peek })
    }

    /// Request the message's header block.
    pub fn header_text(&mut self, peek: bool) -> &mut Self {
        self.add(FetchItem::HeaderText { peek })
    }

    /// Request the message's body text.
    pub fn body_text(&mut self, peek: bool) -> &mut Self {
        self.add(FetchItem::BodyText { peek })
    }

    /// Request an arbitrary body section, e.g. `1.2` or
    /// `HEADER.FIELDS (DATE FROM)`, optionally limited to a
    /// `<start.length>` octet range to bound transfer size.
    pub fn body_part(&mut self, section: &str, peek: bool, partial: Option<(u32, u32)>) -> &mut Self {
        self.add(FetchItem::BodyPart {
            section: section.to_string(),
            peek,
            partial,
        })
    }

    /// Request the message's mod-sequence (CONDSTORE, RFC 7162).
    pub fn modseq(&mut self) -> &mut Self {
        self.add(FetchItem::ModSeq)
    }

    /// Only return messages modified since the given mod-sequence
    /// (CONDSTORE, RFC 7162).
    pub fn changed_since(&mut self, modseq: u64) -> &mut Self {
        self.changed_since = Some(modseq);
        self
    }

    /// Serialize against a server capability set. `None` assumes every
    /// extension is available.
    pub fn build(&self, caps: Option<&Capabilities>) -> Result<String> {
        let needs_condstore =
            self.changed_since.is_some() || self.items.contains(&FetchItem::ModSeq);
        if needs_condstore && caps.is_some_and(|c| !c.has("CONDSTORE")) {
            return Err(Error::NoSupport("CONDSTORE".to_string()));
        }

        let mut items = String::from("(");
        let mut first = true;
        for item in &self.items {
            if !first {
                items.push(' ');
            }
            first = false;
            item.render(&mut items);
        }
        if first {
            // an empty query still has to fetch something
            items.push_str("FLAGS");
        }
        items.push(')');

        if let Some(modseq) = self.changed_since {
            let _ = write!(items, " (CHANGEDSINCE {})", modseq);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_kept() {
        let mut q = FetchQuery::new();
        q.flags().uid().size();
        assert_eq!(q.build(None).unwrap(), "(FLAGS UID RFC822.SIZE)");
    }

    #[test]
    fn duplicates_dropped() {
        let mut q = FetchQuery::new();
        q.uid().flags().uid();
        assert_eq!(q.build(None).unwrap(), "(UID FLAGS)");
    }

    #[test]
    fn body_sections() {
        let mut q = FetchQuery::new();
        q.full_text(false).header_text(true).body_text(false);
        assert_eq!(
            q.build(None).unwrap(),
            "(BODY[] BODY.PEEK[HEADER] BODY[TEXT])"
        );
    }

    #[test]
    fn body_part_with_partial() {
        let mut q = FetchQuery::new();
        q.body_part("1.2", true, Some((0, 2048)));
        assert_eq!(q.build(None).unwrap(), "(BODY.PEEK[1.2]<0.2048>)");
    }

    #[test]
    fn empty_query_fetches_flags() {
        assert_eq!(FetchQuery::new().build(None).unwrap(), "(FLAGS)");
    }

    #[test]
    fn changed_since_modifier() {
        let mut q = FetchQuery::new();
        q.uid().flags().modseq().changed_since(620162338);
        assert_eq!(
            q.build(None).unwrap(),
            "(UID FLAGS MODSEQ) (CHANGEDSINCE 620162338)"
        );
    }

    #[test]
    fn condstore_gated() {
        let mut q = FetchQuery::new();
        q.flags().changed_since(1);
        let caps = Capabilities::from_names(["IMAP4rev1"]);
        assert!(matches!(
            q.build(Some(&caps)),
            Err(Error::NoSupport(ref e)) if e == "CONDSTORE"
        ));

        let caps = Capabilities::from_names(["IMAP4rev1", "CONDSTORE"]);
        assert_eq!(q.build(Some(&caps)).unwrap(), "(FLAGS) (CHANGEDSINCE 1)");
    }
}
