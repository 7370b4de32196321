use std::collections::HashMap;

use crate::error::{Error, ParseError, Result};
use crate::tokenize::{Token, Tokenizer};

/// Where one message sits inside a `THREAD` response
/// ([RFC 5256](https://tools.ietf.org/html/rfc5256)).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ThreadNode {
    /// Nesting depth below the top of the thread entry. `0` for a message at
    /// the top of its entry.
    pub level: u32,
    /// The message the whole entry hangs off: the first message of the
    /// containing thread entry. `None` only for entries holding a single
    /// message.
    pub base: Option<u32>,
    /// True if no further sibling follows at this level within the entry.
    pub last: bool,
}

/// The thread graph built from a `THREAD` untagged response, for either the
/// `REFERENCES` or `ORDEREDSUBJECT` algorithm (the response syntax is the
/// same).
///
/// Identifiers are message sequence numbers, or UIDs if the command was
/// `UID THREAD`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Thread {
    // nodes in depth-first walk order
    nodes: Vec<(u32, ThreadNode)>,
    index: HashMap<u32, usize>,
}

enum Item {
    Id(u32),
    Sub(Vec<Item>),
}

impl Thread {
    /// Parse the data following `* THREAD`.
    pub(crate) fn parse(tok: &mut Tokenizer<'_>) -> Result<Thread> {
        let mut thread = Thread::default();
        while let Some(token) = tok.next().map_err(Error::from_tokenize)? {
            match token {
                Token::List(mut entry) => {
                    let items = collect_items(&mut entry)?;
                    let mut base = None;
                    thread.walk(&items, 0, true, &mut base);
                }
                other => {
                    return Err(Error::Parse(ParseError::Unexpected(format!(
                        "thread entry, got {:?}",
                        other
                    ))))
                }
            }
        }
        Ok(thread)
    }

    // Depth-first walk of one entry. `level` counts the messages already
    // seen on the chain above; recursing into a sibling branch keeps the
    // level, each message on a chain increments it. Only the first message
    // of a branch that has following siblings is "not last".
    fn walk(&mut self, items: &[Item], mut level: u32, mut islast: bool, base: &mut Option<u32>) {
        let cnt = items.len().saturating_sub(1);
        for (key, item) in items.iter().enumerate() {
            match item {
                Item::Sub(sub) => {
                    self.walk(sub, if level == 0 { 1 } else { level }, key == cnt, base)
                }
                Item::Id(id) => {
                    if base.is_none() && (level > 0 || cnt > 0) {
                        *base = Some(*id);
                    }
                    self.push(
                        *id,
                        ThreadNode {
                            level,
                            base: *base,
                            last: islast,
                        },
                    );
                    level += 1;
                }
            }
            islast = true;
        }
    }

    fn push(&mut self, id: u32, node: ThreadNode) {
        self.index.insert(id, self.nodes.len());
        self.nodes.push((id, node));
    }

    /// The node for a message, if it appears in the response.
    pub fn get(&self, id: u32) -> Option<&ThreadNode> {
        self.index.get(&id).map(|&i| &self.nodes[i].1)
    }

    /// Every message in the response, in depth-first walk order.
    pub fn message_list(&self) -> Vec<u32> {
        self.nodes.iter().map(|&(id, _)| id).collect()
    }

    /// Every message in the thread entry containing `id`, in walk order.
    /// Empty if `id` is not present.
    pub fn get_thread(&self, id: u32) -> Vec<(u32, ThreadNode)> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        match node.base {
            None => vec![(id, *node)],
            Some(base) => self
                .nodes
                .iter()
                .filter(|(_, n)| n.base == Some(base))
                .copied()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn collect_items(tok: &mut Tokenizer<'_>) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    while let Some(token) = tok.next().map_err(Error::from_tokenize)? {
        match token {
            Token::List(mut sub) => items.push(Item::Sub(collect_items(&mut sub)?)),
            Token::Atom(a) => {
                let id = a.parse::<u32>().map_err(|_| {
                    Error::Parse(ParseError::Unexpected(format!(
                        "message id in thread, got {:?}",
                        a
                    )))
                })?;
                items.push(Item::Id(id));
            }
            other => {
                return Err(Error::Parse(ParseError::Unexpected(format!(
                    "thread member, got {:?}",
                    other
                ))))
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Thread {
        let mut tok = Tokenizer::new(input);
        Thread::parse(&mut tok).unwrap()
    }

    #[test]
    fn single_message_entry() {
        let t = parse(b"(1)");
        assert_eq!(t.len(), 1);
        let node = t.get(1).unwrap();
        assert_eq!(node.level, 0);
        assert_eq!(node.base, None);
        assert!(node.last);
        assert_eq!(t.get_thread(1), vec![(1, *node)]);
    }

    #[test]
    fn simple_chain() {
        // 16 is the parent of 17
        let t = parse(b"(16 17)");
        assert_eq!(t.message_list(), vec![16, 17]);
        assert_eq!(t.get(16).unwrap().level, 0);
        assert_eq!(t.get(16).unwrap().base, Some(16));
        assert!(t.get(16).unwrap().last);
        assert_eq!(t.get(17).unwrap().level, 1);
        assert_eq!(t.get(17).unwrap().base, Some(16));
        assert!(t.get(17).unwrap().last);
    }

    #[test]
    fn full_response() {
        let t = parse(b"((1)(2)(3)(4 (5)(6))(7 8)(9)(10 (11 12)(13 (14 (15)))))(16 17)");
        assert_eq!(t.len(), 17);
        assert_eq!(
            t.message_list(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]
        );

        // the whole first entry hangs off message 1
        let sub = t.get_thread(10);
        assert_eq!(sub.len(), 15);
        assert!(sub.iter().all(|(_, n)| n.base == Some(1)));

        for id in [1, 2, 3, 4, 5, 7, 9, 11] {
            assert!(!t.get(id).unwrap().last, "message {} should not be last", id);
        }
        for id in [6, 8, 10, 12, 13, 14, 15] {
            assert!(t.get(id).unwrap().last, "message {} should be last", id);
        }

        // chains grow one level per message, branches share their parent's
        assert_eq!(t.get(10).unwrap().level, 1);
        assert_eq!(t.get(11).unwrap().level, 2);
        assert_eq!(t.get(12).unwrap().level, 3);
        assert_eq!(t.get(14).unwrap().level, 3);
        assert_eq!(t.get(15).unwrap().level, 4);

        // the second entry is independent
        assert_eq!(t.get_thread(16).len(), 2);
        assert_eq!(t.get(16).unwrap().base, Some(16));
    }

    #[test]
    fn absent_id_yields_empty_thread() {
        let t = parse(b"(1)(2 3)");
        assert!(t.get_thread(99).is_empty());
    }

    #[test]
    fn rejects_non_numeric_members() {
        let mut tok = Tokenizer::new(b"(a b)");
        assert!(Thread::parse(&mut tok).is_err());
    }
}
