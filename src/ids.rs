//! Message identifier collections.
//!
//! [`Ids`] is an ordered set of message identifiers (UIDs, or message
//! sequence numbers when the `sequence` flag is set) with the
//! range-compressed wire syntax of [RFC 3501 section
//! 9](https://tools.ietf.org/html/rfc3501#section-9) (`2,4:7,9`). [`IdsMap`]
//! associates sequence numbers with UIDs for the currently selected mailbox
//! and keeps that association consistent while expunges shift sequence
//! numbers underneath it.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, ParseError, Result};
use crate::types::{Seq, Uid};

/// An ordered collection of unique message identifiers.
///
/// Identifiers are UIDs unless [`Ids::sequence`] is set, in which case they
/// are message sequence numbers. A reserved "all messages" value (the `*`
/// wildcard, constructed with [`Ids::all`]) stands in for every message in
/// the mailbox and holds no concrete numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ids {
    ids: Vec<u32>,
    all: bool,
    /// True if these are message sequence numbers rather than UIDs.
    pub sequence: bool,
    /// Allow duplicate values in [`Ids::add`]. Only meaningful transiently,
    /// e.g. while collecting per-message expunge positions; parsing and
    /// serialization always deduplicate.
    pub duplicates: bool,
}

impl Ids {
    /// An empty identifier list.
    pub fn new(sequence: bool) -> Ids {
        Ids {
            ids: Vec::new(),
            all: false,
            sequence,
            duplicates: false,
        }
    }

    /// The reserved "all messages" (`*`) list.
    pub fn all(sequence: bool) -> Ids {
        Ids {
            ids: Vec::new(),
            all: true,
            sequence,
            duplicates: false,
        }
    }

    /// Build from explicit identifiers, preserving first-seen order and
    /// dropping duplicates.
    pub fn from_iter<I: IntoIterator<Item = u32>>(iter: I, sequence: bool) -> Ids {
        let mut ids = Ids::new(sequence);
        ids.add(iter);
        ids
    }

    /// Parse the IMAP sequence-set syntax: comma-separated single numbers
    /// and `low:high` ranges (either order). Overlapping segments are
    /// deduplicated; `10:10` collapses to the single value 10.
    pub fn from_set(set: &str, sequence: bool) -> Result<Ids> {
        let mut ids = Ids::new(sequence);
        for part in set.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once(':') {
                Some((a, b)) => {
                    let a = parse_id(a)?;
                    let b = parse_id(b)?;
                    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                    ids.add(lo..=hi);
                }
                None => ids.add(Some(parse_id(part)?)),
            }
        }
        Ok(ids)
    }

    /// True if this is the `*` wildcard list.
    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.ids.is_empty()
    }

    /// Number of concrete identifiers. The wildcard list has no count.
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Append identifiers, keeping first-seen order. Duplicates are dropped
    /// unless [`Ids::duplicates`] is set.
    pub fn add<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for id in iter {
            if self.duplicates || !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Remove the given identifiers.
    pub fn remove<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        let gone: HashSet<u32> = iter.into_iter().collect();
        self.ids.retain(|id| !gone.contains(id));
    }

    /// Iterate the identifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    /// The identifiers in ascending order.
    pub fn sorted(&self) -> Vec<u32> {
        let mut v = self.ids.clone();
        v.sort_unstable();
        v
    }
}

fn parse_id(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| Error::Parse(ParseError::Invalid(s.as_bytes().to_vec())))
}

impl fmt::Display for Ids {
    /// Minimal range-compressed sequence-set form: consecutive runs collapse
    /// to `low:high`, output is ascending regardless of insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all {
            return f.write_str("1:*");
        }
        let sorted = self.sorted();
        let mut first = true;
        let mut i = 0;
        while i < sorted.len() {
            let lo = sorted[i];
            let mut hi = lo;
            while i + 1 < sorted.len() && sorted[i + 1] == hi + 1 {
                i += 1;
                hi = sorted[i];
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if lo == hi {
                write!(f, "{}", lo)?;
            } else {
                write!(f, "{}:{}", lo, hi)?;
            }
            i += 1;
        }
        Ok(())
    }
}

impl From<Vec<u32>> for Ids {
    /// UID-mode list from explicit values.
    fn from(v: Vec<u32>) -> Ids {
        Ids::from_iter(v, false)
    }
}

/// An ordered association between message sequence numbers and UIDs for one
/// mailbox incarnation. Insertion order is sequence order; both keys and
/// values are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdsMap {
    map: Vec<(Seq, Uid)>,
}

impl IdsMap {
    pub fn new() -> IdsMap {
        IdsMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Iterate `(sequence number, UID)` pairs in map order.
    pub fn iter(&self) -> impl Iterator<Item = (Seq, Uid)> + '_ {
        self.map.iter().copied()
    }

    /// The UID at the given sequence number, if tracked.
    pub fn uid(&self, seq: Seq) -> Option<Uid> {
        self.map.iter().find(|&&(s, _)| s == seq).map(|&(_, u)| u)
    }

    /// The sequence number of the given UID, if tracked.
    pub fn seq(&self, uid: Uid) -> Option<Seq> {
        self.map.iter().find(|&&(_, u)| u == uid).map(|&(s, _)| s)
    }

    /// Insert or overwrite associations. A pair whose sequence number is
    /// already present is removed and re-appended, so after one `update`
    /// call the untouched entries keep their relative order and the touched
    /// ones sit at the end in the order given.
    pub fn update<I: IntoIterator<Item = (Seq, Uid)>>(&mut self, pairs: I) {
        for (seq, uid) in pairs {
            self.map.retain(|&(s, _)| s != seq);
            self.map.push((seq, uid));
        }
    }

    /// The subset of the map matching `ids`, in map order. Sequence-mode ids
    /// match keys; UID-mode ids match values.
    pub fn lookup(&self, ids: &Ids) -> IdsMap {
        let map = self
            .map
            .iter()
            .filter(|&&(seq, uid)| {
                ids.is_all() || ids.contains(if ids.sequence { seq } else { uid })
            })
            .copied()
            .collect();
        IdsMap { map }
    }

    /// Remove entries and renumber what remains.
    ///
    /// Removing a message shifts every later sequence number down by one, so
    /// after deletion each surviving key is decremented by the number of
    /// removed positions below it. UID-mode ids remove the entries holding
    /// those UIDs; sequence-mode ids remove by position and may name
    /// positions this map does not track, which still shift the later keys.
    pub fn remove(&mut self, ids: &Ids) {
        if ids.is_all() {
            self.map.clear();
            return;
        }

        // resolve to the set of removed sequence positions
        let mut removed: Vec<Seq> = if ids.sequence {
            ids.iter().collect()
        } else {
            self.map
                .iter()
                .filter(|&&(_, uid)| ids.contains(uid))
                .map(|&(seq, _)| seq)
                .collect()
        };
        removed.sort_unstable();
        removed.dedup();
        if removed.is_empty() {
            return;
        }

        let contiguous = removed[removed.len() - 1] - removed[0] + 1 == removed.len() as u32;
        if contiguous {
            self.remove_contiguous(removed[0], removed[removed.len() - 1]);
        } else {
            self.remove_scattered(&removed);
        }
    }

    // One contiguous run [lo, hi]: a single comparison per entry.
    fn remove_contiguous(&mut self, lo: Seq, hi: Seq) {
        let shift = hi - lo + 1;
        self.map.retain(|&(seq, _)| seq < lo || seq > hi);
        for entry in &mut self.map {
            if entry.0 > hi {
                entry.0 -= shift;
            }
        }
    }

    // General case: each surviving key drops by the count of removed
    // positions below it.
    fn remove_scattered(&mut self, removed: &[Seq]) {
        self.map.retain(|&(seq, _)| removed.binary_search(&seq).is_err());
        for entry in &mut self.map {
            let below = removed.partition_point(|&r| r < entry.0) as u32;
            entry.0 -= below;
        }
    }
}

impl FromIterator<(Seq, Uid)> for IdsMap {
    fn from_iter<I: IntoIterator<Item = (Seq, Uid)>>(iter: I) -> IdsMap {
        let mut map = IdsMap::new();
        map.update(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_round_trip() {
        let ids = Ids::from_iter([4, 1, 2, 3, 10], false);
        assert_eq!(ids.to_string(), "1:4,10");
        let back = Ids::from_set("1:4,10", false).unwrap();
        assert_eq!(back.sorted(), vec![1, 2, 3, 4, 10]);
    }

    #[test]
    fn degenerate_range() {
        let ids = Ids::from_set("10:10", false).unwrap();
        assert_eq!(ids.count(), 1);
        assert!(ids.contains(10));
        assert_eq!(ids.to_string(), "10");
    }

    #[test]
    fn overlapping_ranges_dedup() {
        let ids = Ids::from_set("10:12,10,11,12,10:12", false).unwrap();
        assert_eq!(ids.count(), 3);
        assert_eq!(ids.sorted(), vec![10, 11, 12]);
    }

    #[test]
    fn descending_range() {
        let ids = Ids::from_set("7:4", false).unwrap();
        assert_eq!(ids.sorted(), vec![4, 5, 6, 7]);
        assert_eq!(ids.to_string(), "4:7");
    }

    #[test]
    fn wildcard() {
        let ids = Ids::all(false);
        assert!(ids.is_all());
        assert!(ids.is_empty());
        assert_eq!(ids.to_string(), "1:*");
    }

    #[test]
    fn two_element_runs_compress() {
        let ids = Ids::from_iter([1, 2, 5], false);
        assert_eq!(ids.to_string(), "1:2,5");
    }

    #[test]
    fn add_respects_duplicates_flag() {
        let mut ids = Ids::new(true);
        ids.add([5, 5, 6]);
        assert_eq!(ids.count(), 2);

        let mut dups = Ids::new(true);
        dups.duplicates = true;
        dups.add([5, 5, 6]);
        assert_eq!(dups.count(), 3);
    }

    #[test]
    fn invalid_set() {
        assert!(Ids::from_set("1,x", false).is_err());
        assert!(Ids::from_set("1:b", true).is_err());
    }

    fn fixture() -> IdsMap {
        [(2, 5), (4, 10), (6, 15), (8, 20), (10, 25), (12, 30)]
            .into_iter()
            .collect()
    }

    #[test]
    fn map_remove_by_uid_renumbers() {
        let mut map = fixture();
        map.remove(&Ids::from_set("10", false).unwrap());
        let want: Vec<(u32, u32)> = vec![(2, 5), (5, 15), (7, 20), (9, 25), (11, 30)];
        assert_eq!(map.iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn map_remove_by_seq_renumbers() {
        let mut map = fixture();
        // position 4 holds uid 10; removing by sequence number is equivalent
        map.remove(&Ids::from_set("4", true).unwrap());
        let want: Vec<(u32, u32)> = vec![(2, 5), (5, 15), (7, 20), (9, 25), (11, 30)];
        assert_eq!(map.iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn map_remove_untracked_position_still_shifts() {
        let mut map = fixture();
        map.remove(&Ids::from_set("5", true).unwrap());
        let want: Vec<(u32, u32)> = vec![(2, 5), (4, 10), (5, 15), (7, 20), (9, 25), (11, 30)];
        assert_eq!(map.iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn map_remove_scattered_matches_manual() {
        let mut map = fixture();
        map.remove(&Ids::from_set("2,8,12", true).unwrap());
        let want: Vec<(u32, u32)> = vec![(3, 10), (5, 15), (8, 25)];
        assert_eq!(map.iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn map_remove_duplicate_positions_decrement_once() {
        let mut base = fixture();
        let mut ids = Ids::new(true);
        ids.duplicates = true;
        ids.add([4, 4, 4]);
        base.remove(&ids);

        let mut once = fixture();
        once.remove(&Ids::from_set("4", true).unwrap());
        assert_eq!(base, once);
    }

    #[test]
    fn map_update_moves_touched_keys_to_end() {
        let mut map: IdsMap = [(1, 100), (2, 200), (3, 300)].into_iter().collect();
        map.update([(2, 201), (1, 101)]);
        let want: Vec<(u32, u32)> = vec![(3, 300), (2, 201), (1, 101)];
        assert_eq!(map.iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn map_lookup_both_modes() {
        let map = fixture();
        let by_uid = map.lookup(&Ids::from_set("15,25", false).unwrap());
        assert_eq!(by_uid.iter().collect::<Vec<_>>(), vec![(6, 15), (10, 25)]);

        let by_seq = map.lookup(&Ids::from_set("2,12", true).unwrap());
        assert_eq!(by_seq.iter().collect::<Vec<_>>(), vec![(2, 5), (12, 30)]);

        let everything = map.lookup(&Ids::all(false));
        assert_eq!(everything.len(), map.len());
    }

    #[test]
    fn map_remove_all_clears() {
        let mut map = fixture();
        map.remove(&Ids::all(true));
        assert!(map.is_empty());
    }
}
