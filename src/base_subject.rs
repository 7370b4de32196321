//! Subject-line normalization for threading, per [RFC 5256 section
//! 2.1](https://tools.ietf.org/html/rfc5256#section-2.1).
//!
//! The "base subject" is what remains after stripping reply and forward
//! markers, bracketed list tags, and trailing `(fwd)` annotations; messages
//! whose subjects share a base subject belong to the same ORDEREDSUBJECT
//! thread.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // step 1: fold all whitespace runs into a single space
    static ref WHITESPACE: Regex = Regex::new(r"[ \t\r\n]+").unwrap();
    // step 3: subj-trailer, one or more trailing "(fwd)" groups
    static ref TRAILER: Regex = Regex::new(r"(?i)(\s*\(fwd\))+\s*$").unwrap();
    // step 4: subj-leader, optional blobs then a re/fw/fwd marker up to ':'
    static ref LEADER: Regex =
        Regex::new(r"(?i)^\s*(\[[^\[\]]*\]\s*)*(re|fwd?)\s*(\[[^\[\]]*\])?\s*:\s*").unwrap();
    // step 5: a leading subj-blob on its own
    static ref BLOB: Regex = Regex::new(r"^\[[^\[\]]*\]\s*").unwrap();
    // step 6: the whole subject wrapped in "[fwd: ... ]"
    static ref FWD_WRAP: Regex = Regex::new(r"(?i)^\[fwd:\s*(.*)\]\s*$").unwrap();
}

/// Extract the base subject of a message subject header.
pub fn base_subject(subject: &str) -> String {
    let mut s = WHITESPACE.replace_all(subject, " ").trim().to_string();

    loop {
        // strip trailers and leaders until neither applies
        loop {
            let mut changed = false;
            if let Some(m) = TRAILER.find(&s) {
                s.truncate(m.start());
                changed = true;
            }
            if let Some(m) = LEADER.find(&s) {
                s = s[m.end()..].to_string();
                changed = true;
            } else if let Some(m) = BLOB.find(&s) {
                // only drop a bare leading blob if something is left over
                if m.end() < s.len() {
                    s = s[m.end()..].to_string();
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        match FWD_WRAP.captures(&s) {
            Some(caps) => s = caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            None => break,
        }
    }

    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_subject_unchanged() {
        assert_eq!(base_subject("Test"), "Test");
    }

    #[test]
    fn reply_marker() {
        assert_eq!(base_subject("Re: Test"), "Test");
        assert_eq!(base_subject("RE: Test"), "Test");
    }

    #[test]
    fn forward_markers() {
        assert_eq!(base_subject("Fwd: Re: Test (fwd)"), "Test");
        assert_eq!(base_subject("Fw: Test"), "Test");
    }

    #[test]
    fn noisy_leader_and_blob() {
        assert_eq!(base_subject("  re :   [foo]Test(Fwd)"), "Test");
    }

    #[test]
    fn repeated_markers() {
        assert_eq!(base_subject("Re: Re: Re: Test"), "Test");
        assert_eq!(base_subject("Re: [list] Re: Test (fwd) (fwd)"), "Test");
    }

    #[test]
    fn marker_with_blob_between() {
        assert_eq!(base_subject("Re[2]: Test"), "Test");
    }

    #[test]
    fn fwd_wrapping() {
        assert_eq!(base_subject("[fwd: Test]"), "Test");
        assert_eq!(base_subject("[fwd: Re: Test]"), "Test");
    }

    #[test]
    fn blob_only_subject_is_kept() {
        // nothing would remain, so the blob stays
        assert_eq!(base_subject("[foo]"), "[foo]");
    }

    #[test]
    fn whitespace_folding() {
        assert_eq!(base_subject("  Test\t  of \t folding "), "Test of folding");
    }

    #[test]
    fn internal_markers_untouched() {
        assert_eq!(base_subject("Test re: not a marker"), "Test re: not a marker");
    }
}
