//! Abstraction of the IMAP4rev1 search criteria (see [RFC 3501 section
//! 6.4.4](https://tools.ietf.org/html/rfc3501#section-6.4.4)).
//!
//! A [`SearchQuery`] accumulates typed predicates and serializes them to an
//! IMAP `SEARCH` string. Serialization is capability-aware: predicates that
//! need an extension (`MODSEQ` → CONDSTORE, `$` → SEARCHRES, fuzzy matching
//! → SEARCH=FUZZY) fail the build when the server does not advertise it,
//! while `OLDER`/`YOUNGER` fall back to day-granular `BEFORE`/`SINCE` terms
//! on servers without WITHIN.

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::format::Element;
use crate::ids::Ids;
use crate::types::Capabilities;

/// Comparison range for [`SearchQuery::date_search`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DateRange {
    Before,
    On,
    Since,
}

impl DateRange {
    fn as_str(self) -> &'static str {
        match self {
            DateRange::Before => "BEFORE",
            DateRange::On => "ON",
            DateRange::Since => "SINCE",
        }
    }
}

/// Direction for [`SearchQuery::interval_search`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interval {
    Older,
    Younger,
}

impl Interval {
    fn as_str(self) -> &'static str {
        match self {
            Interval::Older => "OLDER",
            Interval::Younger => "YOUNGER",
        }
    }
}

/// Which mod-sequence metadata entry a [`SearchQuery::modseq`] search names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModSeqType {
    Shared,
    Priv,
    All,
}

impl ModSeqType {
    fn as_str(self) -> &'static str {
        match self {
            ModSeqType::Shared => "shared",
            ModSeqType::Priv => "priv",
            ModSeqType::All => "all",
        }
    }
}

#[derive(Clone, Debug)]
struct FlagTerm {
    name: String,
    set: bool,
    keyword: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct HeaderTerm {
    header: String,
    text: String,
    not: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct TextTerm {
    text: String,
    body_only: bool,
    not: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct SizeTerm {
    larger: bool,
    size: u64,
    not: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct DateTerm {
    date: NaiveDate,
    range: DateRange,
    header: bool,
    not: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct WithinTerm {
    range: Interval,
    seconds: u64,
    not: bool,
    fuzzy: bool,
}

#[derive(Clone, Debug)]
struct ModSeqTerm {
    value: u64,
    name: Option<String>,
    entry_type: ModSeqType,
    not: bool,
    fuzzy: bool,
}

/// The result of [`SearchQuery::build`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltSearch {
    /// The search criteria string, ready to follow `SEARCH `.
    pub query: String,
    /// The charset of the text terms; `None` when the query carries no text.
    pub charset: Option<String>,
    /// The extensions the serialized query relies on.
    pub exts_used: Vec<&'static str>,
}

/// A composable IMAP search query.
///
/// Predicates serialize in insertion-group order matching the original
/// protocol grammar; an empty query builds to `ALL`.
#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    charset: Option<String>,
    new_msgs: Option<bool>,
    new_fuzzy: bool,
    flags: Vec<FlagTerm>,
    headers: Vec<HeaderTerm>,
    texts: Vec<TextTerm>,
    sizes: Vec<SizeTerm>,
    ids_term: Option<(Ids, bool, bool)>,
    dates: Vec<DateTerm>,
    within: Vec<WithinTerm>,
    modseq: Option<ModSeqTerm>,
    prevsearch: Option<bool>,
    prevsearch_fuzzy: bool,
    and: Vec<SearchQuery>,
    or: Vec<SearchQuery>,
}

/// The system flags of RFC 3501 [2.3.2]; everything else is a keyword.
const SYSTEM_FLAGS: [&str; 6] = ["ANSWERED", "DELETED", "DRAFT", "FLAGGED", "RECENT", "SEEN"];

impl SearchQuery {
    pub fn new() -> SearchQuery {
        SearchQuery::default()
    }

    /// Set the charset of the search text. The default is `US-ASCII`, which
    /// is omitted from the serialized command.
    pub fn charset(&mut self, charset: &str) -> &mut Self {
        self.charset = Some(charset.to_ascii_uppercase());
        self
    }

    /// Search for either new messages (`\Recent` but not `\Seen`) or old
    /// messages. Searching new messages clears any `RECENT`/`UNSEEN` flag
    /// criteria; searching old clears `RECENT`.
    pub fn new_msgs(&mut self, newmsgs: bool, fuzzy: bool) -> &mut Self {
        self.new_msgs = Some(newmsgs);
        self.new_fuzzy = fuzzy;
        self
    }

    /// Search for a flag or keyword. With `set` false, searches for messages
    /// that do *not* have it.
    pub fn flag(&mut self, name: &str, set: bool, fuzzy: bool) -> &mut Self {
        let name = name.trim_start_matches('\\').to_ascii_uppercase();
        let keyword = !SYSTEM_FLAGS.contains(&name.as_str());
        let term = FlagTerm {
            name: name.clone(),
            set,
            keyword,
            fuzzy,
        };
        // one criterion per flag name; a repeat overwrites in place
        match self.flags.iter_mut().find(|t| t.name == name) {
            Some(existing) => *existing = term,
            None => self.flags.push(term),
        }
        self
    }

    /// Search for text in a message header.
    pub fn header_text(&mut self, header: &str, text: &str, not: bool, fuzzy: bool) -> &mut Self {
        self.headers.push(HeaderTerm {
            header: header.to_ascii_uppercase(),
            text: text.to_string(),
            not,
            fuzzy,
        });
        self
    }

    /// Search for text in the body (`body_only`) or the entire message.
    pub fn text(&mut self, text: &str, body_only: bool, not: bool, fuzzy: bool) -> &mut Self {
        self.texts.push(TextTerm {
            text: text.to_string(),
            body_only,
            not,
            fuzzy,
        });
        self
    }

    /// Search for messages larger (or smaller) than `size` bytes. Only one
    /// criterion per direction; a repeat overwrites.
    pub fn size(&mut self, size: u64, larger: bool, not: bool, fuzzy: bool) -> &mut Self {
        let term = SizeTerm {
            larger,
            size,
            not,
            fuzzy,
        };
        match self.sizes.iter_mut().find(|t| t.larger == larger) {
            Some(existing) => *existing = term,
            None => self.sizes.push(term),
        }
        self
    }

    /// Search within a message identifier set. Only one set per query.
    pub fn ids(&mut self, ids: Ids, not: bool, fuzzy: bool) -> &mut Self {
        self.ids_term = Some((ids, not, fuzzy));
        self
    }

    /// Search by date. With `header` true the sent date from the message
    /// headers is used (`SENTBEFORE`/`SENTON`/`SENTSINCE`); otherwise the
    /// internal (arrival) date.
    pub fn date_search(
        &mut self,
        date: NaiveDate,
        range: DateRange,
        header: bool,
        not: bool,
        fuzzy: bool,
    ) -> &mut Self {
        self.dates.push(DateTerm {
            date,
            range,
            header,
            not,
            fuzzy,
        });
        self
    }

    /// Search for messages within `seconds` of the present. Uses the WITHIN
    /// extension (RFC 5032) when available, and otherwise falls back to
    /// day-granular `BEFORE`/`SINCE` terms. Only one criterion per
    /// direction.
    pub fn interval_search(
        &mut self,
        seconds: u64,
        range: Interval,
        not: bool,
        fuzzy: bool,
    ) -> &mut Self {
        let term = WithinTerm {
            range,
            seconds,
            not,
            fuzzy,
        };
        match self.within.iter_mut().find(|t| t.range == range) {
            Some(existing) => *existing = term,
            None => self.within.push(term),
        }
        self
    }

    /// Search for messages modified since a mod-sequence value. The server
    /// must advertise CONDSTORE (RFC 7162).
    pub fn modseq(
        &mut self,
        value: u64,
        name: Option<&str>,
        entry_type: ModSeqType,
        not: bool,
        fuzzy: bool,
    ) -> &mut Self {
        self.modseq = Some(ModSeqTerm {
            value,
            name: name.map(str::to_string),
            entry_type,
            not,
            fuzzy,
        });
        self
    }

    /// Use the result of the previous `SEARCH` (the `$` marker of RFC 5182).
    /// The server must advertise SEARCHRES.
    ///
    /// The rendered polarity follows the source this engine was derived
    /// from: `previous_search(false)` emits `NOT $`, `previous_search(true)`
    /// emits `$`.
    pub fn previous_search(&mut self, not: bool, fuzzy: bool) -> &mut Self {
        self.prevsearch = Some(not);
        self.prevsearch_fuzzy = fuzzy;
        self
    }

    /// AND further queries into this one: each query's serialized terms are
    /// appended to this query's own.
    pub fn and_search<I: IntoIterator<Item = SearchQuery>>(&mut self, queries: I) -> &mut Self {
        self.and.extend(queries);
        self
    }

    /// OR further queries with this one. Multiple queries nest
    /// right-associatively: the binary `OR` key is chained, with the last
    /// query pushed to the front.
    pub fn or_search<I: IntoIterator<Item = SearchQuery>>(&mut self, queries: I) -> &mut Self {
        self.or.extend(queries);
        self
    }

    /// True if the query involves flag criteria.
    pub fn flag_search(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Serialize against a server capability set. `None` assumes every
    /// extension is available.
    pub fn build(&self, caps: Option<&Capabilities>) -> Result<BuiltSearch> {
        let mut out = Builder {
            caps,
            terms: Vec::new(),
            exts_used: Vec::new(),
            text_seen: false,
        };
        self.build_into(&mut out)?;
        if out.terms.is_empty() {
            out.terms.push("ALL".to_string());
        }
        let charset = if out.text_seen {
            Some(self.charset.clone().unwrap_or_else(|| "US-ASCII".to_string()))
        } else {
            None
        };
        Ok(BuiltSearch {
            query: out.terms.join(" "),
            charset,
            exts_used: out.exts_used,
        })
    }

    fn build_into(&self, out: &mut Builder<'_>) -> Result<()> {
        let mut skip_flags: Vec<&str> = Vec::new();

        if let Some(new) = self.new_msgs {
            out.fuzzy(self.new_fuzzy)?;
            if new {
                out.push("NEW");
                skip_flags.push("UNSEEN");
            } else {
                out.push("OLD");
            }
            skip_flags.push("RECENT");
        }

        for term in self.flags.iter().filter(|t| !skip_flags.contains(&t.name.as_str())) {
            out.fuzzy(term.fuzzy)?;
            let mut prefix = "";
            if !term.set {
                // all system flags but \Recent have an UN equivalent
                if term.name == "RECENT" {
                    out.push("NOT");
                } else {
                    prefix = "UN";
                }
            }
            if term.keyword {
                out.push_owned(format!("{}KEYWORD", prefix));
                out.push_owned(Element::Atom(term.name.clone()).escape());
            } else {
                out.push_owned(format!("{}{}", prefix, term.name));
            }
        }

        for term in &self.headers {
            out.fuzzy(term.fuzzy)?;
            if term.not {
                out.push("NOT");
            }
            // headers with their own search key skip the HEADER prefix
            if ["BCC", "CC", "FROM", "SUBJECT", "TO"].contains(&term.header.as_str()) {
                out.push_owned(term.header.clone());
            } else {
                out.push("HEADER");
                out.push_owned(Element::Astring(term.header.clone()).escape());
            }
            out.push_owned(Element::Astring(term.text.clone()).escape());
            out.text_seen = true;
        }

        for term in &self.texts {
            out.fuzzy(term.fuzzy)?;
            if term.not {
                out.push("NOT");
            }
            out.push(if term.body_only { "BODY" } else { "TEXT" });
            out.push_owned(Element::Astring(term.text.clone()).escape());
            out.text_seen = true;
        }

        for term in &self.sizes {
            out.fuzzy(term.fuzzy)?;
            if term.not {
                out.push("NOT");
            }
            out.push(if term.larger { "LARGER" } else { "SMALLER" });
            out.push_owned(term.size.to_string());
        }

        if let Some((ref ids, not, fuzzy)) = self.ids_term {
            if !ids.is_empty() || ids.is_all() {
                out.fuzzy(fuzzy)?;
                if not {
                    out.push("NOT");
                }
                if !ids.sequence {
                    out.push("UID");
                }
                out.push_owned(ids.to_string());
            }
        }

        for term in &self.dates {
            out.fuzzy(term.fuzzy)?;
            if term.not {
                out.push("NOT");
            }
            if term.header {
                out.push_owned(format!("SENT{}", term.range.as_str()));
            } else {
                out.push(term.range.as_str());
            }
            out.push_owned(term.date.format("%d-%b-%Y").to_string());
        }

        if !self.within.is_empty() {
            let have_within = out.caps.map_or(true, |c| c.has("WITHIN"));
            if have_within {
                out.ext("WITHIN");
            }
            for term in &self.within {
                out.fuzzy(term.fuzzy)?;
                if term.not {
                    out.push("NOT");
                }
                if have_within {
                    out.push(term.range.as_str());
                    out.push_owned(term.seconds.to_string());
                } else {
                    // only day-accurate without the extension
                    let date = (Utc::now() - chrono::Duration::seconds(term.seconds as i64))
                        .date_naive();
                    out.push(match term.range {
                        Interval::Older => DateRange::Before.as_str(),
                        Interval::Younger => DateRange::Since.as_str(),
                    });
                    out.push_owned(date.format("%d-%b-%Y").to_string());
                }
            }
        }

        if let Some(ref term) = self.modseq {
            if out.caps.is_some_and(|c| !c.has("CONDSTORE")) {
                return Err(Error::NoSupport("CONDSTORE".to_string()));
            }
            out.ext("CONDSTORE");
            out.fuzzy(term.fuzzy)?;
            if term.not {
                out.push("NOT");
            }
            out.push("MODSEQ");
            if let Some(ref name) = term.name {
                out.push_owned(Element::String(name.clone()).escape());
                out.push(term.entry_type.as_str());
            }
            out.push_owned(term.value.to_string());
        }

        if let Some(prevsearch) = self.prevsearch {
            if out.caps.is_some_and(|c| !c.has("SEARCHRES")) {
                return Err(Error::NoSupport("SEARCHRES".to_string()));
            }
            out.ext("SEARCHRES");
            out.fuzzy(self.prevsearch_fuzzy)?;
            if !prevsearch {
                out.push("NOT");
            }
            out.push("$");
        }

        for sub in &self.and {
            let built = Builder::child(out, sub)?;
            out.terms.extend(built);
        }

        for sub in &self.or {
            let built = Builder::child(out, sub)?;
            let wrapped = format!("({})", built.join(" "));
            if out.terms.is_empty() {
                out.terms.push(wrapped);
            } else {
                let mut rebuilt = vec!["OR".to_string(), wrapped];
                rebuilt.append(&mut out.terms);
                out.terms = rebuilt;
            }
        }

        Ok(())
    }
}

struct Builder<'a> {
    caps: Option<&'a Capabilities>,
    terms: Vec<String>,
    exts_used: Vec<&'static str>,
    text_seen: bool,
}

impl<'a> Builder<'a> {
    fn push(&mut self, term: &str) {
        self.terms.push(term.to_string());
    }

    fn push_owned(&mut self, term: String) {
        self.terms.push(term);
    }

    fn ext(&mut self, name: &'static str) {
        if !self.exts_used.contains(&name) {
            self.exts_used.push(name);
        }
    }

    fn fuzzy(&mut self, fuzzy: bool) -> Result<()> {
        if fuzzy {
            if self.caps.is_some_and(|c| !c.has_param("SEARCH", "FUZZY")) {
                return Err(Error::NoSupport("SEARCH=FUZZY".to_string()));
            }
            self.ext("SEARCH=FUZZY");
            self.push("FUZZY");
        }
        Ok(())
    }

    // Build a subquery with the same capability set, folding its extension
    // and charset usage into the parent.
    fn child(parent: &mut Builder<'a>, sub: &SearchQuery) -> Result<Vec<String>> {
        let mut b = Builder {
            caps: parent.caps,
            terms: Vec::new(),
            exts_used: Vec::new(),
            text_seen: false,
        };
        sub.build_into(&mut b)?;
        if b.terms.is_empty() {
            b.terms.push("ALL".to_string());
        }
        for e in b.exts_used {
            parent.ext(e);
        }
        parent.text_seen |= b.text_seen;
        Ok(b.terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_all() {
        let built = SearchQuery::new().build(None).unwrap();
        assert_eq!(built.query, "ALL");
        assert_eq!(built.charset, None);
    }

    #[test]
    fn flags_render_in_insertion_order() {
        let mut q = SearchQuery::new();
        q.flag("\\answered", true, false)
            .flag("\\draft", false, false)
            .flag("foo", true, false)
            .flag("bar", false, false);
        let built = q.build(None).unwrap();
        assert_eq!(built.query, "ANSWERED UNDRAFT KEYWORD FOO UNKEYWORD BAR");
    }

    #[test]
    fn unset_recent_uses_not() {
        let mut q = SearchQuery::new();
        q.flag("\\recent", false, false);
        assert_eq!(q.build(None).unwrap().query, "NOT RECENT");
    }

    #[test]
    fn repeated_flag_overwrites_in_place() {
        let mut q = SearchQuery::new();
        q.flag("\\seen", true, false)
            .flag("\\draft", true, false)
            .flag("\\seen", false, false);
        assert_eq!(q.build(None).unwrap().query, "UNSEEN DRAFT");
    }

    #[test]
    fn header_terms() {
        let mut q = SearchQuery::new();
        q.header_text("From", "ser@example.com", false, false)
            .header_text("X-Spam", "yes", true, false);
        let built = q.build(None).unwrap();
        assert_eq!(
            built.query,
            "FROM ser@example.com NOT HEADER X-Spam yes"
        );
        assert_eq!(built.charset.as_deref(), Some("US-ASCII"));
    }

    #[test]
    fn text_terms_quote_when_needed() {
        let mut q = SearchQuery::new();
        q.text("quarterly report", true, false, false)
            .text("secret", false, true, false);
        assert_eq!(
            q.build(None).unwrap().query,
            "BODY \"quarterly report\" NOT TEXT secret"
        );
    }

    #[test]
    fn charset_reported_and_uppercased() {
        let mut q = SearchQuery::new();
        q.charset("utf-8").text("héllo", true, false, false);
        let built = q.build(None).unwrap();
        assert_eq!(built.charset.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn size_and_ids() {
        let mut q = SearchQuery::new();
        q.size(1024, true, false, false)
            .ids(Ids::from_set("4,10:12", false).unwrap(), false, false);
        assert_eq!(q.build(None).unwrap().query, "LARGER 1024 UID 4,10:12");
    }

    #[test]
    fn sequence_ids_skip_uid_prefix() {
        let mut q = SearchQuery::new();
        q.ids(Ids::from_set("1:5", true).unwrap(), true, false);
        assert_eq!(q.build(None).unwrap().query, "NOT 1:5");
    }

    #[test]
    fn wildcard_ids() {
        let mut q = SearchQuery::new();
        q.ids(Ids::all(false), false, false);
        assert_eq!(q.build(None).unwrap().query, "UID 1:*");
    }

    #[test]
    fn date_terms() {
        let mut q = SearchQuery::new();
        let date = NaiveDate::from_ymd_opt(2012, 3, 7).unwrap();
        q.date_search(date, DateRange::Since, false, false, false)
            .date_search(date, DateRange::Before, true, true, false);
        assert_eq!(
            q.build(None).unwrap().query,
            "SINCE 07-Mar-2012 NOT SENTBEFORE 07-Mar-2012"
        );
    }

    #[test]
    fn within_uses_extension_when_present() {
        let caps = Capabilities::from_names(["IMAP4rev1", "WITHIN"]);
        let mut q = SearchQuery::new();
        q.interval_search(3600, Interval::Younger, false, false);
        let built = q.build(Some(&caps)).unwrap();
        assert_eq!(built.query, "YOUNGER 3600");
        assert_eq!(built.exts_used, vec!["WITHIN"]);
    }

    #[test]
    fn within_falls_back_to_date() {
        let caps = Capabilities::from_names(["IMAP4rev1"]);
        let mut q = SearchQuery::new();
        q.interval_search(86400, Interval::Older, false, false);
        let built = q.build(Some(&caps)).unwrap();
        assert!(built.query.starts_with("BEFORE "), "got {:?}", built.query);
        assert!(built.exts_used.is_empty());
    }

    #[test]
    fn modseq_needs_condstore() {
        let mut q = SearchQuery::new();
        q.modseq(1234, None, ModSeqType::All, false, false);

        let without = Capabilities::from_names(["IMAP4rev1"]);
        assert!(matches!(
            q.build(Some(&without)),
            Err(Error::NoSupport(ref e)) if e == "CONDSTORE"
        ));

        let with = Capabilities::from_names(["IMAP4rev1", "CONDSTORE"]);
        let built = q.build(Some(&with)).unwrap();
        assert_eq!(built.query, "MODSEQ 1234");
        assert_eq!(built.exts_used, vec!["CONDSTORE"]);
    }

    #[test]
    fn modseq_with_entry_name() {
        let mut q = SearchQuery::new();
        q.modseq(620162338, Some("/flags/\\draft"), ModSeqType::All, false, false);
        assert_eq!(
            q.build(None).unwrap().query,
            "MODSEQ \"/flags/\\\\draft\" all 620162338"
        );
    }

    #[test]
    fn previous_search_polarity() {
        let mut q = SearchQuery::new();
        q.previous_search(false, false);
        assert_eq!(q.build(None).unwrap().query, "NOT $");

        let mut q = SearchQuery::new();
        q.previous_search(true, false);
        assert_eq!(q.build(None).unwrap().query, "$");

        let without = Capabilities::from_names(["IMAP4rev1"]);
        assert!(matches!(
            q.build(Some(&without)),
            Err(Error::NoSupport(ref e)) if e == "SEARCHRES"
        ));
    }

    #[test]
    fn fuzzy_needs_capability() {
        let mut q = SearchQuery::new();
        q.flag("\\seen", true, true);

        let without = Capabilities::from_names(["IMAP4rev1"]);
        assert!(matches!(
            q.build(Some(&without)),
            Err(Error::NoSupport(ref e)) if e == "SEARCH=FUZZY"
        ));

        let with = Capabilities::from_names(["IMAP4rev1", "SEARCH=FUZZY"]);
        let built = q.build(Some(&with)).unwrap();
        assert_eq!(built.query, "FUZZY SEEN");
        assert_eq!(built.exts_used, vec!["SEARCH=FUZZY"]);
    }

    #[test]
    fn new_msgs_clears_recent_criteria() {
        let mut q = SearchQuery::new();
        q.flag("\\recent", true, false)
            .new_msgs(true, false);
        assert_eq!(q.build(None).unwrap().query, "NEW");

        let mut q = SearchQuery::new();
        q.flag("\\recent", true, false)
            .flag("\\deleted", false, false)
            .new_msgs(false, false);
        assert_eq!(q.build(None).unwrap().query, "OLD UNDELETED");
    }

    #[test]
    fn and_search_appends_flat() {
        let mut inner = SearchQuery::new();
        inner.flag("\\seen", true, false);
        let mut q = SearchQuery::new();
        q.flag("\\flagged", true, false).and_search([inner]);
        assert_eq!(q.build(None).unwrap().query, "FLAGGED SEEN");
    }

    #[test]
    fn or_search_nests_right_associatively() {
        let mut a = SearchQuery::new();
        a.flag("\\answered", true, false);
        let mut b = SearchQuery::new();
        b.flag("\\deleted", true, false);
        let mut c = SearchQuery::new();
        c.flag("\\flagged", true, false);

        let mut q = SearchQuery::new();
        q.or_search([a, b, c]);
        // binary OR chains: the second operand of the first OR is itself an
        // OR term, i.e. OR (C) (OR (B) (A)) without the redundant parens
        assert_eq!(
            q.build(None).unwrap().query,
            "OR (FLAGGED) OR (DELETED) (ANSWERED)"
        );
    }

    #[test]
    fn or_with_base_terms() {
        let mut a = SearchQuery::new();
        a.flag("\\answered", true, false);
        let mut q = SearchQuery::new();
        q.flag("\\seen", true, false).or_search([a]);
        assert_eq!(q.build(None).unwrap().query, "OR (ANSWERED) SEEN");
    }

    #[test]
    fn subquery_capability_failures_propagate() {
        let mut sub = SearchQuery::new();
        sub.modseq(1, None, ModSeqType::All, false, false);
        let mut q = SearchQuery::new();
        q.or_search([sub]);

        let caps = Capabilities::from_names(["IMAP4rev1"]);
        assert!(q.build(Some(&caps)).is_err());
    }
}
