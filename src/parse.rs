//! Decoding of untagged server responses into typed results.
//!
//! Every function here takes the block of untagged lines collected while a
//! command ran (literals already inlined by the connection layer), walks it
//! response by response with the [`Tokenizer`](crate::tokenize::Tokenizer),
//! and pulls out the responses the command asked for. Everything else is a
//! unilateral server message and is routed to the session's unsolicited
//! channel; per RFC 3501 section 7 a client has to accept any response at
//! any time.

use std::sync::mpsc;

use crate::error::{Error, ParseError, Result};
use crate::ids::Ids;
use crate::tokenize::{literal_tail, Token, Tokenizer};
use crate::types::*;

// ---------- response framing ----------

/// Split a block of collected lines into individual responses. A response
/// ends at CRLF, except that a line announcing a literal (`{N}` tail)
/// continues with N raw octets and at least one more line.
pub(crate) fn response_slices(buf: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < buf.len() {
        let eol = match buf[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => pos + i + 1,
            None => buf.len(),
        };
        let skip = literal_tail(&buf[pos..eol]).unwrap_or(0);
        if skip > 0 {
            pos = (eol + skip).min(buf.len());
        } else {
            out.push(&buf[start..eol]);
            start = eol;
            pos = eol;
        }
    }
    if start < buf.len() {
        out.push(&buf[start..]);
    }
    out
}

// ---------- status responses ----------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    Ok,
    No,
    Bad,
    Bye,
    PreAuth,
}

impl Status {
    fn from_word(word: &str) -> Option<Status> {
        match word.to_ascii_uppercase().as_str() {
            "OK" => Some(Status::Ok),
            "NO" => Some(Status::No),
            "BAD" => Some(Status::Bad),
            "BYE" => Some(Status::Bye),
            "PREAUTH" => Some(Status::PreAuth),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StatusResponse {
    pub status: Status,
    pub code: Option<ResponseCode>,
    pub information: String,
}

/// Parse `OK [CODE args] text` shapes: the remainder of a status line after
/// the tag or `*`.
pub(crate) fn parse_status_response(rest: &[u8]) -> Option<StatusResponse> {
    let rest = trim_bytes(rest);
    let word_end = rest
        .iter()
        .position(|&b| b == b' ')
        .unwrap_or(rest.len());
    let status = Status::from_word(std::str::from_utf8(&rest[..word_end]).ok()?)?;
    let mut tail = trim_bytes(&rest[word_end.min(rest.len())..]);

    let mut code = None;
    if tail.first() == Some(&b'[') {
        if let Some(close) = tail.iter().position(|&b| b == b']') {
            code = Some(parse_response_code(&tail[1..close]));
            tail = trim_bytes(&tail[close + 1..]);
        }
    }

    Some(StatusResponse {
        status,
        code,
        information: String::from_utf8_lossy(tail).trim().to_string(),
    })
}

fn trim_bytes(b: &[u8]) -> &[u8] {
    let from = b
        .iter()
        .position(|&c| !matches!(c, b' ' | b'\r' | b'\n'))
        .unwrap_or(b.len());
    let to = b
        .iter()
        .rposition(|&c| !matches!(c, b' ' | b'\r' | b'\n'))
        .map_or(from, |i| i + 1);
    &b[from..to]
}

fn expand_set(set: &str) -> Vec<u32> {
    Ids::from_set(set, false)
        .map(|ids| ids.iter().collect())
        .unwrap_or_default()
}

/// Decode the content between `[` and `]` of a status response.
pub(crate) fn parse_response_code(content: &[u8]) -> ResponseCode {
    let mut tok = Tokenizer::new(content);
    let name = match tok.next() {
        Ok(Some(Token::Atom(a))) => a.to_ascii_uppercase(),
        _ => return ResponseCode::Other(String::new(), None),
    };

    let mut number = |tok: &mut Tokenizer<'_>| -> Option<u64> {
        match tok.next() {
            Ok(Some(Token::Atom(a))) => a.parse().ok(),
            _ => None,
        }
    };

    match name.as_str() {
        "ALERT" => ResponseCode::Alert,
        "PARSE" => ResponseCode::Parse,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "UIDNOTSTICKY" => ResponseCode::UidNotSticky,
        "NOMODSEQ" => ResponseCode::NoModSeq,
        "UIDNEXT" => match number(&mut tok) {
            Some(n) => ResponseCode::UidNext(n as u32),
            None => ResponseCode::Other(name, None),
        },
        "UIDVALIDITY" => match number(&mut tok) {
            Some(n) => ResponseCode::UidValidity(n as u32),
            None => ResponseCode::Other(name, None),
        },
        "UNSEEN" => match number(&mut tok) {
            Some(n) => ResponseCode::Unseen(n as u32),
            None => ResponseCode::Other(name, None),
        },
        "HIGHESTMODSEQ" => match number(&mut tok) {
            Some(n) => ResponseCode::HighestModSeq(n),
            None => ResponseCode::Other(name, None),
        },
        "BADCHARSET" => {
            let mut charsets = Vec::new();
            if let Ok(Some(Token::List(mut list))) = tok.next() {
                while let Ok(Some(t)) = list.next() {
                    if let Some(s) = t.as_str() {
                        charsets.push(s.to_string());
                    }
                }
            }
            ResponseCode::BadCharset(charsets)
        }
        "CAPABILITY" => {
            let mut caps = Vec::new();
            while let Ok(Some(Token::Atom(a))) = tok.next() {
                caps.push(a.to_string());
            }
            ResponseCode::Capability(caps)
        }
        "PERMANENTFLAGS" => {
            let mut flags = Vec::new();
            if let Ok(Some(Token::List(mut list))) = tok.next() {
                while let Ok(Some(t)) = list.next() {
                    if let Some(s) = t.as_str() {
                        flags.push(s.to_string());
                    }
                }
            }
            ResponseCode::PermanentFlags(flags)
        }
        "APPENDUID" => {
            let validity = number(&mut tok);
            let uids = match tok.next() {
                Ok(Some(Token::Atom(a))) => expand_set(a),
                _ => Vec::new(),
            };
            match validity {
                Some(v) => ResponseCode::AppendUid(v as u32, uids),
                None => ResponseCode::Other(name, None),
            }
        }
        "COPYUID" => {
            let validity = number(&mut tok);
            let src = match tok.next() {
                Ok(Some(Token::Atom(a))) => expand_set(a),
                _ => Vec::new(),
            };
            let dst = match tok.next() {
                Ok(Some(Token::Atom(a))) => expand_set(a),
                _ => Vec::new(),
            };
            match validity {
                Some(v) => ResponseCode::CopyUid(v as u32, src, dst),
                None => ResponseCode::Other(name, None),
            }
        }
        "METADATA" => match tok.next() {
            Ok(Some(Token::Atom(sub))) => match sub.to_ascii_uppercase().as_str() {
                "LONGENTRIES" => match number(&mut tok) {
                    Some(n) => ResponseCode::MetadataLongEntries(n),
                    None => ResponseCode::Other(name, Some(sub.to_string())),
                },
                "MAXSIZE" => match number(&mut tok) {
                    Some(n) => ResponseCode::MetadataMaxSize(n),
                    None => ResponseCode::Other(name, Some(sub.to_string())),
                },
                "TOOMANY" => ResponseCode::MetadataTooMany,
                "NOPRIVATE" => ResponseCode::MetadataNoPrivate,
                other => ResponseCode::Other(name, Some(other.to_string())),
            },
            _ => ResponseCode::Other(name, None),
        },
        _ => {
            let rest = String::from_utf8_lossy(tok.remaining()).trim().to_string();
            let args = if rest.is_empty() { None } else { Some(rest) };
            ResponseCode::Other(name, args)
        }
    }
}

// ---------- unilateral routing ----------

enum Parsed<'a> {
    /// `* N <keyword> ...`
    Numbered(u32, String, Tokenizer<'a>),
    /// `* <keyword> ...`
    Keyed(String, Tokenizer<'a>),
    /// `* OK/NO/BAD/BYE/PREAUTH ...`
    Condition(StatusResponse),
}

fn split_untagged(line: &[u8]) -> Result<Parsed<'_>> {
    let invalid = || Error::Parse(ParseError::Invalid(line.to_vec()));
    let mut tok = Tokenizer::new(line);
    match tok.next().map_err(Error::from_tokenize)? {
        Some(Token::Atom("*")) => {}
        _ => return Err(invalid()),
    }
    let word = match tok.next().map_err(Error::from_tokenize)? {
        Some(Token::Atom(w)) => w.to_string(),
        _ => return Err(invalid()),
    };
    if let Ok(n) = word.parse::<u32>() {
        let keyword = match tok.next().map_err(Error::from_tokenize)? {
            Some(Token::Atom(k)) => k.to_ascii_uppercase(),
            _ => return Err(invalid()),
        };
        return Ok(Parsed::Numbered(n, keyword, tok));
    }
    if Status::from_word(&word).is_some() {
        // re-parse from the status word so the code/text split sees it
        let at = line
            .windows(word.len())
            .position(|w| w == word.as_bytes())
            .unwrap_or(0);
        let status = parse_status_response(&line[at..]).ok_or_else(invalid)?;
        return Ok(Parsed::Condition(status));
    }
    Ok(Parsed::Keyed(word.to_ascii_uppercase(), tok))
}

fn flag_list(list: &mut Tokenizer<'_>) -> Vec<Flag> {
    let mut flags = Vec::new();
    while let Ok(Some(t)) = list.next() {
        if let Some(s) = t.as_str() {
            flags.push(Flag::from(s));
        }
    }
    flags
}

fn status_attributes(list: &mut Tokenizer<'_>) -> Vec<StatusAttribute> {
    let mut attrs = Vec::new();
    loop {
        let name = match list.next() {
            Ok(Some(Token::Atom(a))) => a.to_ascii_uppercase(),
            _ => break,
        };
        let value = match list.next() {
            Ok(Some(Token::Atom(v))) => v.parse::<u64>().ok(),
            _ => None,
        };
        let Some(value) = value else { break };
        attrs.push(match name.as_str() {
            "MESSAGES" => StatusAttribute::Messages(value as u32),
            "RECENT" => StatusAttribute::Recent(value as u32),
            "UIDNEXT" => StatusAttribute::UidNext(value as u32),
            "UIDVALIDITY" => StatusAttribute::UidValidity(value as u32),
            "UNSEEN" => StatusAttribute::Unseen(value as u32),
            "HIGHESTMODSEQ" => StatusAttribute::HighestModSeq(value),
            _ => continue,
        });
    }
    attrs
}

fn astring(token: Token<'_>) -> Option<String> {
    token.as_str().map(str::to_string)
}

fn fetch_from_tokens(seq: u32, tok: &mut Tokenizer<'_>) -> Result<Fetch> {
    let mut fetch = Fetch {
        message: seq,
        ..Fetch::default()
    };
    let Some(Token::List(mut attrs)) = tok.next().map_err(Error::from_tokenize)? else {
        return Err(Error::Parse(ParseError::Unexpected(
            "FETCH attribute list".to_string(),
        )));
    };
    while let Some(item) = attrs.next().map_err(Error::from_tokenize)? {
        let Token::Atom(item) = item else {
            return Err(Error::Parse(ParseError::Unexpected(format!(
                "FETCH data item, got {:?}",
                item
            ))));
        };
        let item = item.to_ascii_uppercase();
        match item.as_str() {
            "FLAGS" => {
                if let Some(Token::List(mut list)) = attrs.next().map_err(Error::from_tokenize)? {
                    fetch.flags = flag_list(&mut list);
                }
            }
            "UID" => {
                if let Some(Token::Atom(v)) = attrs.next().map_err(Error::from_tokenize)? {
                    fetch.uid = v.parse().ok();
                }
            }
            "RFC822.SIZE" => {
                if let Some(Token::Atom(v)) = attrs.next().map_err(Error::from_tokenize)? {
                    fetch.size = v.parse().ok();
                }
            }
            "MODSEQ" => {
                // always a one-element list
                if let Some(Token::List(mut list)) = attrs.next().map_err(Error::from_tokenize)? {
                    if let Ok(Some(Token::Atom(v))) = list.next() {
                        fetch.modseq = v.parse().ok();
                    }
                }
            }
            "INTERNALDATE" => {
                if let Some(Token::Quoted(v)) = attrs.next().map_err(Error::from_tokenize)? {
                    fetch.internal_date = parse_internal_date(&v);
                }
            }
            "ENVELOPE" | "BODYSTRUCTURE" => {
                // structure parsing is out of scope for this engine
                let _ = attrs.next().map_err(Error::from_tokenize)?;
            }
            "BODY" => {
                // a bare BODY is the non-extensible BODYSTRUCTURE form
                let _ = attrs.next().map_err(Error::from_tokenize)?;
            }
            _ if item.starts_with("BODY[") => {
                // section names can embed a parenthesized field list, which
                // the tokenizer splits; reassemble until the bracket closes
                let mut name = item.clone();
                while !name.contains(']') {
                    match attrs.next().map_err(Error::from_tokenize)? {
                        Some(Token::Atom(a)) => name.push_str(&a.to_ascii_uppercase()),
                        Some(Token::Quoted(q)) => {
                            name.push('"');
                            name.push_str(&q);
                            name.push('"');
                        }
                        Some(Token::List(mut list)) => {
                            let mut inner = Vec::new();
                            while let Some(t) = list.next().map_err(Error::from_tokenize)? {
                                if let Some(s) = t.as_str() {
                                    inner.push(s.to_string());
                                }
                            }
                            name.push_str(&format!(" ({})", inner.join(" ")));
                        }
                        _ => {
                            return Err(Error::Parse(ParseError::Unexpected(format!(
                                "unterminated fetch section {:?}",
                                name
                            ))))
                        }
                    }
                }
                let value = match attrs.next().map_err(Error::from_tokenize)? {
                    Some(Token::Literal(b)) => Some(b.to_vec()),
                    Some(Token::Quoted(s)) => Some(s.into_bytes()),
                    Some(Token::Nil) | None => None,
                    Some(other) => other.as_bytes().map(|b| b.to_vec()),
                };
                fetch.sections.push((name, value));
            }
            "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                let value = match attrs.next().map_err(Error::from_tokenize)? {
                    Some(Token::Literal(b)) => Some(b.to_vec()),
                    Some(Token::Quoted(s)) => Some(s.into_bytes()),
                    _ => None,
                };
                fetch.sections.push((item, value));
            }
            _ => {
                // unknown data item: skip its value
                let _ = attrs.next().map_err(Error::from_tokenize)?;
            }
        }
    }
    Ok(fetch)
}

fn parse_internal_date(s: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_str(s.trim(), "%d-%b-%Y %H:%M:%S %z")
        .or_else(|_| chrono::DateTime::parse_from_str(s.trim(), "%e-%b-%Y %H:%M:%S %z"))
        .ok()
}

/// Forward a response that is not part of the current command's result to
/// the unsolicited channel. Unknown untagged responses are ignored, as RFC
/// 3501 requires.
pub(crate) fn try_handle_unilateral(
    line: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<()> {
    match split_untagged(line)? {
        Parsed::Numbered(n, keyword, mut tok) => match keyword.as_str() {
            "EXISTS" => drop(unsolicited.send(UnsolicitedResponse::Exists(n))),
            "RECENT" => drop(unsolicited.send(UnsolicitedResponse::Recent(n))),
            "EXPUNGE" => drop(unsolicited.send(UnsolicitedResponse::Expunge(n))),
            "FETCH" => {
                let fetch = fetch_from_tokens(n, &mut tok)?;
                unsolicited
                    .send(UnsolicitedResponse::Fetch {
                        id: fetch.message,
                        uid: fetch.uid,
                        flags: fetch.flags().to_vec(),
                    })
                    .ok();
            }
            _ => {}
        },
        Parsed::Keyed(keyword, mut tok) => match keyword.as_str() {
            "STATUS" => {
                if let Some((mailbox, attributes)) = status_from_tokens(&mut tok)? {
                    unsolicited
                        .send(UnsolicitedResponse::Status {
                            mailbox,
                            attributes,
                        })
                        .ok();
                }
            }
            "CAPABILITY" => {
                let mut caps = Vec::new();
                while let Ok(Some(Token::Atom(a))) = tok.next() {
                    caps.push(a.to_string());
                }
                unsolicited.send(UnsolicitedResponse::Capabilities(caps)).ok();
            }
            "VANISHED" => {
                let (uids, _) = vanished_from_tokens(&mut tok)?;
                unsolicited.send(UnsolicitedResponse::Vanished(uids)).ok();
            }
            _ => {}
        },
        Parsed::Condition(status) => {
            let information = if status.information.is_empty() {
                None
            } else {
                Some(status.information)
            };
            let r = match status.status {
                Status::Ok | Status::PreAuth => UnsolicitedResponse::Ok {
                    code: status.code,
                    information,
                },
                Status::No => UnsolicitedResponse::No {
                    code: status.code,
                    information,
                },
                Status::Bad => UnsolicitedResponse::Bad {
                    code: status.code,
                    information,
                },
                Status::Bye => UnsolicitedResponse::Bye {
                    code: status.code,
                    information,
                },
            };
            unsolicited.send(r).ok();
        }
    }
    Ok(())
}

fn status_from_tokens(
    tok: &mut Tokenizer<'_>,
) -> Result<Option<(String, Vec<StatusAttribute>)>> {
    let Some(name) = tok.next().map_err(Error::from_tokenize)?.and_then(astring) else {
        return Ok(None);
    };
    let mailbox = MailboxName::from_utf7imap(&name).utf8().to_string();
    match tok.next().map_err(Error::from_tokenize)? {
        Some(Token::List(mut list)) => Ok(Some((mailbox, status_attributes(&mut list)))),
        _ => Ok(None),
    }
}

fn vanished_from_tokens(tok: &mut Tokenizer<'_>) -> Result<(Vec<Uid>, bool)> {
    let mut earlier = false;
    let mut uids = Vec::new();
    while let Some(t) = tok.next().map_err(Error::from_tokenize)? {
        match t {
            Token::List(mut flags) => {
                if let Ok(Some(Token::Atom(a))) = flags.next() {
                    earlier = a.eq_ignore_ascii_case("EARLIER");
                }
            }
            Token::Atom(set) => uids = expand_set(set),
            _ => {}
        }
    }
    Ok((uids, earlier))
}

// ---------- per-command parsers ----------

pub(crate) fn parse_capabilities(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Capabilities> {
    let mut caps = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "CAPABILITY" => {
                let set: &mut Capabilities = caps.get_or_insert_with(Capabilities::default);
                while let Ok(Some(Token::Atom(a))) = tok.next() {
                    set.0.insert(a.to_string());
                }
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    caps.ok_or_else(|| Error::Parse(ParseError::Unexpected("CAPABILITY response".to_string())))
}

pub(crate) fn parse_noop(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<()> {
    for line in response_slices(lines) {
        try_handle_unilateral(line, unsolicited)?;
    }
    Ok(())
}

pub(crate) fn parse_mailbox(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Mailbox> {
    let mut mailbox = Mailbox::default();
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Numbered(n, keyword, _) if keyword == "EXISTS" => mailbox.exists = n,
            Parsed::Numbered(n, keyword, _) if keyword == "RECENT" => mailbox.recent = n,
            Parsed::Keyed(ref k, ref mut tok) if k == "FLAGS" => {
                if let Ok(Some(Token::List(mut list))) = tok.next() {
                    mailbox.flags = flag_list(&mut list);
                }
            }
            Parsed::Condition(StatusResponse {
                status: Status::Ok,
                code: Some(code),
                ..
            }) => match code {
                ResponseCode::Unseen(n) => mailbox.unseen = Some(n),
                ResponseCode::UidValidity(n) => mailbox.uid_validity = Some(n),
                ResponseCode::UidNext(n) => mailbox.uid_next = Some(n),
                ResponseCode::HighestModSeq(n) => mailbox.highest_mod_seq = Some(n),
                ResponseCode::NoModSeq => mailbox.highest_mod_seq = None,
                ResponseCode::PermanentFlags(flags) => mailbox
                    .permanent_flags
                    .extend(flags.into_iter().map(Flag::from)),
                ResponseCode::ReadOnly => mailbox.read_only = true,
                ResponseCode::ReadWrite => mailbox.read_only = false,
                _ => {}
            },
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    Ok(mailbox)
}

pub(crate) fn parse_status(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<MailboxStatus> {
    let mut result: Option<MailboxStatus> = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "STATUS" && result.is_none() => {
                if let Some((mailbox, attributes)) = status_from_tokens(tok)? {
                    let mut status = MailboxStatus {
                        mailbox,
                        ..MailboxStatus::default()
                    };
                    for attr in attributes {
                        status.apply(attr);
                    }
                    result = Some(status);
                }
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    result.ok_or_else(|| Error::Parse(ParseError::Unexpected("STATUS response".to_string())))
}

pub(crate) fn parse_fetches(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Vec<Fetch>> {
    let mut fetches = Vec::new();
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Numbered(n, keyword, mut tok) if keyword == "FETCH" => {
                fetches.push(fetch_from_tokens(n, &mut tok)?);
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    Ok(fetches)
}

/// SEARCH and SORT both answer with a plain id list; CONDSTORE appends a
/// `(MODSEQ n)` tail.
pub(crate) fn parse_ids(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<(Vec<u32>, Option<u64>)> {
    let mut ids = Vec::new();
    let mut modseq = None;
    let mut seen = false;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "SEARCH" || k == "SORT" => {
                seen = true;
                while let Some(t) = tok.next().map_err(Error::from_tokenize)? {
                    match t {
                        Token::Atom(a) => {
                            if let Ok(n) = a.parse::<u32>() {
                                ids.push(n);
                            }
                        }
                        Token::List(mut tail) => {
                            if let (Ok(Some(Token::Atom(k))), Ok(Some(Token::Atom(v)))) =
                                (tail.next(), tail.next())
                            {
                                if k.eq_ignore_ascii_case("MODSEQ") {
                                    modseq = v.parse().ok();
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    if seen {
        Ok((ids, modseq))
    } else {
        Err(Error::Parse(ParseError::Unexpected(
            "SEARCH response".to_string(),
        )))
    }
}

pub(crate) fn parse_thread(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Thread> {
    let mut thread = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "THREAD" => {
                thread = Some(Thread::parse(tok)?);
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    thread.ok_or_else(|| Error::Parse(ParseError::Unexpected("THREAD response".to_string())))
}

pub(crate) fn parse_names(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Vec<Name>> {
    let mut names = Vec::new();
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "LIST" || k == "LSUB" => {
                let Some(Token::List(mut attrs)) = tok.next().map_err(Error::from_tokenize)?
                else {
                    return Err(Error::Parse(ParseError::Invalid(line.to_vec())));
                };
                let mut attributes = Vec::new();
                while let Some(t) = attrs.next().map_err(Error::from_tokenize)? {
                    if let Some(s) = t.as_str() {
                        attributes.push(NameAttribute::from(s));
                    }
                }
                let delimiter = match tok.next().map_err(Error::from_tokenize)? {
                    Some(Token::Nil) | None => None,
                    Some(t) => t.as_str().map(str::to_string),
                };
                let name = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(astring)
                    .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
                names.push(Name {
                    attributes,
                    delimiter,
                    name: MailboxName::from_utf7imap(&name),
                });
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    Ok(names)
}

fn namespace_group(token: Option<Token<'_>>) -> Vec<Namespace> {
    let mut out = Vec::new();
    if let Some(Token::List(mut group)) = token {
        while let Ok(Some(Token::List(mut entry))) = group.next() {
            let prefix = match entry.next() {
                Ok(Some(t)) => t.as_str().unwrap_or("").to_string(),
                _ => continue,
            };
            let delimiter = match entry.next() {
                Ok(Some(Token::Nil)) | Ok(None) | Err(_) => None,
                Ok(Some(t)) => t.as_str().map(str::to_string),
            };
            out.push(Namespace {
                prefix: MailboxName::from_utf7imap(&prefix).utf8().to_string(),
                delimiter,
            });
        }
    }
    out
}

pub(crate) fn parse_namespaces(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Namespaces> {
    let mut result = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "NAMESPACE" => {
                let personal = namespace_group(tok.next().map_err(Error::from_tokenize)?);
                let other_users = namespace_group(tok.next().map_err(Error::from_tokenize)?);
                let shared = namespace_group(tok.next().map_err(Error::from_tokenize)?);
                result = Some(Namespaces {
                    personal,
                    other_users,
                    shared,
                });
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    result.ok_or_else(|| Error::Parse(ParseError::Unexpected("NAMESPACE response".to_string())))
}

pub(crate) fn parse_acl(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Acl> {
    let mut acl = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "ACL" => {
                let mailbox = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(astring)
                    .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
                let mut acls = Vec::new();
                loop {
                    let Some(identifier) =
                        tok.next().map_err(Error::from_tokenize)?.and_then(astring)
                    else {
                        break;
                    };
                    let rights = tok
                        .next()
                        .map_err(Error::from_tokenize)?
                        .and_then(|t| t.as_str().map(AclRights::from))
                        .unwrap_or_default();
                    acls.push(AclEntry { identifier, rights });
                }
                acl = Some(Acl {
                    mailbox: MailboxName::from_utf7imap(&mailbox).utf8().to_string(),
                    acls,
                });
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    acl.ok_or_else(|| Error::Parse(ParseError::Unexpected("ACL response".to_string())))
}

pub(crate) fn parse_list_rights(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<ListRights> {
    let mut result = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "LISTRIGHTS" => {
                let mailbox = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(astring)
                    .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
                let identifier = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(astring)
                    .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
                let required = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(|t| t.as_str().map(AclRights::from))
                    .unwrap_or_default();
                let mut optional = AclRights::default();
                while let Some(t) = tok.next().map_err(Error::from_tokenize)? {
                    if let Some(s) = t.as_str() {
                        for c in s.chars() {
                            optional.data.insert(AclRight::from(c));
                        }
                    }
                }
                result = Some(ListRights {
                    mailbox: MailboxName::from_utf7imap(&mailbox).utf8().to_string(),
                    identifier,
                    required,
                    optional,
                });
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    result.ok_or_else(|| Error::Parse(ParseError::Unexpected("LISTRIGHTS response".to_string())))
}

pub(crate) fn parse_my_rights(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<MyRights> {
    let mut result = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "MYRIGHTS" => {
                let mailbox = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(astring)
                    .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
                let rights = tok
                    .next()
                    .map_err(Error::from_tokenize)?
                    .and_then(|t| t.as_str().map(AclRights::from))
                    .unwrap_or_default();
                result = Some(MyRights {
                    mailbox: MailboxName::from_utf7imap(&mailbox).utf8().to_string(),
                    rights,
                });
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    result.ok_or_else(|| Error::Parse(ParseError::Unexpected("MYRIGHTS response".to_string())))
}

fn quota_from_tokens(tok: &mut Tokenizer<'_>) -> Result<Option<Quota>> {
    let Some(root_name) = tok.next().map_err(Error::from_tokenize)?.and_then(astring) else {
        return Ok(None);
    };
    let mut resources = Vec::new();
    if let Some(Token::List(mut list)) = tok.next().map_err(Error::from_tokenize)? {
        loop {
            let name = match list.next() {
                Ok(Some(Token::Atom(a))) => QuotaResourceName::from(a),
                _ => break,
            };
            let usage = match list.next() {
                Ok(Some(Token::Atom(v))) => v.parse::<u64>().ok(),
                _ => None,
            };
            let limit = match list.next() {
                Ok(Some(Token::Atom(v))) => v.parse::<u64>().ok(),
                _ => None,
            };
            let (Some(usage), Some(limit)) = (usage, limit) else {
                break;
            };
            resources.push(QuotaResource { name, usage, limit });
        }
    }
    Ok(Some(Quota {
        root_name,
        resources,
    }))
}

pub(crate) fn parse_quota(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Quota> {
    let mut result = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "QUOTA" => {
                result = quota_from_tokens(tok)?;
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    result.ok_or_else(|| Error::Parse(ParseError::Unexpected("QUOTA response".to_string())))
}

pub(crate) fn parse_quota_root(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<QuotaRoot> {
    let mut mailbox_name = None;
    let mut quota_root_names = Vec::new();
    let mut quotas = Vec::new();
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "QUOTAROOT" => {
                let Some(name) = tok.next().map_err(Error::from_tokenize)?.and_then(astring)
                else {
                    return Err(Error::Parse(ParseError::Invalid(line.to_vec())));
                };
                mailbox_name = Some(MailboxName::from_utf7imap(&name).utf8().to_string());
                while let Some(t) = tok.next().map_err(Error::from_tokenize)? {
                    if let Some(root) = t.as_str() {
                        quota_root_names.push(root.to_string());
                    }
                }
            }
            Parsed::Keyed(ref k, ref mut tok) if k == "QUOTA" => {
                if let Some(quota) = quota_from_tokens(tok)? {
                    quotas.push(quota);
                }
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    match mailbox_name {
        Some(mailbox_name) => Ok(QuotaRoot {
            mailbox_name,
            quota_root_names,
            quotas,
        }),
        None => Err(Error::Parse(ParseError::Unexpected(
            "QUOTAROOT response".to_string(),
        ))),
    }
}

pub(crate) fn parse_metadata(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Vec<Metadata>> {
    let mut out = Vec::new();
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Keyed(ref k, ref mut tok) if k == "METADATA" => {
                // mailbox name ("" for server annotations)
                let _ = tok.next().map_err(Error::from_tokenize)?;
                let Some(Token::List(mut list)) = tok.next().map_err(Error::from_tokenize)?
                else {
                    return Err(Error::Parse(ParseError::Invalid(line.to_vec())));
                };
                loop {
                    let Some(entry) = list.next().map_err(Error::from_tokenize)?.and_then(astring)
                    else {
                        break;
                    };
                    let value = match list.next().map_err(Error::from_tokenize)? {
                        Some(Token::Nil) | None => None,
                        Some(t) => t.as_str().map(str::to_string),
                    };
                    out.push(Metadata { entry, value });
                }
            }
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    Ok(out)
}

pub(crate) fn parse_expunge(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<Deleted> {
    let mut seqs = Vec::new();
    let mut uids = Vec::new();
    let mut mod_seq = None;
    for line in response_slices(lines) {
        match split_untagged(line)? {
            Parsed::Numbered(n, keyword, _) if keyword == "EXPUNGE" => seqs.push(n),
            Parsed::Keyed(ref k, ref mut tok) if k == "VANISHED" => {
                let (v, _) = vanished_from_tokens(tok)?;
                uids.extend(v);
            }
            Parsed::Condition(StatusResponse {
                status: Status::Ok,
                code: Some(ResponseCode::HighestModSeq(n)),
                ..
            }) => mod_seq = Some(n),
            _ => try_handle_unilateral(line, unsolicited)?,
        }
    }
    if uids.is_empty() {
        Ok(Deleted::from_expunged(seqs, mod_seq))
    } else {
        Ok(Deleted::from_vanished(uids, mod_seq))
    }
}

/// Decode one `+ <base64 or text>` continuation line.
pub(crate) fn parse_authenticate_response(line: &[u8]) -> Result<String> {
    let line = trim_bytes(line);
    if let Some(rest) = line.strip_prefix(b"+") {
        return Ok(String::from_utf8_lossy(trim_bytes(rest)).to_string());
    }
    Err(Error::Parse(ParseError::Authentication(
        String::from_utf8_lossy(line).to_string(),
    )))
}

/// Consume responses arriving while `IDLE` is active. Returns true once a
/// tagged completion for the `DONE` has arrived.
pub(crate) fn parse_idle(
    lines: &[u8],
    unsolicited: &mut mpsc::Sender<UnsolicitedResponse>,
) -> Result<bool> {
    let mut done = false;
    for line in response_slices(lines) {
        if line.starts_with(b"*") {
            try_handle_unilateral(line, unsolicited)?;
        } else if !line.starts_with(b"+") {
            // the tagged status for DONE
            done = true;
        }
    }
    Ok(done)
}
