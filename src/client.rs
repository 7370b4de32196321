//! The protocol state machine: command dispatch, tag generation,
//! continuation handling, untagged-response routing, and session state.
//!
//! A connection moves `Client` (connected, not authenticated) →
//! [`Session`] (authenticated) → selected-mailbox state inside the session.
//! [`Client::login`]/[`Client::authenticate`] consume the client and return
//! the session, handing the client back on failure so the caller can retry.
//!
//! The protocol is strictly half-duplex: one command's full response is
//! consumed before the next command is issued, so a session is a plain
//! synchronous request/response loop with no internal concurrency. Server
//! data that is not part of the running command's result is delivered
//! through [`Session::unsolicited_responses`].

use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};
use std::sync::mpsc;

use bufstream::BufStream;
use chrono::{DateTime, FixedOffset};

use crate::authenticator::Authenticator;
use crate::error::{Error, ParseError, Result, ServerError};
use crate::extensions::idle;
use crate::extensions::sort::{SortCriteria, SortCriterion, ThreadAlgorithm};
use crate::fetch_query::FetchQuery;
use crate::format::Element;
use crate::ids::{Ids, IdsMap};
use crate::parse;
use crate::parse::{Status, StatusResponse};
use crate::search::SearchQuery;
use crate::tokenize::literal_tail;
use crate::types::*;

static TAG_PREFIX: &str = "a";
const INITIAL_TAG: u32 = 0;
const LF: u8 = 0x0a;

fn validate(elem: &Element) -> Result<String> {
    elem.verify()?;
    Ok(elem.escape())
}

fn mailbox_arg(name: &str) -> Result<String> {
    validate(&Element::Mailbox(MailboxName::from_utf8(name)))
}

/// One command's raw response: every line read, with the tagged status line
/// at `tagged_start`.
pub(crate) struct CommandResponse {
    lines: Vec<u8>,
    tagged_start: usize,
    pub(crate) status: StatusResponse,
}

impl CommandResponse {
    pub(crate) fn untagged(&self) -> &[u8] {
        &self.lines[..self.tagged_start]
    }

    // A NO or BAD final status becomes the error for the whole command.
    fn check(self) -> Result<CommandResponse> {
        let err = ServerError {
            code: self.status.code.clone(),
            information: self.status.information.clone(),
        };
        match self.status.status {
            Status::Ok | Status::PreAuth => Ok(self),
            Status::No => Err(Error::No(err)),
            Status::Bad => Err(Error::Bad(err)),
            Status::Bye => Err(Error::Bye(err)),
        }
    }
}

/// The shared transport plumbing under both [`Client`] and [`Session`]:
/// buffered stream, tag counter, line-level reads and writes.
#[derive(Debug)]
pub struct Connection<T: Read + Write> {
    stream: BufStream<T>,
    tag: u32,
    /// Echo the protocol exchange to stdout.
    pub debug: bool,
    preauth: bool,
}

impl<T: Read + Write> Connection<T> {
    fn new(stream: T) -> Connection<T> {
        Connection {
            stream: BufStream::new(stream),
            tag: INITIAL_TAG,
            debug: false,
            preauth: false,
        }
    }

    pub(crate) fn readline(&mut self, into: &mut Vec<u8>) -> Result<usize> {
        use std::io::BufRead;
        let read = self.stream.read_until(LF, into)?;
        if read == 0 {
            return Err(Error::ConnectionLost);
        }
        if self.debug {
            let line = &into[into.len() - read..];
            eprint!("S: {}", String::from_utf8_lossy(line));
        }
        Ok(read)
    }

    pub(crate) fn write_line(&mut self, buf: &[u8]) -> Result<()> {
        self.stream.write_all(buf)?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;
        if self.debug {
            eprintln!("C: {}", String::from_utf8_lossy(buf));
        }
        Ok(())
    }

    fn create_command(&mut self, command: &str) -> String {
        self.tag += 1;
        format!("{}{} {}", TAG_PREFIX, self.tag, command)
    }

    /// Send `command` under a fresh tag, without reading anything back.
    pub fn run_command(&mut self, untagged_command: &str) -> Result<()> {
        let command = self.create_command(untagged_command);
        self.write_line(command.as_bytes())
    }

    /// Read the greeting line sent by the server on connect. Recognizes
    /// `PREAUTH` greetings.
    pub fn read_greeting(&mut self) -> Result<()> {
        let mut v = Vec::new();
        self.readline(&mut v)?;
        if let Some(rest) = v.strip_prefix(b"* ") {
            if let Some(status) = parse::parse_status_response(rest) {
                match status.status {
                    Status::PreAuth => self.preauth = true,
                    Status::Bye => {
                        return Err(Error::Bye(ServerError {
                            code: status.code,
                            information: status.information,
                        }))
                    }
                    _ => {}
                }
                return Ok(());
            }
        }
        Err(Error::Parse(ParseError::Invalid(v)))
    }

    // Parse `a<tag> OK ...`; the tag must match the one just issued.
    pub(crate) fn parse_tagged(&self, line: &[u8]) -> Result<StatusResponse> {
        let expect = format!("{}{} ", TAG_PREFIX, self.tag);
        let rest = line
            .strip_prefix(expect.as_bytes())
            .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))?;
        parse::parse_status_response(rest)
            .ok_or_else(|| Error::Parse(ParseError::Invalid(line.to_vec())))
    }

    // Collect response lines until the tagged status for the current tag.
    // A line announcing a literal ({N} tail) is continued with the N raw
    // octets plus at least one more line before it counts as complete.
    fn read_response(&mut self) -> Result<CommandResponse> {
        let mut data = Vec::new();
        loop {
            let line_start = data.len();
            let mut seg_start = line_start;
            loop {
                self.readline(&mut data)?;
                match literal_tail(&data[seg_start..]) {
                    Some(n) => {
                        let cur = data.len();
                        data.resize(cur + n, 0);
                        self.stream.read_exact(&mut data[cur..])?;
                        seg_start = data.len();
                    }
                    None => break,
                }
            }

            if data[line_start] == b'*' {
                continue;
            }
            if data[line_start] == b'+' {
                return Err(Error::Parse(ParseError::Unexpected(
                    "continuation request".to_string(),
                )));
            }
            let status = self.parse_tagged(&data[line_start..])?;
            return Ok(CommandResponse {
                lines: data,
                tagged_start: line_start,
                status,
            });
        }
    }

    fn run_unchecked(&mut self, untagged_command: &str) -> Result<CommandResponse> {
        self.run_command(untagged_command)?;
        self.read_response()
    }

    /// Send a command and read its complete response, failing on a `NO` or
    /// `BAD` status.
    pub(crate) fn run(&mut self, untagged_command: &str) -> Result<CommandResponse> {
        self.run_unchecked(untagged_command)?.check()
    }

    /// Runs a command and checks if it returns OK.
    pub fn run_command_and_check_ok(&mut self, command: &str) -> Result<()> {
        self.run(command).map(|_| ())
    }

    pub(crate) fn stream_mut(&mut self) -> &mut T {
        self.stream.get_mut()
    }

    pub(crate) fn stream_ref(&self) -> &T {
        self.stream.get_ref()
    }
}

/// An unauthenticated connection to an IMAP server.
#[derive(Debug)]
pub struct Client<T: Read + Write> {
    conn: Connection<T>,
}

impl<T: Read + Write> Deref for Client<T> {
    type Target = Connection<T>;

    fn deref(&self) -> &Connection<T> {
        &self.conn
    }
}

impl<T: Read + Write> DerefMut for Client<T> {
    fn deref_mut(&mut self) -> &mut Connection<T> {
        &mut self.conn
    }
}

impl<T: Read + Write> Client<T> {
    /// Wrap an established byte stream. The server greeting has not been
    /// read yet; call [`Connection::read_greeting`] (the
    /// [`ClientBuilder`](crate::ClientBuilder) does this for you).
    pub fn new(stream: T) -> Client<T> {
        Client {
            conn: Connection::new(stream),
        }
    }

    /// Give back the underlying stream, e.g. to run a `STARTTLS` handshake
    /// over it.
    pub fn into_inner(self) -> Result<T> {
        Ok(self.conn.stream.into_inner()?)
    }

    /// True if the greeting was `PREAUTH`: the connection is already
    /// authenticated and [`Client::preauthenticated`] may be used directly.
    pub fn is_preauthenticated(&self) -> bool {
        self.conn.preauth
    }

    /// Turn a `PREAUTH` connection into a session without logging in.
    pub fn preauthenticated(self) -> ::std::result::Result<Session<T>, (Error, Client<T>)> {
        if self.conn.preauth {
            Ok(Session::new(self.conn, None))
        } else {
            Err((
                Error::Parse(ParseError::Unexpected(
                    "server did not send a PREAUTH greeting".to_string(),
                )),
                self,
            ))
        }
    }

    /// Log in to the IMAP server, consuming the client. On failure the
    /// client is handed back along with the error so it can be reused.
    pub fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> ::std::result::Result<Session<T>, (Error, Client<T>)> {
        let args = (|| -> Result<String> {
            Ok(format!(
                "LOGIN {} {}",
                validate(&Element::Astring(username.to_string()))?,
                validate(&Element::Astring(password.to_string()))?
            ))
        })();
        let command = match args {
            Ok(c) => c,
            Err(e) => return Err((e, self)),
        };
        match self.conn.run(&command) {
            Ok(resp) => Ok(Session::new(self.conn, resp.status.code)),
            Err(e) => Err((e, self)),
        }
    }

    /// Authenticate with the server using the given SASL mechanism name and
    /// [`Authenticator`], consuming the client.
    pub fn authenticate<A: Authenticator>(
        mut self,
        auth_type: &str,
        authenticator: A,
    ) -> ::std::result::Result<Session<T>, (Error, Client<T>)> {
        if let Err(e) = self.conn.run_command(&format!("AUTHENTICATE {}", auth_type)) {
            return Err((e, self));
        }
        match self.do_auth_handshake(authenticator) {
            Ok(code) => Ok(Session::new(self.conn, code)),
            Err(e) => Err((e, self)),
        }
    }

    // Drive the challenge/response loop once AUTHENTICATE has been sent.
    fn do_auth_handshake<A: Authenticator>(
        &mut self,
        authenticator: A,
    ) -> Result<Option<ResponseCode>> {
        use base64::engine::general_purpose::STANDARD as B64;
        use base64::Engine;

        loop {
            let mut line = Vec::new();
            self.conn.readline(&mut line)?;

            if line.starts_with(b"+") {
                let challenge = parse::parse_authenticate_response(&line)?;
                let decoded = B64.decode(challenge.as_bytes()).map_err(|_| {
                    Error::Parse(ParseError::Authentication(challenge.clone()))
                })?;
                let response = authenticator.process(&decoded);
                self.conn
                    .write_line(B64.encode(response.as_ref()).as_bytes())?;
            } else if line.starts_with(b"*") {
                // unsolicited pre-login data; nothing to route it to yet
                continue;
            } else {
                let status = self.conn.parse_tagged(&line)?;
                let err = ServerError {
                    code: status.code.clone(),
                    information: status.information.clone(),
                };
                return match status.status {
                    Status::Ok => Ok(status.code),
                    Status::No => Err(Error::No(err)),
                    Status::Bad => Err(Error::Bad(err)),
                    _ => Err(Error::Parse(ParseError::Invalid(line))),
                };
            }
        }
    }
}

/// The state the engine tracks for the currently selected mailbox.
#[derive(Debug)]
pub struct SelectedMailbox {
    /// The mailbox name, in both forms.
    pub name: MailboxName,
    /// The data the server reported when the mailbox was opened, kept
    /// current as untagged `EXISTS`/`RECENT`/`EXPUNGE` updates arrive.
    pub mailbox: Mailbox,
    /// Sequence-number → UID associations learned from `FETCH` responses,
    /// renumbered as expunges arrive.
    pub uid_map: IdsMap,
}

/// An authenticated IMAP session, obtained from [`Client::login`] or
/// [`Client::authenticate`].
#[derive(Debug)]
pub struct Session<T: Read + Write> {
    pub(crate) conn: Connection<T>,
    pub(crate) unsolicited_tx: mpsc::Sender<UnsolicitedResponse>,
    /// Server messages that were not part of any command's result, e.g.
    /// flag changes made by another session.
    pub unsolicited_responses: mpsc::Receiver<UnsolicitedResponse>,
    capabilities: Option<Capabilities>,
    selected: Option<SelectedMailbox>,
    alerts: Vec<String>,
}

impl<T: Read + Write> Deref for Session<T> {
    type Target = Connection<T>;

    fn deref(&self) -> &Connection<T> {
        &self.conn
    }
}

impl<T: Read + Write> DerefMut for Session<T> {
    fn deref_mut(&mut self) -> &mut Connection<T> {
        &mut self.conn
    }
}

impl<T: Read + Write> Session<T> {
    fn new(conn: Connection<T>, greeting_code: Option<ResponseCode>) -> Session<T> {
        let (tx, rx) = mpsc::channel();
        let capabilities = match greeting_code {
            Some(ResponseCode::Capability(caps)) => {
                Some(Capabilities::from_names(caps))
            }
            _ => None,
        };
        Session {
            conn,
            unsolicited_tx: tx,
            unsolicited_responses: rx,
            capabilities,
            selected: None,
            alerts: Vec::new(),
        }
    }

    // ---- command plumbing ----

    // Run a command, fold its side-band data (alerts, capability updates,
    // mailbox counts) into the session state, then fail on NO/BAD.
    pub(crate) fn run(&mut self, command: &str) -> Result<CommandResponse> {
        let resp = self.conn.run_unchecked(command)?;
        self.absorb(&resp);
        resp.check()
    }

    /// Send a raw command and return the untagged portion of its response.
    pub fn run_command_and_read_response(&mut self, command: &str) -> Result<Vec<u8>> {
        let mut resp = self.run(command)?;
        resp.lines.truncate(resp.tagged_start);
        Ok(resp.lines)
    }

    /// Runs a command and checks if it returns OK.
    pub fn run_command_and_check_ok(&mut self, command: &str) -> Result<()> {
        self.run(command).map(|_| ())
    }

    fn absorb(&mut self, resp: &CommandResponse) {
        for line in parse::response_slices(resp.untagged()) {
            self.absorb_untagged(line);
        }
        self.absorb_code(resp.status.code.as_ref(), &resp.status.information);
    }

    fn absorb_untagged(&mut self, line: &[u8]) {
        let Some(rest) = line.strip_prefix(b"* ") else {
            return;
        };
        let Ok(text) = std::str::from_utf8(rest) else {
            return;
        };
        let mut words = text.split_whitespace();
        let (Some(first), second) = (words.next(), words.next()) else {
            return;
        };
        if let (Ok(n), Some(keyword)) = (first.parse::<u32>(), second) {
            match keyword.to_ascii_uppercase().as_str() {
                "EXISTS" => {
                    if let Some(sel) = self.selected.as_mut() {
                        sel.mailbox.exists = n;
                    }
                }
                "RECENT" => {
                    if let Some(sel) = self.selected.as_mut() {
                        sel.mailbox.recent = n;
                    }
                }
                "EXPUNGE" => {
                    if let Some(sel) = self.selected.as_mut() {
                        sel.mailbox.exists = sel.mailbox.exists.saturating_sub(1);
                        sel.uid_map.remove(&Ids::from_iter([n], true));
                    }
                }
                _ => {}
            }
            return;
        }
        if matches!(
            first.to_ascii_uppercase().as_str(),
            "OK" | "NO" | "BAD" | "BYE"
        ) {
            if let Some(status) = parse::parse_status_response(rest) {
                self.absorb_code(status.code.as_ref(), &status.information);
            }
        }
    }

    fn absorb_code(&mut self, code: Option<&ResponseCode>, information: &str) {
        match code {
            Some(ResponseCode::Alert) => self.alerts.push(information.to_string()),
            Some(ResponseCode::Capability(caps)) => {
                self.capabilities = Some(Capabilities::from_names(caps.clone()));
            }
            Some(ResponseCode::ReadOnly) => {
                if let Some(sel) = self.selected.as_mut() {
                    sel.mailbox.read_only = true;
                }
            }
            Some(ResponseCode::ReadWrite) => {
                if let Some(sel) = self.selected.as_mut() {
                    sel.mailbox.read_only = false;
                }
            }
            Some(ResponseCode::HighestModSeq(n)) => {
                if let Some(sel) = self.selected.as_mut() {
                    sel.mailbox.highest_mod_seq = Some(*n);
                }
            }
            _ => {}
        }
    }

    /// `[ALERT]` texts the server has sent since the last call. Alerts must
    /// be shown to the user per RFC 3501; they accumulate here instead of
    /// failing commands.
    pub fn alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// The engine's view of the currently selected mailbox, if any.
    pub fn selected(&self) -> Option<&SelectedMailbox> {
        self.selected.as_ref()
    }

    // ---- capabilities ----

    /// The server's capabilities, from cache or a fresh `CAPABILITY`
    /// command. The cache is refreshed whenever the server volunteers a
    /// `[CAPABILITY ...]` response code.
    pub fn capabilities(&mut self) -> Result<&Capabilities> {
        if self.capabilities.is_none() {
            let resp = self.run("CAPABILITY")?;
            let caps = parse::parse_capabilities(resp.untagged(), &mut self.unsolicited_tx)?;
            self.capabilities = Some(caps);
        }
        match self.capabilities {
            Some(ref caps) => Ok(caps),
            None => unreachable!(),
        }
    }

    /// Whether the server advertises the given capability.
    pub fn has_capability(&mut self, name: &str) -> Result<bool> {
        Ok(self.capabilities()?.has(name))
    }

    fn require_capability(&mut self, name: &str) -> Result<()> {
        if self.has_capability(name)? {
            Ok(())
        } else {
            Err(Error::NoSupport(name.to_string()))
        }
    }

    // ---- mailbox selection ----

    /// Select a mailbox read-write. The command is always re-issued, even if
    /// the mailbox is already selected, so the state is re-validated.
    pub fn select(&mut self, mailbox_name: &str) -> Result<Mailbox> {
        self.select_or_examine(mailbox_name, false)
    }

    /// Like [`Session::select`], but the mailbox is opened read-only.
    pub fn examine(&mut self, mailbox_name: &str) -> Result<Mailbox> {
        self.select_or_examine(mailbox_name, true)
    }

    fn select_or_examine(&mut self, name: &str, examine: bool) -> Result<Mailbox> {
        let mbox = MailboxName::from_utf8(name);
        let arg = validate(&Element::Mailbox(mbox.clone()))?;
        let verb = if examine { "EXAMINE" } else { "SELECT" };
        let resp = self.run(&format!("{} {}", verb, arg))?;
        let mut mailbox = parse::parse_mailbox(resp.untagged(), &mut self.unsolicited_tx)?;
        if examine || matches!(resp.status.code, Some(ResponseCode::ReadOnly)) {
            mailbox.read_only = true;
        }
        self.selected = Some(SelectedMailbox {
            name: mbox,
            mailbox: mailbox.clone(),
            uid_map: IdsMap::new(),
        });
        Ok(mailbox)
    }

    /// Close the selected mailbox, expunging messages flagged `\Deleted`.
    pub fn close(&mut self) -> Result<()> {
        self.run_command_and_check_ok("CLOSE")?;
        self.selected = None;
        Ok(())
    }

    /// Close the selected mailbox without expunging (RFC 3691).
    pub fn unselect(&mut self) -> Result<()> {
        self.require_capability("UNSELECT")?;
        self.run_command_and_check_ok("UNSELECT")?;
        self.selected = None;
        Ok(())
    }

    /// Inform the server that the client is done; the server replies with
    /// `BYE` and closes the connection.
    pub fn logout(&mut self) -> Result<()> {
        self.run_command_and_check_ok("LOGOUT")?;
        self.selected = None;
        self.capabilities = None;
        Ok(())
    }

    // ---- mailbox management ----

    /// Create a mailbox with the given name.
    pub fn create(&mut self, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("CREATE {}", arg))
    }

    /// Permanently remove the mailbox with the given name.
    pub fn delete(&mut self, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("DELETE {}", arg))
    }

    /// Change the name of a mailbox.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let from = mailbox_arg(from)?;
        let to = mailbox_arg(to)?;
        self.run_command_and_check_ok(&format!("RENAME {} {}", from, to))
    }

    /// Add the mailbox to the server's set of subscribed mailboxes.
    pub fn subscribe(&mut self, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("SUBSCRIBE {}", arg))
    }

    /// Remove the mailbox from the server's set of subscribed mailboxes.
    pub fn unsubscribe(&mut self, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("UNSUBSCRIBE {}", arg))
    }

    /// List mailbox names matching `pattern` under `reference`
    /// (defaulting to the empty reference and the `*` wildcard).
    pub fn list(&mut self, reference: Option<&str>, pattern: Option<&str>) -> Result<Vec<Name>> {
        self.list_or_lsub("LIST", reference, pattern)
    }

    /// Like [`Session::list`], restricted to subscribed names.
    pub fn lsub(&mut self, reference: Option<&str>, pattern: Option<&str>) -> Result<Vec<Name>> {
        self.list_or_lsub("LSUB", reference, pattern)
    }

    fn list_or_lsub(
        &mut self,
        verb: &str,
        reference: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<Vec<Name>> {
        let reference = validate(&Element::String(reference.unwrap_or("").to_string()))?;
        let pattern = validate(&Element::ListMailbox(pattern.unwrap_or("*").to_string()))?;
        let resp = self.run(&format!("{} {} {}", verb, reference, pattern))?;
        parse::parse_names(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// Request the given status items of a mailbox without selecting it.
    pub fn status(&mut self, mailbox_name: &str, items: &[StatusItem]) -> Result<MailboxStatus> {
        let arg = mailbox_arg(mailbox_name)?;
        let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
        let resp = self.run(&format!("STATUS {} ({})", arg, items.join(" ")))?;
        parse::parse_status(resp.untagged(), &mut self.unsolicited_tx)
    }

    // ---- searching, sorting, threading ----

    /// `SEARCH`: returns matching message sequence numbers.
    pub fn search(&mut self, query: &SearchQuery) -> Result<Ids> {
        self.do_search("SEARCH", true, query)
    }

    /// `UID SEARCH`: returns matching UIDs.
    pub fn uid_search(&mut self, query: &SearchQuery) -> Result<Ids> {
        self.do_search("UID SEARCH", false, query)
    }

    fn do_search(&mut self, verb: &str, sequence: bool, query: &SearchQuery) -> Result<Ids> {
        let caps = self.capabilities()?.clone();
        let built = query.build(Some(&caps))?;
        let command = format!("{}{}{}", verb, charset_arg(&built.charset), spaced(&built.query));
        let resp = self.run(&command)?;
        let (ids, modseq) = parse::parse_ids(resp.untagged(), &mut self.unsolicited_tx)?;
        if let (Some(sel), Some(m)) = (self.selected.as_mut(), modseq) {
            sel.mailbox.highest_mod_seq = Some(m);
        }
        Ok(Ids::from_iter(ids, sequence))
    }

    /// `SORT` (RFC 5256): like search, with server-side ordering.
    pub fn sort(&mut self, criteria: &[SortCriterion<'_>], query: &SearchQuery) -> Result<Ids> {
        self.do_sort("SORT", true, criteria, query)
    }

    /// `UID SORT`: sorted UIDs.
    pub fn uid_sort(&mut self, criteria: &[SortCriterion<'_>], query: &SearchQuery) -> Result<Ids> {
        self.do_sort("UID SORT", false, criteria, query)
    }

    fn do_sort(
        &mut self,
        verb: &str,
        sequence: bool,
        criteria: &[SortCriterion<'_>],
        query: &SearchQuery,
    ) -> Result<Ids> {
        self.require_capability("SORT")?;
        let caps = self.capabilities()?.clone();
        let built = query.build(Some(&caps))?;
        // charset is mandatory for SORT, unlike SEARCH
        let charset = built.charset.as_deref().unwrap_or("US-ASCII").to_string();
        let command = format!(
            "{} {} {}{}",
            verb,
            SortCriteria(criteria),
            charset,
            spaced(&built.query)
        );
        let resp = self.run(&command)?;
        let (ids, _) = parse::parse_ids(resp.untagged(), &mut self.unsolicited_tx)?;
        Ok(Ids::from_iter(ids, sequence))
    }

    /// `THREAD` (RFC 5256): group matching messages into threads.
    pub fn thread(&mut self, algorithm: ThreadAlgorithm, query: &SearchQuery) -> Result<Thread> {
        self.do_thread("THREAD", algorithm, query)
    }

    /// `UID THREAD`: the thread graph keyed by UID.
    pub fn uid_thread(
        &mut self,
        algorithm: ThreadAlgorithm,
        query: &SearchQuery,
    ) -> Result<Thread> {
        self.do_thread("UID THREAD", algorithm, query)
    }

    fn do_thread(
        &mut self,
        verb: &str,
        algorithm: ThreadAlgorithm,
        query: &SearchQuery,
    ) -> Result<Thread> {
        let wanted = format!("THREAD={}", algorithm);
        self.require_capability(&wanted)?;
        let caps = self.capabilities()?.clone();
        let built = query.build(Some(&caps))?;
        let charset = built.charset.as_deref().unwrap_or("US-ASCII").to_string();
        let command = format!("{} {} {}{}", verb, algorithm, charset, spaced(&built.query));
        let resp = self.run(&command)?;
        parse::parse_thread(resp.untagged(), &mut self.unsolicited_tx)
    }

    // ---- message data ----

    /// Fetch data for the messages in `set` (sequence numbers).
    pub fn fetch(&mut self, set: &Ids, query: &FetchQuery) -> Result<Vec<Fetch>> {
        self.do_fetch("FETCH", set, query)
    }

    /// Fetch data for the messages in `set` (UIDs).
    pub fn uid_fetch(&mut self, set: &Ids, query: &FetchQuery) -> Result<Vec<Fetch>> {
        self.do_fetch("UID FETCH", set, query)
    }

    fn do_fetch(&mut self, verb: &str, set: &Ids, query: &FetchQuery) -> Result<Vec<Fetch>> {
        let caps = self.capabilities()?.clone();
        let items = query.build(Some(&caps))?;
        let resp = self.run(&format!("{} {} {}", verb, set, items))?;
        let fetches = parse::parse_fetches(resp.untagged(), &mut self.unsolicited_tx)?;
        self.learn_uids(&fetches);
        Ok(fetches)
    }

    // Keep the seq↔uid association current from anything a FETCH reveals.
    fn learn_uids(&mut self, fetches: &[Fetch]) {
        if let Some(sel) = self.selected.as_mut() {
            sel.uid_map
                .update(fetches.iter().filter_map(|f| f.uid.map(|u| (f.message, u))));
        }
    }

    /// Alter message data (flags) for the messages in `set` (sequence
    /// numbers); `query` is e.g. `+FLAGS (\Deleted)`.
    pub fn store(&mut self, set: &Ids, query: &str) -> Result<Vec<Fetch>> {
        self.do_store("STORE", set, query)
    }

    /// Like [`Session::store`] with `set` holding UIDs.
    pub fn uid_store(&mut self, set: &Ids, query: &str) -> Result<Vec<Fetch>> {
        self.do_store("UID STORE", set, query)
    }

    fn do_store(&mut self, verb: &str, set: &Ids, query: &str) -> Result<Vec<Fetch>> {
        let resp = self.run(&format!("{} {} {}", verb, set, query))?;
        let fetches = parse::parse_fetches(resp.untagged(), &mut self.unsolicited_tx)?;
        self.learn_uids(&fetches);
        Ok(fetches)
    }

    /// Copy the messages in `set` (sequence numbers) to `mailbox_name`.
    pub fn copy(&mut self, set: &Ids, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("COPY {} {}", set, arg))
    }

    /// Copy the messages in `set` (UIDs) to `mailbox_name`.
    pub fn uid_copy(&mut self, set: &Ids, mailbox_name: &str) -> Result<()> {
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("UID COPY {} {}", set, arg))
    }

    /// Move messages (RFC 6851); requires the `MOVE` capability.
    pub fn mv(&mut self, set: &Ids, mailbox_name: &str) -> Result<()> {
        self.require_capability("MOVE")?;
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("MOVE {} {}", set, arg))
    }

    /// Move messages by UID (RFC 6851); requires the `MOVE` capability.
    pub fn uid_mv(&mut self, set: &Ids, mailbox_name: &str) -> Result<()> {
        self.require_capability("MOVE")?;
        let arg = mailbox_arg(mailbox_name)?;
        self.run_command_and_check_ok(&format!("UID MOVE {} {}", set, arg))
    }

    /// Permanently remove all messages flagged `\Deleted`.
    pub fn expunge(&mut self) -> Result<Deleted> {
        let resp = self.run("EXPUNGE")?;
        let mut deleted = parse::parse_expunge(resp.untagged(), &mut self.unsolicited_tx)?;
        if deleted.mod_seq.is_none() {
            if let Some(ResponseCode::HighestModSeq(n)) = resp.status.code {
                deleted.mod_seq = Some(n);
            }
        }
        Ok(deleted)
    }

    /// Like [`Session::expunge`], restricted to the given UIDs (UIDPLUS,
    /// RFC 4315).
    pub fn uid_expunge(&mut self, set: &Ids) -> Result<Deleted> {
        self.require_capability("UIDPLUS")?;
        let resp = self.run(&format!("UID EXPUNGE {}", set))?;
        parse::parse_expunge(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// Request a checkpoint of the selected mailbox.
    pub fn check(&mut self) -> Result<()> {
        self.run_command_and_check_ok("CHECK")
    }

    /// Does nothing, but gives the server an opening to send status
    /// updates, which are routed to [`Session::unsolicited_responses`].
    pub fn noop(&mut self) -> Result<()> {
        let resp = self.run("NOOP")?;
        parse::parse_noop(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// Append a message to a mailbox. Returns a builder; set flags and the
    /// internal date, then call [`AppendCmd::finish`].
    pub fn append<'a>(&'a mut self, mailbox_name: &str, content: &[u8]) -> AppendCmd<'a, T> {
        AppendCmd {
            session: self,
            mailbox: mailbox_name.to_string(),
            content: content.to_vec(),
            flags: Vec::new(),
            date: None,
        }
    }

    /// Wait for something to change in the selected mailbox (RFC 2177).
    pub fn idle(&mut self) -> Result<idle::Handle<'_, T>> {
        self.require_capability("IDLE")?;
        idle::Handle::make(self)
    }

    // ---- namespaces ----

    /// The server's namespace configuration (RFC 2342).
    pub fn namespaces(&mut self) -> Result<Namespaces> {
        self.require_capability("NAMESPACE")?;
        let resp = self.run("NAMESPACE")?;
        parse::parse_namespaces(resp.untagged(), &mut self.unsolicited_tx)
    }

    // ---- ACL (RFC 4314) ----

    /// The access control list of a mailbox.
    pub fn get_acl(&mut self, mailbox_name: &str) -> Result<Acl> {
        self.require_capability("ACL")?;
        let arg = mailbox_arg(mailbox_name)?;
        let resp = self.run(&format!("GETACL {}", arg))?;
        parse::parse_acl(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// Change the rights of `identifier` on a mailbox.
    pub fn set_acl(
        &mut self,
        mailbox_name: &str,
        identifier: &str,
        mode: AclModifyMode,
        rights: &AclRights,
    ) -> Result<()> {
        self.require_capability("ACL")?;
        let arg = mailbox_arg(mailbox_name)?;
        let identifier = validate(&Element::Astring(identifier.to_string()))?;
        let prefix = match mode {
            AclModifyMode::Replace => "",
            AclModifyMode::Add => "+",
            AclModifyMode::Remove => "-",
        };
        self.run_command_and_check_ok(&format!(
            "SETACL {} {} {}{}",
            arg, identifier, prefix, rights
        ))
    }

    /// Remove all rights of `identifier` on a mailbox.
    pub fn delete_acl(&mut self, mailbox_name: &str, identifier: &str) -> Result<()> {
        self.require_capability("ACL")?;
        let arg = mailbox_arg(mailbox_name)?;
        let identifier = validate(&Element::Astring(identifier.to_string()))?;
        self.run_command_and_check_ok(&format!("DELETEACL {} {}", arg, identifier))
    }

    /// The rights that may be granted to `identifier` on a mailbox.
    pub fn list_rights(&mut self, mailbox_name: &str, identifier: &str) -> Result<ListRights> {
        self.require_capability("ACL")?;
        let arg = mailbox_arg(mailbox_name)?;
        let identifier = validate(&Element::Astring(identifier.to_string()))?;
        let resp = self.run(&format!("LISTRIGHTS {} {}", arg, identifier))?;
        parse::parse_list_rights(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// The current user's rights on a mailbox.
    pub fn my_rights(&mut self, mailbox_name: &str) -> Result<MyRights> {
        self.require_capability("ACL")?;
        let arg = mailbox_arg(mailbox_name)?;
        let resp = self.run(&format!("MYRIGHTS {}", arg))?;
        parse::parse_my_rights(resp.untagged(), &mut self.unsolicited_tx)
    }

    // ---- QUOTA (RFC 2087) ----

    /// The quota listing of a quota root.
    pub fn get_quota(&mut self, root: &str) -> Result<Quota> {
        self.require_capability("QUOTA")?;
        let root = validate(&Element::Astring(root.to_string()))?;
        let resp = self.run(&format!("GETQUOTA {}", root))?;
        parse::parse_quota(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// The quota roots of a mailbox and their listings.
    pub fn get_quota_root(&mut self, mailbox_name: &str) -> Result<QuotaRoot> {
        self.require_capability("QUOTA")?;
        let arg = mailbox_arg(mailbox_name)?;
        let resp = self.run(&format!("GETQUOTAROOT {}", arg))?;
        parse::parse_quota_root(resp.untagged(), &mut self.unsolicited_tx)
    }

    /// Set resource limits on a quota root; the server answers with the new
    /// listing.
    pub fn set_quota(&mut self, root: &str, limits: &[QuotaLimit]) -> Result<Quota> {
        self.require_capability("QUOTA")?;
        let root = validate(&Element::Astring(root.to_string()))?;
        let limits: Vec<String> = limits.iter().map(|l| l.to_string()).collect();
        let resp = self.run(&format!("SETQUOTA {} ({})", root, limits.join(" ")))?;
        parse::parse_quota(resp.untagged(), &mut self.unsolicited_tx)
    }
}

fn spaced(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!(" {}", s)
    }
}

fn charset_arg(charset: &Option<String>) -> String {
    match charset {
        Some(cs) if cs != "US-ASCII" => format!(" CHARSET {}", cs),
        _ => String::new(),
    }
}

/// Builder returned by [`Session::append`].
#[must_use = "the APPEND is only sent by finish()"]
pub struct AppendCmd<'a, T: Read + Write> {
    session: &'a mut Session<T>,
    mailbox: String,
    content: Vec<u8>,
    flags: Vec<Flag>,
    date: Option<DateTime<FixedOffset>>,
}

impl<'a, T: Read + Write> AppendCmd<'a, T> {
    /// Set a flag on the appended message. `\Recent` cannot be set and is
    /// skipped.
    pub fn flag(mut self, flag: Flag) -> Self {
        if flag != Flag::Recent {
            self.flags.push(flag);
        }
        self
    }

    /// The `INTERNALDATE` the message should carry.
    pub fn internal_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Issue the `APPEND`: command line, continuation wait (skipped on
    /// LITERAL+ servers), then the message literal.
    pub fn finish(self) -> Result<Appended> {
        let AppendCmd {
            session,
            mailbox,
            content,
            flags,
            date,
        } = self;

        let mut command = format!("APPEND {}", mailbox_arg(&mailbox)?);
        if !flags.is_empty() {
            let flags: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
            command.push_str(&format!(" ({})", flags.join(" ")));
        }
        if let Some(date) = date {
            command.push_str(&format!(" {}", Element::DateTime(date).escape()));
        }
        let nonsync = session.has_capability("LITERAL+")?;
        command.push_str(&format!(
            " {{{}{}}}",
            content.len(),
            if nonsync { "+" } else { "" }
        ));

        session.conn.run_command(&command)?;
        if !nonsync {
            let mut line = Vec::new();
            session.conn.readline(&mut line)?;
            if !line.starts_with(b"+") {
                // a tagged refusal carries the real reason
                if let Ok(status) = session.conn.parse_tagged(&line) {
                    let err = ServerError {
                        code: status.code,
                        information: status.information,
                    };
                    return Err(match status.status {
                        Status::No => Error::No(err),
                        _ => Error::Bad(err),
                    });
                }
                return Err(Error::Append);
            }
        }
        session.conn.stream.write_all(&content)?;
        session.conn.stream.write_all(b"\r\n")?;
        session.conn.stream.flush()?;

        let resp = session.conn.read_response()?;
        session.absorb(&resp);
        let resp = resp.check()?;
        let mut appended = Appended::default();
        if let Some(ResponseCode::AppendUid(validity, uids)) = resp.status.code {
            appended.uid_validity = Some(validity);
            appended.uids = Some(uids);
        }
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_stream::MockStream;

    fn session(response: &str) -> Session<MockStream> {
        let mock = MockStream::new(response.as_bytes().to_vec());
        let mut s = Session::new(Connection::new(mock), None);
        // skip the a1 LOGIN exchange in tests
        s.conn.tag = 1;
        s
    }

    fn session_with_caps(caps: &[&str], response: &str) -> Session<MockStream> {
        let mut s = session(response);
        s.capabilities = Some(Capabilities::from_names(caps.iter().copied()));
        s
    }

    fn written(s: &Session<MockStream>) -> String {
        String::from_utf8_lossy(&s.conn.stream.get_ref().written_buf).to_string()
    }

    #[test]
    fn login() {
        let response = b"a1 OK [CAPABILITY IMAP4rev1 UIDPLUS] Logged in\r\n".to_vec();
        let client = Client::new(MockStream::new(response));
        let mut session = client.login("username", "password").unwrap();
        assert_eq!(
            written(&session),
            "a1 LOGIN username password\r\n"
        );
        // the login response code primed the capability cache
        assert!(session.has_capability("UIDPLUS").unwrap());
    }

    #[test]
    fn login_quotes_when_needed() {
        let response = b"a1 OK Logged in\r\n".to_vec();
        let client = Client::new(MockStream::new(response));
        let session = client.login("user name", "pass\"word").unwrap();
        assert_eq!(
            written(&session),
            "a1 LOGIN \"user name\" \"pass\\\"word\"\r\n"
        );
    }

    #[test]
    fn login_failure_returns_client() {
        let response = b"a1 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n".to_vec();
        let client = Client::new(MockStream::new(response));
        let (err, client) = client.login("u", "p").unwrap_err();
        match err {
            Error::No(se) => {
                assert_eq!(se.information, "Invalid credentials");
                assert!(matches!(se.code, Some(ResponseCode::Other(ref c, _)) if c == "AUTHENTICATIONFAILED"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        // the client is reusable
        drop(client);
    }

    #[test]
    fn authenticate_handshake() {
        use crate::authenticator::Plain;
        // "+ " challenge, then tagged OK
        let response = b"+ \r\na1 OK Success\r\n".to_vec();
        let client = Client::new(MockStream::new(response));
        let session = client
            .authenticate(
                "PLAIN",
                Plain {
                    user: "tim".to_string(),
                    password: "secret".to_string(),
                },
            )
            .unwrap();
        assert_eq!(
            written(&session),
            "a1 AUTHENTICATE PLAIN\r\nAHRpbQBzZWNyZXQ=\r\n"
        );
    }

    #[test]
    fn preauth_greeting() {
        let response = b"* PREAUTH ready\r\n".to_vec();
        let mut client = Client::new(MockStream::new(response));
        client.read_greeting().unwrap();
        assert!(client.is_preauthenticated());
        client.preauthenticated().unwrap();
    }

    #[test]
    fn select() {
        let response = "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n\
            * OK [PERMANENTFLAGS (\\* \\Deleted \\Seen)] Flags permitted.\r\n\
            * 18 EXISTS\r\n\
            * 2 RECENT\r\n\
            * OK [UNSEEN 17] First unseen.\r\n\
            * OK [UIDVALIDITY 1257842737] UIDs valid\r\n\
            * OK [UIDNEXT 44] Predicted next UID\r\n\
            a2 OK [READ-WRITE] Select completed.\r\n";
        let mut s = session(response);
        let mailbox = s.select("INBOX").unwrap();
        assert_eq!(written(&s), "a2 SELECT INBOX\r\n");
        assert_eq!(mailbox.exists, 18);
        assert_eq!(mailbox.recent, 2);
        assert_eq!(mailbox.unseen, Some(17));
        assert_eq!(mailbox.uid_validity, Some(1257842737));
        assert!(!mailbox.read_only);
        assert_eq!(s.selected().unwrap().name.utf8(), "INBOX");
    }

    #[test]
    fn select_utf8_name_goes_out_as_utf7() {
        let response = "* 0 EXISTS\r\n* 0 RECENT\r\na2 OK done\r\n";
        let mut s = session(response);
        s.select("Envoyé").unwrap();
        assert_eq!(written(&s), "a2 SELECT Envoy&AOk-\r\n");
    }

    #[test]
    fn examine_is_read_only() {
        let response = "* 1 EXISTS\r\n* 0 RECENT\r\na2 OK [READ-ONLY] done\r\n";
        let mut s = session(response);
        let mailbox = s.examine("INBOX").unwrap();
        assert_eq!(written(&s), "a2 EXAMINE INBOX\r\n");
        assert!(mailbox.read_only);
    }

    #[test]
    fn status() {
        let response = "* STATUS blurdybloop (MESSAGES 231 UIDNEXT 44292)\r\n\
                        a2 OK STATUS completed\r\n";
        let mut s = session(response);
        let status = s
            .status("blurdybloop", &[StatusItem::Messages, StatusItem::UidNext])
            .unwrap();
        assert_eq!(written(&s), "a2 STATUS blurdybloop (MESSAGES UIDNEXT)\r\n");
        assert_eq!(status.messages, Some(231));
        assert_eq!(status.uid_next, Some(44292));
    }

    #[test]
    fn search_typed() {
        let response = "* SEARCH 2 84 882\r\na2 OK SEARCH completed\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], response);
        let mut query = SearchQuery::new();
        query.flag("\\deleted", true, false).flag("\\seen", false, false);
        let ids = s.search(&query).unwrap();
        assert_eq!(written(&s), "a2 SEARCH DELETED UNSEEN\r\n");
        assert!(ids.sequence);
        assert_eq!(ids.sorted(), vec![2, 84, 882]);
    }

    #[test]
    fn uid_search_with_charset() {
        let response = "* SEARCH 5\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], response);
        let mut query = SearchQuery::new();
        query.charset("UTF-8").text("héllo", true, false, false);
        let ids = s.uid_search(&query).unwrap();
        assert_eq!(written(&s), "a2 UID SEARCH CHARSET UTF-8 BODY \"héllo\"\r\n");
        assert!(!ids.sequence);
    }

    #[test]
    fn search_capability_gate_fails_before_sending() {
        let mut s = session_with_caps(&["IMAP4rev1"], "");
        let mut query = SearchQuery::new();
        query.modseq(1, None, crate::search::ModSeqType::All, false, false);
        assert!(matches!(s.search(&query), Err(Error::NoSupport(_))));
        assert_eq!(written(&s), "");
    }

    #[test]
    fn sort() {
        let response = "* SORT 2 1 3\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "SORT"], response);
        let ids = s
            .sort(
                &[SortCriterion::Reverse(&SortCriterion::Date)],
                &SearchQuery::new(),
            )
            .unwrap();
        assert_eq!(written(&s), "a2 SORT (REVERSE DATE) US-ASCII ALL\r\n");
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn sort_needs_capability() {
        let mut s = session_with_caps(&["IMAP4rev1"], "");
        assert!(matches!(
            s.sort(&[SortCriterion::Date], &SearchQuery::new()),
            Err(Error::NoSupport(ref e)) if e == "SORT"
        ));
    }

    #[test]
    fn thread() {
        let response = "* THREAD (166)(167)(168 169)\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "THREAD=REFERENCES"], response);
        let thread = s
            .thread(ThreadAlgorithm::References, &SearchQuery::new())
            .unwrap();
        assert_eq!(written(&s), "a2 THREAD REFERENCES US-ASCII ALL\r\n");
        assert_eq!(thread.message_list(), vec![166, 167, 168, 169]);
    }

    #[test]
    fn fetch_updates_uid_map() {
        let select = "* 3 EXISTS\r\n* 0 RECENT\r\na2 OK done\r\n";
        let fetch = "* 1 FETCH (UID 10 FLAGS (\\Seen))\r\n\
                     * 2 FETCH (UID 11 FLAGS ())\r\n\
                     * 3 FETCH (UID 14 FLAGS ())\r\n\
                     a3 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], &format!("{}{}", select, fetch));
        s.select("INBOX").unwrap();
        let mut q = FetchQuery::new();
        q.uid().flags();
        let fetches = s.fetch(&Ids::from_set("1:3", true).unwrap(), &q).unwrap();
        assert_eq!(fetches.len(), 3);
        assert_eq!(
            s.selected().unwrap().uid_map.iter().collect::<Vec<_>>(),
            vec![(1, 10), (2, 11), (3, 14)]
        );
    }

    #[test]
    fn expunge_renumbers_uid_map() {
        let select = "* 3 EXISTS\r\n* 0 RECENT\r\na2 OK done\r\n";
        let fetch = "* 1 FETCH (UID 10)\r\n* 2 FETCH (UID 11)\r\n* 3 FETCH (UID 14)\r\n\
                     a3 OK done\r\n";
        let expunge = "* 2 EXPUNGE\r\na4 OK done\r\n";
        let mut s = session_with_caps(
            &["IMAP4rev1"],
            &format!("{}{}{}", select, fetch, expunge),
        );
        s.select("INBOX").unwrap();
        let mut q = FetchQuery::new();
        q.uid();
        s.fetch(&Ids::from_set("1:3", true).unwrap(), &q).unwrap();

        let deleted = s.expunge().unwrap();
        assert_eq!(deleted.seqs().collect::<Vec<_>>(), vec![2]);
        // uid 11 is gone and uid 14 moved from position 3 to 2
        assert_eq!(
            s.selected().unwrap().uid_map.iter().collect::<Vec<_>>(),
            vec![(1, 10), (2, 14)]
        );
        assert_eq!(s.selected().unwrap().mailbox.exists, 2);
    }

    #[test]
    fn fetch_with_multiline_literal() {
        let response = "* 2 FETCH (BODY[TEXT] {12}\r\nLine one\r\nLi)\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], response);
        let mut q = FetchQuery::new();
        q.body_text(false);
        let fetches = s.fetch(&Ids::from_set("2", true).unwrap(), &q).unwrap();
        assert_eq!(fetches[0].text(), Some(&b"Line one\r\nLi"[..]));
    }

    #[test]
    fn store() {
        let response = "* 2 FETCH (FLAGS (\\Deleted \\Seen))\r\na2 OK done\r\n";
        let mut s = session(response);
        let fetches = s
            .store(&Ids::from_set("2", true).unwrap(), "+FLAGS (\\Deleted)")
            .unwrap();
        assert_eq!(written(&s), "a2 STORE 2 +FLAGS (\\Deleted)\r\n");
        assert_eq!(fetches[0].flags(), &[Flag::Deleted, Flag::Seen]);
    }

    #[test]
    fn copy_and_move() {
        let mut s = session("a2 OK done\r\n");
        s.copy(&Ids::from_set("2:4", true).unwrap(), "MEETING").unwrap();
        assert_eq!(written(&s), "a2 COPY 2:4 MEETING\r\n");

        let mut s = session_with_caps(&["IMAP4rev1", "MOVE"], "a2 OK done\r\n");
        s.uid_mv(&Ids::from_set("112:113", false).unwrap(), "Archive")
            .unwrap();
        assert_eq!(written(&s), "a2 UID MOVE 112:113 Archive\r\n");

        let mut s = session_with_caps(&["IMAP4rev1"], "");
        assert!(matches!(
            s.mv(&Ids::from_set("1", true).unwrap(), "X"),
            Err(Error::NoSupport(_))
        ));
    }

    #[test]
    fn uid_expunge_needs_uidplus() {
        let mut s = session_with_caps(&["IMAP4rev1"], "");
        assert!(matches!(
            s.uid_expunge(&Ids::from_set("1", false).unwrap()),
            Err(Error::NoSupport(ref e)) if e == "UIDPLUS"
        ));

        let mut s = session_with_caps(&["IMAP4rev1", "UIDPLUS"], "* 3 EXPUNGE\r\na2 OK done\r\n");
        let deleted = s.uid_expunge(&Ids::from_set("14", false).unwrap()).unwrap();
        assert_eq!(written(&s), "a2 UID EXPUNGE 14\r\n");
        assert_eq!(deleted.seqs().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn append_with_continuation() {
        let response = "+ go ahead\r\na2 OK [APPENDUID 38505 3955] APPEND completed\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], response);
        let appended = s
            .append("INBOX", b"Subject: hi\r\n\r\nbody")
            .flag(Flag::Seen)
            .finish()
            .unwrap();
        assert_eq!(
            written(&s),
            "a2 APPEND INBOX (\\Seen) {19}\r\nSubject: hi\r\n\r\nbody\r\n"
        );
        assert_eq!(appended.uid_validity, Some(38505));
        assert_eq!(appended.uids, Some(vec![3955]));
    }

    #[test]
    fn append_nonsync_literal() {
        let response = "a2 OK APPEND completed\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "LITERAL+"], response);
        s.append("INBOX", b"msg").finish().unwrap();
        assert_eq!(written(&s), "a2 APPEND INBOX {3+}\r\nmsg\r\n");
    }

    #[test]
    fn append_refused() {
        let response = "a2 NO [TRYCREATE] no such mailbox\r\n";
        let mut s = session_with_caps(&["IMAP4rev1"], response);
        match s.append("Nope", b"msg").finish() {
            Err(Error::No(se)) => assert_eq!(se.code, Some(ResponseCode::TryCreate)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn create_delete_rename_subscribe() {
        let mut s = session("a2 OK done\r\n");
        s.create("Archive/2011").unwrap();
        assert_eq!(written(&s), "a2 CREATE Archive/2011\r\n");

        let mut s = session("a2 OK done\r\n");
        s.rename("INBOX", "NEW INBOX").unwrap();
        assert_eq!(written(&s), "a2 RENAME INBOX \"NEW INBOX\"\r\n");

        let mut s = session("a2 OK done\r\n");
        s.subscribe("Lists/rust").unwrap();
        assert_eq!(written(&s), "a2 SUBSCRIBE Lists/rust\r\n");

        let mut s = session("a2 OK done\r\n");
        s.delete("Old").unwrap();
        assert_eq!(written(&s), "a2 DELETE Old\r\n");

        let mut s = session("a2 OK done\r\n");
        s.unsubscribe("Lists/rust").unwrap();
        assert_eq!(written(&s), "a2 UNSUBSCRIBE Lists/rust\r\n");
    }

    #[test]
    fn list() {
        let response = "* LIST (\\HasNoChildren) \".\" \"INBOX\"\r\na2 OK done\r\n";
        let mut s = session(response);
        let names = s.list(None, None).unwrap();
        assert_eq!(written(&s), "a2 LIST \"\" *\r\n");
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name(), "INBOX");
    }

    #[test]
    fn capabilities_cached() {
        let response = "* CAPABILITY IMAP4rev1 QUOTA\r\na2 OK done\r\n";
        let mut s = session(response);
        assert!(s.has_capability("QUOTA").unwrap());
        // second query must hit the cache, not the stream
        assert!(s.has_capability("QUOTA").unwrap());
        assert_eq!(written(&s), "a2 CAPABILITY\r\n");
    }

    #[test]
    fn alerts_accumulate_and_drain() {
        let response = "* NO [ALERT] System shutdown in 10 minutes\r\n\
                        a2 OK done\r\n";
        let mut s = session(response);
        s.noop().unwrap();
        assert_eq!(s.alerts(), vec!["System shutdown in 10 minutes".to_string()]);
        assert!(s.alerts().is_empty());
    }

    #[test]
    fn unsolicited_exists_routed_and_absorbed() {
        let select = "* 3 EXISTS\r\n* 0 RECENT\r\na2 OK done\r\n";
        let noop = "* 4 EXISTS\r\n* 1 RECENT\r\na3 OK done\r\n";
        let mut s = session(&format!("{}{}", select, noop));
        s.select("INBOX").unwrap();
        s.noop().unwrap();
        assert_eq!(s.selected().unwrap().mailbox.exists, 4);
        assert_eq!(s.selected().unwrap().mailbox.recent, 1);
        assert_eq!(
            s.unsolicited_responses.try_recv(),
            Ok(UnsolicitedResponse::Exists(4))
        );
        assert_eq!(
            s.unsolicited_responses.try_recv(),
            Ok(UnsolicitedResponse::Recent(1))
        );
    }

    #[test]
    fn namespaces() {
        let response = "* NAMESPACE ((\"\" \"/\")) NIL NIL\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "NAMESPACE"], response);
        let ns = s.namespaces().unwrap();
        assert_eq!(written(&s), "a2 NAMESPACE\r\n");
        assert_eq!(ns.personal.len(), 1);
    }

    #[test]
    fn acl_round_trip() {
        let response = "* ACL INBOX user1 lr\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "ACL"], response);
        let acl = s.get_acl("INBOX").unwrap();
        assert_eq!(written(&s), "a2 GETACL INBOX\r\n");
        assert_eq!(acl.acls[0].identifier, "user1");

        let mut s = session_with_caps(&["IMAP4rev1", "ACL"], "a2 OK done\r\n");
        s.set_acl("INBOX", "user1", AclModifyMode::Add, &AclRights::from("lrx"))
            .unwrap();
        assert_eq!(written(&s), "a2 SETACL INBOX user1 +lrx\r\n");

        let mut s = session_with_caps(&["IMAP4rev1", "ACL"], "a2 OK done\r\n");
        s.delete_acl("INBOX", "user1").unwrap();
        assert_eq!(written(&s), "a2 DELETEACL INBOX user1\r\n");
    }

    #[test]
    fn quota_round_trip() {
        let response = "* QUOTA my_root (STORAGE 10 512)\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "QUOTA"], response);
        let quota = s.get_quota("my_root").unwrap();
        assert_eq!(written(&s), "a2 GETQUOTA my_root\r\n");
        assert_eq!(quota.resources[0].usage, 10);

        let response = "* QUOTA my_root (STORAGE 10 1024)\r\na2 OK done\r\n";
        let mut s = session_with_caps(&["IMAP4rev1", "QUOTA"], response);
        let quota = s
            .set_quota(
                "my_root",
                &[QuotaLimit {
                    name: QuotaResourceName::Storage,
                    amount: 1024,
                }],
            )
            .unwrap();
        assert_eq!(written(&s), "a2 SETQUOTA my_root (STORAGE 1024)\r\n");
        assert_eq!(quota.resources[0].limit, 1024);
    }

    #[test]
    fn close_and_logout() {
        let mut s = session("a2 OK done\r\na3 OK bye\r\n");
        s.close().unwrap();
        s.logout().unwrap();
        assert_eq!(written(&s), "a2 CLOSE\r\na3 LOGOUT\r\n");
        assert!(s.selected().is_none());
    }

    #[test]
    fn eof_is_connection_lost() {
        let mut s = session("");
        let mock = MockStream::default().with_eof();
        s.conn.stream = BufStream::new(mock);
        match s.noop() {
            Err(Error::ConnectionLost) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tagged_no_is_server_error() {
        let response = "a2 NO Quota exceeded; cannot copy\r\n";
        let mut s = session(response);
        match s.copy(&Ids::from_set("1", true).unwrap(), "Full") {
            Err(Error::No(se)) => assert_eq!(se.information, "Quota exceeded; cannot copy"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tagged_bad_is_protocol_complaint() {
        let response = "a2 BAD Invalid command\r\n";
        let mut s = session(response);
        match s.run_command_and_check_ok("FROBNICATE") {
            Err(Error::Bad(se)) => assert_eq!(se.information, "Invalid command"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn metadata_set() {
        let mut s = session_with_caps(&["IMAP4rev1", "METADATA"], "a2 OK done\r\n");
        s.set_metadata(
            "INBOX",
            &[Metadata {
                entry: "/shared/comment".to_string(),
                value: Some("Really useful".to_string()),
            }],
        )
        .unwrap();
        assert_eq!(
            written(&s),
            "a2 SETMETADATA INBOX (/shared/comment \"Really useful\")\r\n"
        );
    }

    #[test]
    fn dribbled_reads_still_assemble_lines() {
        let response = "* SEARCH 7\r\na2 OK done\r\n";
        let mock = MockStream::new(response.as_bytes().to_vec()).with_dribble(10);
        let mut s = Session::new(Connection::new(mock), None);
        s.conn.tag = 1;
        s.capabilities = Some(Capabilities::from_names(["IMAP4rev1"]));
        let ids = s.search(&SearchQuery::new()).unwrap();
        assert_eq!(ids.sorted(), vec![7]);
    }
}
