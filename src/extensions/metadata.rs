//! Support for the IMAP METADATA extension specified in [RFC
//! 5464](https://tools.ietf.org/html/rfc5464).
//!
//! Mailboxes or the server as a whole may have zero or more annotations
//! associated with them. An annotation contains a uniquely named entry with
//! a value; a general comment on a mailbox, for example, has the entry name
//! `/shared/comment`. Annotations are addressed at the server as a whole by
//! passing `None` for the mailbox argument.

use std::io::{Read, Write};

use crate::client::Session;
use crate::error::Result;
use crate::format::Element;
use crate::parse;
use crate::types::{MailboxName, Metadata, MetadataDepth, ResponseCode};

impl<T: Read + Write> Session<T> {
    /// Retrieve server or mailbox annotations (`GETMETADATA`).
    ///
    /// With `mailbox` as `None` this retrieves server annotations,
    /// otherwise annotations of that mailbox. `entries` names the
    /// annotations to fetch; `depth` extends the result to entries nested
    /// below them. When `maxsize` is given, only values no larger than that
    /// octet count are returned, and the returned `Option<u64>` reports the
    /// size of the largest value that was suppressed, if any.
    pub fn get_metadata(
        &mut self,
        mailbox: Option<&str>,
        entries: &[impl AsRef<str>],
        depth: MetadataDepth,
        maxsize: Option<usize>,
    ) -> Result<(Vec<Metadata>, Option<u64>)> {
        self.require_metadata()?;
        let mut options = format!("DEPTH {}", depth.depth_str());
        if let Some(size) = maxsize {
            options.push_str(&format!(" MAXSIZE {}", size));
        }
        let mailbox = match mailbox {
            Some(name) => {
                let elem = Element::Mailbox(MailboxName::from_utf8(name));
                elem.verify()?;
                elem.escape()
            }
            None => "\"\"".to_string(),
        };
        let mut names = Vec::with_capacity(entries.len());
        for entry in entries {
            let elem = Element::Astring(entry.as_ref().to_string());
            elem.verify()?;
            names.push(elem.escape());
        }
        let command = format!("GETMETADATA ({}) {} ({})", options, mailbox, names.join(" "));

        let resp = self.run(&command)?;
        let meta = parse::parse_metadata(resp.untagged(), &mut self.unsolicited_tx)?;
        let missed = match resp.status.code {
            Some(ResponseCode::MetadataLongEntries(n)) => Some(n),
            _ => None,
        };
        Ok((meta, missed))
    }

    /// Set annotations (`SETMETADATA`): each entry's value is added or
    /// replaced; a `None` value removes the entry. If any one annotation
    /// cannot be set the server changes none of them, and the error's
    /// response code says why (`MetadataMaxSize`, `MetadataTooMany`,
    /// `MetadataNoPrivate`).
    pub fn set_metadata(&mut self, mailbox: &str, annotations: &[Metadata]) -> Result<()> {
        self.require_metadata()?;
        let elem = Element::Mailbox(MailboxName::from_utf8(mailbox));
        elem.verify()?;
        let mut items = Vec::with_capacity(annotations.len());
        for a in annotations {
            let entry = Element::Astring(a.entry.clone());
            entry.verify()?;
            let value = Element::Nstring(a.value.clone());
            value.verify()?;
            items.push(format!("{} {}", entry.escape(), value.escape()));
        }
        self.run_command_and_check_ok(&format!(
            "SETMETADATA {} ({})",
            elem.escape(),
            items.join(" ")
        ))
    }

    // Server metadata is also usable with only METADATA-SERVER, but mailbox
    // annotations need the full extension; require the superset.
    fn require_metadata(&mut self) -> Result<()> {
        if self.has_capability("METADATA")? || self.has_capability("METADATA-SERVER")? {
            Ok(())
        } else {
            Err(crate::error::Error::NoSupport("METADATA".to_string()))
        }
    }
}
