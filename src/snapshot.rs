//! Rehydratable session state.
//!
//! A live session cannot be serialized: it owns a socket. What can be
//! carried across processes is the recipe for an equivalent session: the
//! connection parameters plus the last known capability list and selected
//! mailbox. [`SessionSnapshot`] is that recipe; it is plain data, and
//! [`SessionSnapshot::resume`] re-validates everything it restores by
//! re-issuing the commands, comparing `UIDVALIDITY` so stale UID state is
//! detected instead of trusted.

use std::io::{Read, Write};

use crate::client::Session;
use crate::error::{Error, Result};
use crate::types::{Capabilities, Mailbox};

/// How the connection to the server is secured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Security {
    /// Implicit TLS on connect (usually port 993).
    Tls,
    /// Plain connection upgraded via `STARTTLS`.
    StartTls,
    /// No encryption.
    None,
}

/// A snapshot of everything needed to rebuild an equivalent session on a
/// fresh connection. Never holds a socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Transport security to use.
    pub security: Security,
    /// The capabilities the server advertised, if they were fetched.
    pub capabilities: Option<Vec<String>>,
    /// The selected mailbox (UTF-8 form), if one was selected.
    pub mailbox: Option<String>,
    /// The `UIDVALIDITY` of the selected mailbox when the snapshot was
    /// taken.
    pub uid_validity: Option<u32>,
    /// Whether the mailbox was opened read-only.
    pub read_only: bool,
}

impl SessionSnapshot {
    /// Capture the rehydratable state of a session.
    pub fn capture<T: Read + Write>(
        session: &Session<T>,
        host: &str,
        port: u16,
        security: Security,
    ) -> SessionSnapshot {
        let selected = session.selected();
        SessionSnapshot {
            host: host.to_string(),
            port,
            security,
            capabilities: None,
            mailbox: selected.map(|s| s.name.utf8().to_string()),
            uid_validity: selected.and_then(|s| s.mailbox.uid_validity),
            read_only: selected.map_or(false, |s| s.mailbox.read_only),
        }
    }

    /// Record a capability list with the snapshot.
    pub fn with_capabilities(mut self, caps: &Capabilities) -> SessionSnapshot {
        self.capabilities = Some(caps.iter().cloned().collect());
        self
    }

    /// Restore the mailbox state on a freshly authenticated session over a
    /// new connection.
    ///
    /// The remembered mailbox is re-opened with a real `SELECT`/`EXAMINE`.
    /// If the mailbox's `UIDVALIDITY` changed since the snapshot, any UIDs
    /// remembered alongside this snapshot are worthless; that surfaces as
    /// an error so the caller invalidates its caches rather than mixing
    /// identifier spaces.
    pub fn resume<T: Read + Write>(&self, session: &mut Session<T>) -> Result<Option<Mailbox>> {
        let Some(ref name) = self.mailbox else {
            return Ok(None);
        };
        let mailbox = if self.read_only {
            session.examine(name)?
        } else {
            session.select(name)?
        };
        match (self.uid_validity, mailbox.uid_validity) {
            (Some(old), Some(new)) if old != new => Err(Error::Parse(
                crate::error::ParseError::Unexpected(format!(
                    "UIDVALIDITY changed from {} to {}",
                    old, new
                )),
            )),
            _ => Ok(Some(mailbox)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::mock_stream::MockStream;

    fn selected_session(response: &str) -> Session<MockStream> {
        let full = format!(
            "a1 OK hi\r\n* 3 EXISTS\r\n* 0 RECENT\r\n* OK [UIDVALIDITY 99] ok\r\na2 OK done\r\n{}",
            response
        );
        let client = Client::new(MockStream::new(full.into_bytes()));
        let mut session = client.login("u", "p").unwrap();
        session.select("INBOX").unwrap();
        session
    }

    #[test]
    fn capture_records_mailbox_state() {
        let session = selected_session("");
        let snap = SessionSnapshot::capture(&session, "mail.example.com", 993, Security::Tls);
        assert_eq!(snap.host, "mail.example.com");
        assert_eq!(snap.mailbox.as_deref(), Some("INBOX"));
        assert_eq!(snap.uid_validity, Some(99));
        assert!(!snap.read_only);
    }

    #[test]
    fn resume_reselects_and_checks_uid_validity() {
        let mut session = selected_session(
            "* 3 EXISTS\r\n* 0 RECENT\r\n* OK [UIDVALIDITY 99] ok\r\na3 OK done\r\n",
        );
        let snap = SessionSnapshot::capture(&session, "h", 993, Security::Tls);
        let mailbox = snap.resume(&mut session).unwrap();
        assert_eq!(mailbox.unwrap().uid_validity, Some(99));
    }

    #[test]
    fn resume_rejects_changed_uid_validity() {
        let mut session = selected_session(
            "* 3 EXISTS\r\n* 0 RECENT\r\n* OK [UIDVALIDITY 100] ok\r\na3 OK done\r\n",
        );
        let snap = SessionSnapshot::capture(&session, "h", 993, Security::Tls);
        assert!(snap.resume(&mut session).is_err());
    }

    #[test]
    fn resume_without_mailbox_is_a_no_op() {
        let client = Client::new(MockStream::new(b"a1 OK hi\r\n".to_vec()));
        let mut session = client.login("u", "p").unwrap();
        let snap = SessionSnapshot::capture(&session, "h", 143, Security::None);
        assert_eq!(snap.resume(&mut session).unwrap(), None);
    }
}
