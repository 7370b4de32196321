//! Support for the IMAP IDLE command specified in [RFC
//! 2177](https://tools.ietf.org/html/rfc2177).

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

#[cfg(feature = "native-tls")]
use native_tls::TlsStream;

use crate::client::Session;
use crate::error::{Error, Result, ServerError};
use crate::parse;

/// `Handle` allows a client to block waiting for changes to the remote
/// mailbox.
///
/// The handle blocks using the [`IDLE`
/// command](https://tools.ietf.org/html/rfc2177#section-3) until the
/// underlying server state changes in some way. The changes the server
/// announced while idling end up in
/// [`Session::unsolicited_responses`].
///
/// Note that a server MAY consider a client inactive if it has an IDLE
/// command running, and if such a server has an inactivity timeout it MAY
/// log the client off implicitly at the end of its timeout period. Because
/// of that, clients using IDLE are advised to terminate the IDLE and
/// re-issue it at least every 29 minutes to avoid being logged off;
/// [`Handle::wait_keepalive`] does this.
///
/// As long as a [`Handle`] is active, the mailbox cannot be otherwise
/// accessed.
#[derive(Debug)]
pub struct Handle<'a, T: Read + Write> {
    session: &'a mut Session<T>,
    keepalive: Option<Duration>,
    done: bool,
}

/// Must be implemented for a transport in order for a [`Session`] using that
/// transport to support operations with timeouts, such as
/// [`Handle::wait_keepalive`].
pub trait SetReadTimeout {
    /// Set the timeout for subsequent reads to the given one.
    ///
    /// If `timeout` is `None`, the read timeout should be removed.
    ///
    /// See also `std::net::TcpStream::set_read_timeout`.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;
}

impl<'a, T: Read + Write + 'a> Handle<'a, T> {
    pub(crate) fn make(session: &'a mut Session<T>) -> Result<Self> {
        let mut h = Handle {
            session,
            keepalive: None,
            done: false,
        };
        h.init()?;
        Ok(h)
    }

    fn init(&mut self) -> Result<()> {
        // The IDLE command takes no arguments.
        self.session.run_command("IDLE")?;

        // A tagged response will be sent either
        //
        //   a) if there's an error, or
        //   b) *after* we send DONE
        let mut tx = self.session.unsolicited_tx.clone();
        loop {
            let mut v = Vec::new();
            self.session.conn.readline(&mut v)?;
            if v.starts_with(b"+") {
                self.done = false;
                return Ok(());
            }
            if v.starts_with(b"*") {
                // server data racing with the IDLE; keep it
                parse::try_handle_unilateral(&v, &mut tx)?;
                continue;
            }
            // a tagged response here can only be a refusal
            let status = self.session.conn.parse_tagged(&v)?;
            let err = ServerError {
                code: status.code,
                information: status.information,
            };
            return Err(match status.status {
                parse::Status::No => Error::No(err),
                _ => Error::Bad(err),
            });
        }
    }

    fn terminate(&mut self) -> Result<bool> {
        if !self.done {
            self.done = true;
            self.session.conn.write_line(b"DONE")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Internal helper that doesn't consume self.
    ///
    /// This is necessary so that we can keep using the inner `Session` in
    /// `wait_keepalive`.
    fn wait_inner(&mut self) -> Result<()> {
        let mut tx = self.session.unsolicited_tx.clone();
        let mut buffer = Vec::new();
        loop {
            match self.session.conn.readline(&mut buffer).map(|_| ()) {
                Err(Error::Io(ref e))
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    if self.keepalive.is_some() {
                        // refresh the IDLE connection
                        self.terminate()?;
                        self.init()?;
                    }
                }
                Err(err) => return Err(err),
                Ok(()) => {
                    parse::parse_idle(&buffer, &mut tx)?;
                    self.terminate()?;
                    buffer.truncate(0);

                    // responses during IDLE are single lines, so everything
                    // left to read is the wind-down after DONE
                    loop {
                        self.session.conn.readline(&mut buffer)?;
                        if parse::parse_idle(&buffer, &mut tx)? {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Block until the selected mailbox changes.
    pub fn wait(mut self) -> Result<()> {
        self.wait_inner()
    }
}

impl<'a, T: SetReadTimeout + Read + Write + 'a> Handle<'a, T> {
    /// Set the keep-alive interval to use when `wait_keepalive` is called.
    ///
    /// The interval defaults to 29 minutes as advised by RFC 2177.
    pub fn set_keepalive(&mut self, interval: Duration) {
        self.keepalive = Some(interval);
    }

    /// Block until the selected mailbox changes.
    ///
    /// This method differs from [`Handle::wait`] in that it will
    /// periodically refresh the IDLE connection, to prevent the server from
    /// timing out our connection. The keepalive interval is set to 29
    /// minutes by default, as advised by RFC 2177, but can be changed using
    /// [`Handle::set_keepalive`].
    ///
    /// This is the recommended method to use for waiting.
    pub fn wait_keepalive(mut self) -> Result<()> {
        let keepalive = *self
            .keepalive
            .get_or_insert_with(|| Duration::from_secs(29 * 60));
        self.wait_timeout(keepalive)
    }

    /// Block until the selected mailbox changes, or until the given amount
    /// of time has expired.
    pub fn wait_timeout(mut self, timeout: Duration) -> Result<()> {
        self.session
            .conn
            .stream_mut()
            .set_read_timeout(Some(timeout))?;
        let res = self.wait_inner();
        let _ = self.session.conn.stream_mut().set_read_timeout(None);
        res
    }
}

impl<'a, T: Read + Write + 'a> Drop for Handle<'a, T> {
    fn drop(&mut self) {
        // we don't want to panic here if we can't terminate the Idle
        // If we sent DONE, then we should suck up the resulting OK.
        if let Ok(true) = self.terminate() {
            let mut tx = self.session.unsolicited_tx.clone();
            let mut buffer = Vec::new();
            loop {
                if self.session.conn.readline(&mut buffer).is_err() {
                    break;
                }
                match parse::parse_idle(&buffer, &mut tx) {
                    Ok(true) | Err(_) => break,
                    Ok(false) => buffer.truncate(0),
                }
            }
        }
    }
}

impl SetReadTimeout for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        TcpStream::set_read_timeout(self, timeout).map_err(Error::Io)
    }
}

#[cfg(feature = "native-tls")]
impl<T: SetReadTimeout + Read + Write> SetReadTimeout for TlsStream<T> {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.get_mut().set_read_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::mock_stream::MockStream;
    use crate::types::UnsolicitedResponse;

    #[test]
    fn idle_wait_routes_updates() {
        let response = "a1 OK [CAPABILITY IMAP4rev1 IDLE] hi\r\n\
                        + idling\r\n\
                        * 4 EXISTS\r\n\
                        a2 OK IDLE terminated\r\n";
        let client = Client::new(MockStream::new(response.as_bytes().to_vec()));
        let mut session = client.login("u", "p").unwrap();
        session.idle().unwrap().wait().unwrap();

        let written = String::from_utf8_lossy(&session.stream_ref().written_buf).to_string();
        assert!(written.ends_with("a2 IDLE\r\nDONE\r\n"));
        assert_eq!(
            session.unsolicited_responses.try_recv(),
            Ok(UnsolicitedResponse::Exists(4))
        );
    }

    #[test]
    fn idle_refused() {
        let response = "a1 OK [CAPABILITY IMAP4rev1 IDLE] hi\r\n\
                        a2 NO not while busy\r\n";
        let client = Client::new(MockStream::new(response.as_bytes().to_vec()));
        let mut session = client.login("u", "p").unwrap();
        assert!(session.idle().is_err());
    }
}
