use std::io::{Read, Write};
use std::net::TcpStream;

use crate::client::Client;
use crate::error::Result;

#[cfg(feature = "native-tls")]
use native_tls::{TlsConnector, TlsStream};

/// A convenience builder for [`Client`] structs over various encrypted
/// transports.
///
/// Creating a [`Client`] using the `native-tls` transport is
/// straightforward:
/// ```no_run
/// # use imap_engine::ClientBuilder;
/// # fn main() -> Result<(), imap_engine::Error> {
/// let client = ClientBuilder::new("imap.example.com", 993).native_tls()?;
/// # Ok(())
/// # }
/// ```
///
/// To use `STARTTLS`, call `starttls()` before one of the
/// [`Client`]-yielding functions:
/// ```no_run
/// # use imap_engine::ClientBuilder;
/// # fn main() -> Result<(), imap_engine::Error> {
/// let client = ClientBuilder::new("imap.example.com", 143)
///     .starttls()
///     .native_tls()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder<D>
where
    D: AsRef<str>,
{
    domain: D,
    port: u16,
    starttls: bool,
}

impl<D> ClientBuilder<D>
where
    D: AsRef<str>,
{
    /// Make a new `ClientBuilder` using the given domain and port.
    pub fn new(domain: D, port: u16) -> Self {
        ClientBuilder {
            domain,
            port,
            starttls: false,
        }
    }

    /// Use `STARTTLS` for this connection.
    pub fn starttls(&mut self) -> &mut Self {
        self.starttls = true;
        self
    }

    /// Return a new [`Client`] over a plain TCP connection. The greeting
    /// has been read when this returns.
    ///
    /// Only sensible against servers on trusted networks; prefer
    /// [`ClientBuilder::native_tls`].
    pub fn insecure(&mut self) -> Result<Client<TcpStream>> {
        let tcp = TcpStream::connect((self.domain.as_ref(), self.port))?;
        let mut client = Client::new(tcp);
        client.read_greeting()?;
        Ok(client)
    }

    /// Return a new [`Client`] using a `native-tls` transport. The greeting
    /// has been read when this returns.
    #[cfg(feature = "native-tls")]
    pub fn native_tls(&mut self) -> Result<Client<TlsStream<TcpStream>>> {
        self.connect(|domain, tcp| {
            let ssl_conn = TlsConnector::builder().build()?;
            Ok(TlsConnector::connect(&ssl_conn, domain, tcp)?)
        })
    }

    /// Make a [`Client`] using a custom TLS initialization over the
    /// connected TCP socket. Use this if your TLS setup requires private
    /// CAs or other specific parameters.
    ///
    /// If `starttls()` was requested, the `tcp` socket handed to
    /// `handshake` has already negotiated the `STARTTLS` switch.
    pub fn connect<F, C>(&mut self, handshake: F) -> Result<Client<C>>
    where
        F: FnOnce(&str, TcpStream) -> Result<C>,
        C: Read + Write,
    {
        let tcp = if self.starttls {
            let tcp = TcpStream::connect((self.domain.as_ref(), self.port))?;
            let mut client = Client::new(tcp);
            client.read_greeting()?;
            client.run_command_and_check_ok("STARTTLS")?;
            client.into_inner()?
        } else {
            TcpStream::connect((self.domain.as_ref(), self.port))?
        };

        let tls = handshake(self.domain.as_ref(), tcp)?;
        let mut client = Client::new(tls);
        if !self.starttls {
            client.read_greeting()?;
        }
        Ok(client)
    }
}
