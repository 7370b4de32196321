use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;
use std::result;
use std::string::FromUtf8Error;

#[cfg(feature = "native-tls")]
use native_tls::Error as TlsError;
#[cfg(feature = "native-tls")]
use native_tls::HandshakeError as TlsHandshakeError;
#[cfg(feature = "native-tls")]
use std::net::TcpStream;

use crate::types::ResponseCode;

/// A convenience wrapper around `Result` for `imap_engine::Error`.
pub type Result<T> = result::Result<T, Error>;

/// The verbatim text (and optional bracketed response code) of a tagged `NO`,
/// `BAD`, or `BYE` server reply. The server's human-readable text is kept
/// untouched so callers can display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// Response code sent inside `[...]`, if any.
    pub code: Option<ResponseCode>,
    /// Human-readable text from the server.
    pub information: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(ref code) => write!(f, "[{:?}] {}", code, self.information),
            None => f.write_str(&self.information),
        }
    }
}

/// A set of errors that can occur in the IMAP client
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An `io::Error` that occurred while trying to read or write to a network stream.
    Io(IoError),
    /// An error from the `native_tls` library during the TLS handshake.
    #[cfg(feature = "native-tls")]
    TlsHandshake(TlsHandshakeError<TcpStream>),
    /// An error from the `native_tls` library while managing the socket.
    #[cfg(feature = "native-tls")]
    Tls(TlsError),
    /// A `NO` response from the IMAP server.
    No(ServerError),
    /// A `BAD` response from the IMAP server.
    Bad(ServerError),
    /// An unexpected `BYE`: the server is closing the connection.
    Bye(ServerError),
    /// The connection was terminated unexpectedly.
    ConnectionLost,
    /// Error parsing a server response.
    Parse(ParseError),
    /// Command data could not be serialized to the wire without corruption.
    Validate(ValidateError),
    /// The requested operation needs an extension the server does not
    /// advertise. Detected client-side, before anything is sent.
    NoSupport(String),
    /// The server refused the continuation request for an `APPEND`.
    Append,
}

impl Error {
    // Scan failures surface as protocol errors once a response has been
    // fully assembled; an `Incomplete` here means the server lied about a
    // literal length.
    pub(crate) fn from_tokenize(err: crate::tokenize::TokenizeError) -> Error {
        Error::Parse(ParseError::Unexpected(err.to_string()))
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error::Io(err)
    }
}

impl<T> From<bufstream::IntoInnerError<T>> for Error {
    fn from(err: bufstream::IntoInnerError<T>) -> Error {
        Error::Io(err.into())
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Error {
        Error::Validate(err)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Error {
        Error::Parse(ParseError::DataNotUtf8(err))
    }
}

#[cfg(feature = "native-tls")]
impl From<TlsHandshakeError<TcpStream>> for Error {
    fn from(err: TlsHandshakeError<TcpStream>) -> Error {
        Error::TlsHandshake(err)
    }
}

#[cfg(feature = "native-tls")]
impl From<TlsError> for Error {
    fn from(err: TlsError) -> Error {
        Error::Tls(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref e) => fmt::Display::fmt(e, f),
            #[cfg(feature = "native-tls")]
            Error::Tls(ref e) => fmt::Display::fmt(e, f),
            #[cfg(feature = "native-tls")]
            Error::TlsHandshake(ref e) => fmt::Display::fmt(e, f),
            Error::No(ref data) => write!(f, "No Response: {}", data),
            Error::Bad(ref data) => write!(f, "Bad Response: {}", data),
            Error::Bye(ref data) => write!(f, "Bye Response: {}", data),
            Error::ConnectionLost => f.write_str("Connection Lost"),
            Error::Parse(ref e) => fmt::Display::fmt(e, f),
            Error::Validate(ref e) => fmt::Display::fmt(e, f),
            Error::NoSupport(ref ext) => write!(f, "Server does not support {}", ext),
            Error::Append => f.write_str("Could not append mail to mailbox"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            #[cfg(feature = "native-tls")]
            Error::Tls(ref e) => Some(e),
            #[cfg(feature = "native-tls")]
            Error::TlsHandshake(ref e) => Some(e),
            Error::Parse(ParseError::DataNotUtf8(ref e)) => Some(e),
            _ => None,
        }
    }
}

/// An error occurred while decoding a server response into structured data.
/// The connection may still be usable; the current command is not.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The response was syntactically invalid at the wire level.
    Invalid(Vec<u8>),
    /// The response was well-formed but did not have the shape the issued
    /// command calls for.
    Unexpected(String),
    /// The SASL continuation line could not be interpreted.
    Authentication(String),
    /// The response contained data that should be UTF-8, but was not.
    DataNotUtf8(FromUtf8Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseError::Invalid(ref data) => write!(
                f,
                "Unable to parse response: {:?}",
                String::from_utf8_lossy(data)
            ),
            ParseError::Unexpected(ref what) => write!(f, "Unexpected response: {}", what),
            ParseError::Authentication(ref line) => {
                write!(f, "Unable to parse authentication response: {}", line)
            }
            ParseError::DataNotUtf8(_) => f.write_str("Unable to parse data as UTF-8 text"),
        }
    }
}

impl StdError for ParseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            ParseError::DataNotUtf8(ref e) => Some(e),
            _ => None,
        }
    }
}

/// An invalid character was found in data that must go out as an atom or
/// inside a quoted string. This is a purely local input-validation error;
/// nothing is sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateError(pub char);

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // print character in debug form because invalid ones are often whitespaces
        write!(f, "Invalid character in input: {:?}", self.0)
    }
}

impl StdError for ValidateError {}
