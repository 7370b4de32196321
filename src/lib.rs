//! An IMAP4rev1 ([RFC 3501](https://tools.ietf.org/html/rfc3501)) client
//! protocol engine.
//!
//! This crate speaks the IMAP wire protocol over any `Read + Write` stream:
//! it tokenizes the recursive, length-prefixed response format, builds
//! correctly quoted commands from typed data elements, tracks the mapping
//! between UIDs and shifting message sequence numbers, transcodes mailbox
//! names between UTF-8 and modified UTF-7, and drives the command/response
//! state machine with capability-aware query builders for `SEARCH`,
//! `FETCH`, `SORT`, and `THREAD`. The extensions ACL (RFC 4314), METADATA
//! (RFC 5464), CONDSTORE (RFC 7162), NAMESPACE (RFC 2342), THREAD/SORT
//! (RFC 5256), QUOTA (RFC 2087), UIDPLUS (RFC 4315), and IDLE (RFC 2177)
//! are built in.
//!
//! What it deliberately does not do: render MIME bodies, negotiate SASL
//! policy (mechanisms are pluggable pure computations), or manage
//! connection pools. TLS setup is a thin optional layer
//! ([`ClientBuilder`]); everything else consumes an abstract stream.
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "native-tls")]
//! # fn main() -> Result<(), imap_engine::Error> {
//! let client = imap_engine::ClientBuilder::new("imap.example.com", 993).native_tls()?;
//!
//! // the client is unauthenticated; logging in returns a session
//! let mut session = client
//!     .login("ada@example.com", "password")
//!     .map_err(|(e, _client)| e)?;
//!
//! session.select("INBOX")?;
//!
//! // typed query builders serialize to the wire syntax
//! let mut query = imap_engine::SearchQuery::new();
//! query.flag("\\seen", false, false);
//! let unseen = session.uid_search(&query)?;
//!
//! let mut fetch = imap_engine::FetchQuery::new();
//! fetch.uid().flags().body_text(true);
//! for message in session.uid_fetch(&unseen, &fetch)? {
//!     println!("{:?}: {:?}", message.uid, message.flags());
//! }
//!
//! session.logout()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "native-tls"))]
//! # fn main() {}
//! ```
//!
//! Server data not tied to the running command (new-mail notifications,
//! flag changes from other sessions) is delivered through
//! [`Session::unsolicited_responses`]; `[ALERT]` texts accumulate behind
//! [`Session::alerts`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod base_subject;
mod client;
mod client_builder;
mod error;
mod fetch_query;
mod format;
mod ids;
mod parse;
mod search;
mod snapshot;
mod tokenize;
mod utf7;

pub mod authenticator;
pub mod extensions;
pub mod types;

#[cfg(test)]
mod mock_stream;

pub use crate::base_subject::base_subject;
pub use crate::client::{AppendCmd, Client, Connection, SelectedMailbox, Session};
pub use crate::client_builder::ClientBuilder;
pub use crate::error::{Error, ParseError, Result, ServerError, ValidateError};
pub use crate::fetch_query::FetchQuery;
pub use crate::format::Element;
pub use crate::ids::{Ids, IdsMap};
pub use crate::search::{BuiltSearch, DateRange, Interval, ModSeqType, SearchQuery};
pub use crate::snapshot::{Security, SessionSnapshot};
pub use crate::tokenize::{Token, TokenizeError, Tokenizer};
pub use crate::utf7::{utf7imap_to_utf8, utf8_to_utf7imap};
