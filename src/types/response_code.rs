/// Response code that may be sent with `OK`/`NO`/`BAD`/`BYE` responses.
/// See [RFC 3501 section 7.1](https://tools.ietf.org/html/rfc3501#section-7.1)
/// and the registries added by later extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseCode {
    /// Advisory text the user must be shown.
    Alert,
    /// The charset used in a `SEARCH` is not supported; optionally lists the
    /// charsets that are.
    BadCharset(Vec<String>),
    /// The server's capability list, sent without a separate `CAPABILITY`
    /// command.
    Capability(Vec<String>),
    /// The server had trouble parsing a message's headers.
    Parse,
    /// Flags that can be changed permanently. May include `\*`.
    PermanentFlags(Vec<String>),
    /// The mailbox is open read-only.
    ReadOnly,
    /// The mailbox is open read-write.
    ReadWrite,
    /// The operation can succeed after creating the target mailbox.
    TryCreate,
    /// Next unique identifier value.
    UidNext(u32),
    /// The unique identifier validity value.
    UidValidity(u32),
    /// Sequence number of the first message without the `\Seen` flag.
    Unseen(u32),
    /// UIDPLUS (RFC 4315): uidvalidity plus the UIDs assigned to appended
    /// messages.
    AppendUid(u32, Vec<u32>),
    /// UIDPLUS (RFC 4315): uidvalidity, source UIDs, and the destination
    /// UIDs a `COPY` assigned to them.
    CopyUid(u32, Vec<u32>, Vec<u32>),
    /// The mailbox does not keep UIDs stable; UIDPLUS responses are not
    /// available.
    UidNotSticky,
    /// CONDSTORE (RFC 7162): highest mod-sequence of the mailbox.
    HighestModSeq(u64),
    /// CONDSTORE (RFC 7162): the mailbox does not support mod-sequences.
    NoModSeq,
    /// METADATA (RFC 5464): size of the largest entry value that exceeded
    /// the client's `MAXSIZE`.
    MetadataLongEntries(u64),
    /// METADATA (RFC 5464): largest value size the server accepts.
    MetadataMaxSize(u64),
    /// METADATA (RFC 5464): too many annotations.
    MetadataTooMany,
    /// METADATA (RFC 5464): the server does not support private annotations.
    MetadataNoPrivate,
    /// A response code this client has no specific knowledge of; carries the
    /// code atom and its raw arguments.
    Other(String, Option<String>),
}
