/// One annotation entry from the METADATA extension
/// ([RFC 5464](https://tools.ietf.org/html/rfc5464)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Metadata {
    /// The entry name, e.g. `/shared/comment`.
    pub entry: String,
    /// The entry value. `None` removes the entry when passed to
    /// `SETMETADATA`, and marks a nonexistent entry in `GETMETADATA`
    /// results.
    pub value: Option<String>,
}

/// The `DEPTH` parameter of the `GETMETADATA` command.
///
/// When a non-zero depth is specified, the server returns the value of each
/// requested entry plus all entries below it up to the given depth. See
/// [RFC 5464 section 4.2.2](https://tools.ietf.org/html/rfc5464#section-4.2.2).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MetadataDepth {
    /// No entries below the specified entry are returned.
    #[default]
    Zero,
    /// Only entries immediately below the specified entry are returned.
    One,
    /// All entries below the specified entry are returned.
    Infinity,
}

impl MetadataDepth {
    pub(crate) fn depth_str(self) -> &'static str {
        match self {
            MetadataDepth::Zero => "0",
            MetadataDepth::One => "1",
            MetadataDepth::Infinity => "infinity",
        }
    }
}
