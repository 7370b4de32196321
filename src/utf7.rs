//! Mailbox-name charset conversion between UTF-8 and the modified UTF-7
//! encoding of [RFC 3501 section 5.1.3](https://tools.ietf.org/html/rfc3501#section-5.1.3).
//!
//! Modified UTF-7 differs from RFC 2152 UTF-7 in that `&` (not `+`) is the
//! shift character, the base64 alphabet substitutes `,` for `/`, and padding
//! is never emitted. Printable US-ASCII other than `&` is always represented
//! as itself, so encoded names remain safe inside IMAP quoted strings.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const MUTF7: GeneralPurpose = GeneralPurpose::new(
    &alphabet::IMAP_MUTF7,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

fn is_direct(c: char) -> bool {
    // printable US-ASCII 0x20..=0x7e, minus the shift character
    ('\x20'..='\x7e').contains(&c) && c != '&'
}

fn push_encoded_run(out: &mut String, run: &str) {
    let mut units = Vec::with_capacity(run.len() * 2);
    for unit in run.encode_utf16() {
        units.extend_from_slice(&unit.to_be_bytes());
    }
    out.push('&');
    out.push_str(&MUTF7.encode(units));
    out.push('-');
}

/// Convert a UTF-8 string into a modified UTF-7 (UTF7-IMAP) mailbox name.
///
/// When `ampersand_aware` is true (the normal case), every `&` in the input
/// is plain text and becomes `&-`. When false, the input is assumed to be
/// partially encoded already: any `&...-` run present in the input is passed
/// through unchanged, so re-encoding mixed legacy input does not
/// double-encode it.
pub fn utf8_to_utf7imap(s: &str, ampersand_aware: bool) -> String {
    if !ampersand_aware {
        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(amp) = rest.find('&') {
            out.push_str(&utf8_to_utf7imap(&rest[..amp], true));
            match rest[amp + 1..].find('-') {
                Some(dash) => {
                    // an existing shift sequence; keep it verbatim
                    out.push_str(&rest[amp..=amp + 1 + dash]);
                    rest = &rest[amp + 2 + dash..];
                }
                None => {
                    // unterminated ampersand, encode the remainder normally
                    out.push_str(&utf8_to_utf7imap(&rest[amp..], true));
                    return out;
                }
            }
        }
        out.push_str(&utf8_to_utf7imap(rest, true));
        return out;
    }

    let mut out = String::with_capacity(s.len());
    let mut run = String::new();
    for c in s.chars() {
        if is_direct(c) {
            if !run.is_empty() {
                push_encoded_run(&mut out, &run);
                run.clear();
            }
            out.push(c);
        } else if c == '&' {
            if !run.is_empty() {
                push_encoded_run(&mut out, &run);
                run.clear();
            }
            out.push_str("&-");
        } else {
            run.push(c);
        }
    }
    if !run.is_empty() {
        push_encoded_run(&mut out, &run);
    }
    out
}

fn decode_run(b64: &str) -> Option<String> {
    let bytes = MUTF7.decode(b64).ok()?;
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Convert a modified UTF-7 (UTF7-IMAP) mailbox name back to UTF-8.
///
/// `&-` decodes to `&`. Unterminated or otherwise malformed shift sequences
/// are passed through literally rather than failing; servers in the wild do
/// produce names that only look like UTF7-IMAP.
pub fn utf7imap_to_utf8(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(dash) = rest[1..].find('-') else {
            // unterminated shift sequence
            out.push_str(rest);
            return out;
        };
        let run = &rest[1..=dash];
        if run.is_empty() {
            out.push('&');
        } else {
            match decode_run(run) {
                Some(decoded) => out.push_str(&decoded),
                None => out.push_str(&rest[..=dash + 1]),
            }
        }
        rest = &rest[dash + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_plain_ascii() {
        assert_eq!(utf8_to_utf7imap("INBOX.Sent", true), "INBOX.Sent");
    }

    #[test]
    fn encode_accented() {
        assert_eq!(utf8_to_utf7imap("Envoyé", true), "Envoy&AOk-");
    }

    #[test]
    fn encode_ampersand() {
        assert_eq!(utf8_to_utf7imap("&", true), "&-");
        assert_eq!(utf8_to_utf7imap("Lost & Found", true), "Lost &- Found");
    }

    #[test]
    fn encode_consecutive_nonascii_single_run() {
        assert_eq!(utf8_to_utf7imap("théâtre", true), "th&AOkA4g-tre");
    }

    #[test]
    fn encode_multibyte() {
        assert_eq!(
            utf8_to_utf7imap("Отправленные", true),
            "&BB4EQgQ,BEAEMAQyBDsENQQ9BD0ESwQ1-"
        );
    }

    #[test]
    fn encode_supplementary_plane() {
        // surrogate pair on the wire
        assert_eq!(utf8_to_utf7imap("😀", true), "&2D3eAA-");
    }

    #[test]
    fn encode_not_ampersand_aware_is_idempotent() {
        assert_eq!(utf8_to_utf7imap("Envoy&AOk-", false), "Envoy&AOk-");
        assert_eq!(utf8_to_utf7imap("&-", false), "&-");
        // mixed input: the raw part is encoded, the encoded part kept
        assert_eq!(utf8_to_utf7imap("é&AOk-", false), "&AOk-&AOk-");
    }

    #[test]
    fn decode_plain_ascii() {
        assert_eq!(utf7imap_to_utf8("INBOX.Sent"), "INBOX.Sent");
    }

    #[test]
    fn decode_ampersand() {
        assert_eq!(utf7imap_to_utf8("&-"), "&");
        assert_eq!(utf7imap_to_utf8("Lost &- Found"), "Lost & Found");
    }

    #[test]
    fn decode_accented() {
        assert_eq!(utf7imap_to_utf8("Envoy&AOk-"), "Envoyé");
        assert_eq!(utf7imap_to_utf8("th&AOkA4g-tre"), "théâtre");
    }

    #[test]
    fn decode_split_runs() {
        assert_eq!(utf7imap_to_utf8("&AWA-iuk&AWE-liad&ARcBfgEX-"), "Šiukšliadėžė");
    }

    #[test]
    fn decode_malformed_passes_through() {
        // unterminated shift
        assert_eq!(utf7imap_to_utf8("Foo&Bar"), "Foo&Bar");
        // interior is not modified base64
        assert_eq!(utf7imap_to_utf8("Foo&!!-Bar"), "Foo&!!-Bar");
        // odd number of UTF-16 bytes
        assert_eq!(utf7imap_to_utf8("&AO-"), "&AO-");
    }

    #[test]
    fn round_trip() {
        for s in [
            "INBOX",
            "Envoyé",
            "Отправленные",
            "mail & more",
            "日本語フォルダ",
            "a&b&c",
            "",
        ] {
            assert_eq!(utf7imap_to_utf8(&utf8_to_utf7imap(s, true)), s);
        }
    }
}
