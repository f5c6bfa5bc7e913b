//! Canonical serialization of an event's signable fields.
//!
//! The event id is the SHA-256 digest of the compact JSON array
//! `[0, pubkey, created_at, kind, tags, content]`. Every implementation in
//! the ecosystem must produce the same bytes for the same fields, so the
//! writer here is explicit about escaping instead of relying on a generic
//! serializer's configuration:
//!
//! - `"` and `\` are backslash-escaped
//! - `\b`, `\f`, `\n`, `\r`, `\t` use their short escapes
//! - every other control character below `0x20` becomes `\u00XX` (lowercase hex)
//! - `/` and all non-ASCII characters are written verbatim as UTF-8

use std::fmt::Write;

use super::keys::PublicKey;
use super::tags::Tag;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Serializes the signable fields of an event into canonical bytes.
///
/// Output is the compact JSON array `[0,"<pubkey>",<created_at>,<kind>,<tags>,"<content>"]`
/// with tags in their original order.
///
/// # Example
///
/// ```
/// use courier_core::nostr::codec::serialize;
/// use courier_core::nostr::Keypair;
///
/// let keypair = Keypair::generate();
/// let bytes = serialize(keypair.public_key(), 1_700_000_000, 1, &[], "hi");
/// let expected = format!("[0,\"{}\",1700000000,1,[],\"hi\"]", keypair.public_key().to_hex());
/// assert_eq!(bytes, expected.into_bytes());
/// ```
#[must_use]
pub fn serialize(
    pubkey: &PublicKey,
    created_at: i64,
    kind: u16,
    tags: &[Tag],
    content: &str,
) -> Vec<u8> {
    let mut out = String::with_capacity(96 + content.len() + tags_capacity(tags));

    out.push_str("[0,\"");
    out.push_str(&pubkey.to_hex());
    out.push_str("\",");
    // Writing integers into a String cannot fail.
    let _ = write!(out, "{created_at},{kind},");
    write_tags(&mut out, tags);
    out.push(',');
    write_string(&mut out, content);
    out.push(']');

    out.into_bytes()
}

fn tags_capacity(tags: &[Tag]) -> usize {
    tags.iter()
        .map(|tag| tag.iter().map(|s| s.len() + 3).sum::<usize>() + 2)
        .sum()
}

fn write_tags(out: &mut String, tags: &[Tag]) {
    out.push('[');
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('[');
        for (j, item) in tag.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            write_string(out, item);
        }
        out.push(']');
    }
    out.push(']');
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let b = c as u8;
                out.push_str("\\u00");
                out.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
                out.push(char::from(HEX_DIGITS[usize::from(b & 0x0f)]));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
