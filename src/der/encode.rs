//! Building DER tag-length-value encodings.
//!
//! The reader side works through `Constructed`'s combinators; the write
//! side is simpler since every structure this crate emits is small and
//! fully buffered, so these are plain byte-vector builders rather than a
//! streaming writer.

use super::length::Length;
use super::tag::Tag;

/// Wraps `content` in `tag`'s identifier and length octets.
pub fn wrap(tag: Tag, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + content.len());
    out.push(tag.into_byte());
    out.extend(Length::encode(content.len()));
    out.extend_from_slice(content);
    out
}

/// Concatenates `children` and wraps the result as a SEQUENCE.
pub fn sequence(children: &[Vec<u8>]) -> Vec<u8> {
    let content: Vec<u8> = children.iter().flat_map(|c| c.iter().copied()).collect();
    wrap(Tag::SEQUENCE, &content)
}

/// The DER encoding of a NULL value.
pub fn null() -> Vec<u8> {
    wrap(Tag::NULL, &[])
}
