//! The identifier octet of a DER value.

use std::fmt;
use super::error::Error;
use super::source::Source;

//------------ Tag -------------------------------------------------------

/// The identifier octet of an encoded value, aka its tag.
///
/// Multi-byte (high-tag-number) tags are not supported; none of the
/// structures this crate decodes need them.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    const CONSTRUCTED: u8 = 0x20;

    pub const NULL: Self = Tag(0x05);
    pub const BIT_STRING: Self = Tag(0x03);
    pub const OCTET_STRING: Self = Tag(0x04);
    pub const SEQUENCE: Self = Tag(Tag::CONSTRUCTED | 0x10);

    /// Reads the tag octet, along with whether the value is constructed.
    ///
    /// The constructed bit stays part of the stored value, same as the
    /// `SEQUENCE` constant above bakes it in: a constructed tag never
    /// compares equal to its primitive counterpart.
    pub fn take_from<S: Source>(
        source: &mut S,
    ) -> Result<(Self, bool), S::Err> {
        let byte = source.take_u8()?;
        if byte & 0x1F == 0x1F {
            return Err(Error::Unimplemented.into());
        }
        Ok((Tag(byte), byte & Tag::CONSTRUCTED != 0))
    }

    /// The raw identifier octet, for the encode path.
    pub fn into_byte(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::NULL => write!(f, "NULL"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag(byte) => write!(f, "Tag(0x{:02x})", byte),
        }
    }
}
