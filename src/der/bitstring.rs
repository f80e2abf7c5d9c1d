//! The BIT STRING primitive.
//!
//! RFC 3779 encodes every IP address and range endpoint as a BIT STRING:
//! the first content octet gives the number of unused bits in the last
//! octet, the rest are the bits themselves, most significant bit first.
//! This module only decodes the primitive form, which is all DER allows.

use bytes::Bytes;
use super::content::{Constructed, Content};
use super::encode;
use super::error::Error;
use super::source::{Source, SourceBytes};
use super::tag::Tag;

//------------ BitString -------------------------------------------------

/// A BIT STRING value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last octet, `0..=7`.
    unused: u8,

    /// The octets of the bit string, most significant bit first.
    bits: Bytes,
}

impl BitString {
    /// Builds a bit string directly, for the encode path.
    ///
    /// `unused` must be in `0..=7`; callers (`addr::bitstr`) are
    /// responsible for that invariant, same as the upstream reader
    /// leaves range checks like this to its callers.
    pub fn new(unused: u8, bits: Bytes) -> Self {
        debug_assert!(unused < 8);
        BitString { unused, bits }
    }

    pub fn unused(&self) -> u8 {
        self.unused
    }

    pub fn octet_len(&self) -> usize {
        self.bits.len()
    }

    pub fn octets(&self) -> &[u8] {
        self.bits.as_ref()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bits
    }

    /// Encodes this value as a primitive BIT STRING.
    pub fn to_der(&self) -> Vec<u8> {
        let mut content = Vec::with_capacity(1 + self.bits.len());
        content.push(self.unused);
        content.extend_from_slice(&self.bits);
        encode::wrap(Tag::BIT_STRING, &content)
    }
}

/// # Parsing
impl BitString {
    pub fn take_from<S: Source + SourceBytes>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, S::Err> {
        cons.value_if(Tag::BIT_STRING, Self::parse_content)
    }

    pub fn parse_content<S: Source + SourceBytes>(
        content: &mut Content<S>,
    ) -> Result<Self, S::Err> {
        let prim = content.as_primitive()?;
        if prim.remaining() == 0 {
            return Err(Error::Malformed.into());
        }
        let unused = prim.take_u8()?;
        if unused > 7 {
            return Err(Error::Malformed.into());
        }
        let bits = prim.take_all()?;
        if unused > 0 && bits.is_empty() {
            // Unused bits only make sense if there is a last octet for
            // them to belong to.
            return Err(Error::Malformed.into());
        }
        Ok(BitString { unused, bits })
    }
}
