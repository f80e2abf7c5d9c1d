//! The OCTET STRING primitive.

use bytes::Bytes;
use super::content::{Constructed, Content};
use super::encode;
use super::source::{Source, SourceBytes};
use super::tag::Tag;

//------------ OctetString -------------------------------------------------

/// An OCTET STRING value.
///
/// Only the primitive encoding is supported, which is all DER allows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OctetString(Bytes);

impl OctetString {
    pub fn new(bytes: Bytes) -> Self {
        OctetString(bytes)
    }

    pub fn to_der(&self) -> Vec<u8> {
        encode::wrap(Tag::OCTET_STRING, &self.0)
    }

    pub fn take_from<S: Source + SourceBytes>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, S::Err> {
        cons.value_if(Tag::OCTET_STRING, Self::parse_content)
    }

    pub fn parse_content<S: Source + SourceBytes>(
        content: &mut Content<S>,
    ) -> Result<Self, S::Err> {
        Ok(OctetString(content.as_primitive()?.take_all()?))
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}
