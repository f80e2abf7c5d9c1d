//! The length octets of a DER value.

use super::error::Error;
use super::source::Source;

//------------ Length ----------------------------------------------------

/// The length octets of an encoded value.
///
/// DER requires definite lengths encoded in the minimum number of
/// octets; indefinite length is a BER-only feature and is rejected here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Length(pub usize);

impl Length {
    pub fn take_from<S: Source>(source: &mut S) -> Result<Self, S::Err> {
        match source.take_u8()? {
            // Bit 7 clear: this octet alone is the length.
            n if n & 0x80 == 0 => Ok(Length(n as usize)),
            // Bit 7 set and zero otherwise: indefinite form. Not allowed
            // under DER.
            0x80 => Err(Error::Malformed.into()),
            n => {
                let count = (n & 0x7F) as usize;
                if count > std::mem::size_of::<usize>() {
                    return Err(Error::Unimplemented.into());
                }
                let mut len = 0usize;
                for _ in 0..count {
                    len = (len << 8) | source.take_u8()? as usize;
                }
                // DER requires the shortest encoding: a length that
                // would have fit in one octet must not use the long
                // form.
                if len < 0x80 {
                    return Err(Error::Malformed.into());
                }
                Ok(Length(len))
            }
        }
    }

    /// Encodes `len` in the shortest form DER allows.
    pub fn encode(len: usize) -> Vec<u8> {
        if len < 0x80 {
            vec![len as u8]
        } else {
            let bytes = len.to_be_bytes();
            let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
            let significant = &bytes[first..];
            let mut out = Vec::with_capacity(1 + significant.len());
            out.push(0x80 | significant.len() as u8);
            out.extend_from_slice(significant);
            out
        }
    }
}
