//! A small, DER-only BER reader.
//!
//! `IPAddrBlocks` and the other RFC 3779 structures are always encoded
//! under DER, never the more permissive BER or CER variants, so this
//! module only implements what DER requires: definite lengths, the
//! primitive encoding of strings, and no indefinite-length constructed
//! values.
//!
//! This is the "opaque ASN.1 DER codec" collaborator: the `addr` module
//! consumes it through `Constructed`'s combinators and never reaches
//! into the wire format itself.

pub use self::bitstring::BitString;
pub use self::content::{Constructed, Content, Primitive};
pub use self::error::Error;
pub use self::length::Length;
pub use self::octetstring::OctetString;
pub use self::source::{Source, SourceBytes};
pub use self::tag::Tag;

pub mod encode;
mod bitstring;
mod content;
mod error;
mod length;
mod octetstring;
mod source;
mod tag;

/// Decodes a complete DER value from `source` with `op`.
pub fn decode<S, F, T>(source: S, op: F) -> Result<T, S::Err>
where
    S: Source,
    F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
{
    content::decode(source, op)
}
