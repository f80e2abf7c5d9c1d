//! Error types used across the crate.
//!
//! Mirrors the split `routinator`'s own `error.rs` draws between an
//! already-logged, nothing-more-to-say failure and a classified error a
//! caller can match on: [`der::Error`](crate::der::Error) is the former
//! (codec-level, always logged at the decode call site), [`Error`] is
//! the latter.

use std::fmt;
use crate::der;

//------------ Error -----------------------------------------------------

/// A classified failure from canonicalisation, the builder, or
/// containment checks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The DER encoding was malformed.
    Malformed,

    /// Two entries in a family's address list overlap or are adjacent
    /// without having been merged.
    Overlap,

    /// A range's `min` is greater than its `max`.
    InvalidRange,

    /// A value that was expected to already be in canonical form is not.
    NotCanonical,

    /// A SAFI value outside `0..=255`, or otherwise malformed builder
    /// input.
    BadSafi,

    /// An operation that needs concrete resources was given an
    /// inheriting family.
    Inherited,

    /// The AFI has no defined raw address length.
    UnsupportedFamily,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Malformed => write!(f, "malformed IPAddrBlocks content"),
            Error::Overlap => write!(f, "overlapping or adjacent address ranges"),
            Error::InvalidRange => write!(f, "range minimum exceeds maximum"),
            Error::NotCanonical => write!(f, "value is not in canonical form"),
            Error::BadSafi => write!(f, "invalid SAFI value"),
            Error::Inherited => write!(f, "family uses inheritance"),
            Error::UnsupportedFamily => {
                write!(f, "address family has no known raw address length")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<der::Error> for Error {
    fn from(_: der::Error) -> Error {
        Error::Malformed
    }
}
