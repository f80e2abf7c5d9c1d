//! Errors produced while reading DER.

use std::fmt;

//------------ Error ---------------------------------------------------------

/// Something went wrong decoding a DER value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The encoding does not follow the rules for DER.
    Malformed,

    /// The encoding uses a DER feature this reader doesn't implement.
    Unimplemented,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Malformed => write!(f, "malformed DER content"),
            Error::Unimplemented => write!(f, "unimplemented DER feature"),
        }
    }
}

impl std::error::Error for Error {}
