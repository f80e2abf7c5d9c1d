//! A view into a sequence of octets being decoded.

use bytes::Bytes;
use std::cmp::min;
use super::error::Error;

//------------ Source ------------------------------------------------------

/// A source is a forward-only view into a sequence of octets.
pub trait Source {
    /// The error produced by the source.
    ///
    /// Must wrap [`der::Error`](super::Error) so that failures deep in
    /// the DER reader propagate through whatever source-specific error
    /// a caller's `Source` impl wants to add (there are none of those
    /// here; `Bytes` is the only source this crate decodes from).
    type Err: From<Error>;

    /// Returns the number of bytes actually available, requesting at
    /// least `len` if possible.
    fn request(&mut self, len: usize) -> Result<usize, Self::Err>;

    /// Advances the source by `len` bytes.
    fn advance(&mut self, len: usize) -> Result<(), Self::Err>;

    /// Returns a slice of the currently available data.
    fn slice(&self) -> &[u8];

    /// Takes the next byte from the source.
    fn take_u8(&mut self) -> Result<u8, Self::Err> {
        if self.request(1)? < 1 {
            return Err(Error::Malformed.into());
        }
        let res = self.slice()[0];
        self.advance(1)?;
        Ok(res)
    }
}

impl Source for Bytes {
    type Err = Error;

    fn request(&mut self, _len: usize) -> Result<usize, Self::Err> {
        Ok(self.len())
    }

    fn advance(&mut self, len: usize) -> Result<(), Self::Err> {
        if len > self.len() {
            return Err(Error::Malformed);
        }
        *self = self.split_off(len);
        Ok(())
    }

    fn slice(&self) -> &[u8] {
        self.as_ref()
    }
}


//------------ LimitedSource ------------------------------------------------

/// Wraps a [`Source`], capping how much of it a nested value may read.
///
/// This is how the reader enforces that a constructed value's content
/// does not run past the length given in its own header, mirroring the
/// `LimitedSource` used throughout the upstream BER reader this module
/// is descended from.
pub struct LimitedSource<S> {
    source: S,
    limit: Option<usize>,
}

impl<S> LimitedSource<S> {
    pub fn new(source: S) -> Self {
        LimitedSource { source, limit: None }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn limit_further(&mut self, limit: usize) -> Option<usize> {
        if let Some(cur) = self.limit {
            assert!(limit <= cur, "nested value longer than its container");
        }
        std::mem::replace(&mut self.limit, Some(limit))
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit
    }
}

impl<S: Source> LimitedSource<S> {
    pub fn exhausted(&mut self) -> Result<(), S::Err> {
        match self.limit {
            Some(0) => Ok(()),
            Some(_) => Err(Error::Malformed.into()),
            None => {
                if self.source.request(1)? == 0 {
                    Ok(())
                } else {
                    Err(Error::Malformed.into())
                }
            }
        }
    }

    pub fn take_all(&mut self) -> Result<Bytes, S::Err>
    where
        S: SourceBytes,
    {
        let limit = self.limit.unwrap_or(0);
        if self.source.request(limit)? < limit {
            return Err(Error::Malformed.into());
        }
        let res = self.source.take_bytes(limit)?;
        self.limit = Some(0);
        Ok(res)
    }
}

impl<S: Source> Source for LimitedSource<S> {
    type Err = S::Err;

    fn request(&mut self, len: usize) -> Result<usize, Self::Err> {
        match self.limit {
            Some(limit) => Ok(min(limit, self.source.request(min(limit, len))?)),
            None => self.source.request(len),
        }
    }

    fn advance(&mut self, len: usize) -> Result<(), Self::Err> {
        if let Some(limit) = self.limit {
            if len > limit {
                return Err(Error::Malformed.into());
            }
            self.limit = Some(limit - len);
        }
        self.source.advance(len)
    }

    fn slice(&self) -> &[u8] {
        let res = self.source.slice();
        match self.limit {
            Some(limit) if res.len() > limit => &res[..limit],
            _ => res,
        }
    }
}

/// A source that can hand out an owned copy of its next `len` bytes.
///
/// Only `Bytes` needs this (it's the only source type this crate reads
/// from); kept as a separate trait so `LimitedSource::take_all` doesn't
/// have to require it of sources that never need to capture raw octets.
pub trait SourceBytes: Source {
    fn take_bytes(&mut self, len: usize) -> Result<Bytes, Self::Err>;
}

impl SourceBytes for Bytes {
    fn take_bytes(&mut self, len: usize) -> Result<Bytes, Self::Err> {
        if len > self.len() {
            return Err(Error::Malformed);
        }
        Ok(self.split_to(len))
    }
}

impl<S: SourceBytes> SourceBytes for LimitedSource<S> {
    fn take_bytes(&mut self, len: usize) -> Result<Bytes, Self::Err> {
        if let Some(limit) = self.limit {
            if len > limit {
                return Err(Error::Malformed.into());
            }
        }
        let res = self.source.take_bytes(len)?;
        if let Some(limit) = self.limit {
            self.limit = Some(limit - len);
        }
        Ok(res)
    }
}
