//! Combinators for walking DER-encoded content.
//!
//! This is a trimmed-down version of the constructed-value combinator
//! style used throughout the upstream BER reader: `Constructed` offers
//! `sequence`/`opt_sequence`/`value_if` methods that each consume one
//! tagged value and hand its content to a closure, so callers read a
//! SEQUENCE the way the ASN.1 module describes it rather than by hand
//! with tags and lengths.

use bytes::Bytes;
use super::error::Error;
use super::length::Length;
use super::source::{LimitedSource, Source, SourceBytes};
use super::tag::Tag;

//------------ Content -------------------------------------------------------

/// The content octets of a DER value: primitive or constructed.
pub enum Content<'a, S: 'a> {
    Primitive(Primitive<'a, S>),
    Constructed(Constructed<'a, S>),
}

impl<'a, S: Source + 'a> Content<'a, S> {
    pub fn as_primitive(&mut self) -> Result<&mut Primitive<'a, S>, S::Err> {
        match self {
            Content::Primitive(inner) => Ok(inner),
            Content::Constructed(_) => Err(Error::Malformed.into()),
        }
    }

    pub fn as_constructed(
        &mut self,
    ) -> Result<&mut Constructed<'a, S>, S::Err> {
        match self {
            Content::Primitive(_) => Err(Error::Malformed.into()),
            Content::Constructed(inner) => Ok(inner),
        }
    }

    fn exhausted(self) -> Result<(), S::Err> {
        match self {
            Content::Primitive(inner) => inner.exhausted(),
            Content::Constructed(mut inner) => inner.exhausted(),
        }
    }
}

//------------ Primitive -----------------------------------------------------

/// A primitive value's content.
pub struct Primitive<'a, S: 'a> {
    source: &'a mut LimitedSource<S>,
}

impl<'a, S: Source + 'a> Primitive<'a, S> {
    pub fn remaining(&self) -> usize {
        self.source.limit().unwrap_or(0)
    }

    pub fn take_u8(&mut self) -> Result<u8, S::Err> {
        self.source.take_u8()
    }

    /// Takes all remaining content octets as an owned `Bytes`.
    pub fn take_all(&mut self) -> Result<Bytes, S::Err>
    where
        S: SourceBytes,
    {
        self.source.take_all()
    }

    fn exhausted(self) -> Result<(), S::Err> {
        self.source.exhausted()
    }
}

//------------ Constructed ----------------------------------------------------

/// A constructed value's content: a sequence of nested tagged values.
pub struct Constructed<'a, S: 'a> {
    source: &'a mut LimitedSource<S>,
}

impl<'a, S: Source + 'a> Constructed<'a, S> {
    fn new(source: &'a mut LimitedSource<S>) -> Self {
        Constructed { source }
    }

    fn is_exhausted(&self) -> bool {
        self.source.limit() == Some(0)
    }

    fn exhausted(&mut self) -> Result<(), S::Err> {
        self.source.exhausted()
    }

    /// Reads the next tagged value, calling `op` with its content.
    ///
    /// If `expected` is given and the next tag doesn't match, returns
    /// `Ok(None)` without consuming anything (used to implement the
    /// `opt_*` family below).
    fn take_value<F, T>(
        &mut self,
        expected: Option<Tag>,
        op: F,
    ) -> Result<Option<T>, S::Err>
    where
        F: FnOnce(Tag, &mut Content<S>) -> Result<T, S::Err>,
    {
        if self.is_exhausted() {
            return Ok(None);
        }
        let (tag, constructed) = Tag::take_from(self.source)?;
        if let Some(expected) = expected {
            if tag != expected {
                return Err(Error::Malformed.into());
            }
        }
        let Length(len) = Length::take_from(self.source)?;
        let old_limit = self.source.limit_further(len);
        let res = {
            let mut content = if constructed {
                Content::Constructed(Constructed::new(self.source))
            } else {
                Content::Primitive(Primitive { source: self.source })
            };
            let res = op(tag, &mut content)?;
            content.exhausted()?;
            res
        };
        self.source.set_limit(old_limit.map(|x| x - len));
        Ok(Some(res))
    }

    pub fn value_if<F, T>(
        &mut self,
        expected: Tag,
        op: F,
    ) -> Result<T, S::Err>
    where
        F: FnOnce(&mut Content<S>) -> Result<T, S::Err>,
    {
        match self.take_value(Some(expected), |_, content| op(content))? {
            Some(res) => Ok(res),
            None => Err(Error::Malformed.into()),
        }
    }

    pub fn opt_value_if<F, T>(
        &mut self,
        expected: Tag,
        op: F,
    ) -> Result<Option<T>, S::Err>
    where
        F: FnOnce(&mut Content<S>) -> Result<T, S::Err>,
    {
        self.take_value(Some(expected), |_, content| op(content))
    }

    pub fn constructed_if<F, T>(
        &mut self,
        expected: Tag,
        op: F,
    ) -> Result<T, S::Err>
    where
        F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
    {
        match self.opt_constructed_if(expected, op)? {
            Some(res) => Ok(res),
            None => Err(Error::Malformed.into()),
        }
    }

    pub fn opt_constructed_if<F, T>(
        &mut self,
        expected: Tag,
        op: F,
    ) -> Result<Option<T>, S::Err>
    where
        F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
    {
        self.take_value(Some(expected), |_, content| {
            op(content.as_constructed()?)
        })
    }

    pub fn sequence<F, T>(&mut self, op: F) -> Result<T, S::Err>
    where
        F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
    {
        self.constructed_if(Tag::SEQUENCE, op)
    }

    pub fn opt_sequence<F, T>(&mut self, op: F) -> Result<Option<T>, S::Err>
    where
        F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
    {
        self.opt_constructed_if(Tag::SEQUENCE, op)
    }

    /// Reads the next value whatever its tag, handing both over to `op`.
    ///
    /// Used for `IPAddressChoice`, which is a `CHOICE` between `NULL`
    /// (inherit) and a `SEQUENCE` (concrete blocks).
    pub fn take_value_any<F, T>(&mut self, op: F) -> Result<T, S::Err>
    where
        F: FnOnce(Tag, &mut Content<S>) -> Result<T, S::Err>,
    {
        match self.take_value(None, op)? {
            Some(res) => Ok(res),
            None => Err(Error::Malformed.into()),
        }
    }

    pub fn opt_value_any<F, T>(&mut self, op: F) -> Result<Option<T>, S::Err>
    where
        F: FnOnce(Tag, &mut Content<S>) -> Result<T, S::Err>,
    {
        self.take_value(None, op)
    }
}

//------------ entry point ----------------------------------------------------

pub fn decode<S, F, T>(source: S, op: F) -> Result<T, S::Err>
where
    S: Source,
    F: FnOnce(&mut Constructed<S>) -> Result<T, S::Err>,
{
    let mut source = LimitedSource::new(source);
    source.set_limit(None);
    let mut cons = Constructed { source: &mut source };
    let res = op(&mut cons)?;
    cons.exhausted()?;
    Ok(res)
}
