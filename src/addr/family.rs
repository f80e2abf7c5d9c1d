//! C3: address family keys and the per-extension family container.
//!
//! An `addressFamily` is a 2-byte big-endian AFI optionally followed by a
//! 1-byte SAFI, carried on the wire as a 2- or 3-octet OCTET STRING.

use std::cmp::Ordering;
use std::fmt;
use log::debug;
use crate::error::Error;
use super::primitive::PrefixOrRange;

/// IANA AFI for IPv4, per RFC 3779 Appendix B.
pub const AFI_IPV4: u16 = 1;
/// IANA AFI for IPv6, per RFC 3779 Appendix B.
pub const AFI_IPV6: u16 = 2;

/// The raw address length in octets for a known AFI.
///
/// `None` for any AFI this crate doesn't know the width of; decode,
/// canonical-form structure checks, and presentation's family-name
/// rendering all tolerate that, but containment and address expansion
/// need a concrete width and fail on it (`Error::UnsupportedFamily`).
pub fn raw_len(afi: u16) -> Option<usize> {
    match afi {
        AFI_IPV4 => Some(4),
        AFI_IPV6 => Some(16),
        _ => None,
    }
}

//------------ FamilyKey ------------------------------------------------------

/// The `(AFI, optional SAFI)` key identifying one address family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FamilyKey {
    afi: u16,
    safi: Option<u8>,
}

impl FamilyKey {
    pub fn new(afi: u16, safi: Option<u8>) -> Self {
        FamilyKey { afi, safi }
    }

    pub fn afi(&self) -> u16 {
        self.afi
    }

    pub fn safi(&self) -> Option<u8> {
        self.safi
    }

    pub fn raw_len(&self) -> Option<usize> {
        raw_len(self.afi)
    }

    /// The 2- or 3-octet `addressFamily` encoding of this key.
    pub fn to_octets(&self) -> Vec<u8> {
        let mut out = self.afi.to_be_bytes().to_vec();
        if let Some(safi) = self.safi {
            out.push(safi);
        }
        out
    }

    /// Parses a 2- or 3-octet `addressFamily` value.
    pub fn from_octets(octets: &[u8]) -> Option<Self> {
        match octets.len() {
            2 => Some(FamilyKey::new(
                u16::from_be_bytes([octets[0], octets[1]]),
                None,
            )),
            3 => Some(FamilyKey::new(
                u16::from_be_bytes([octets[0], octets[1]]),
                Some(octets[2]),
            )),
            _ => None,
        }
    }
}

/// Orders two `addressFamily` octet strings lexicographically, with the
/// shorter string sorting first when one is a prefix of the other (so a
/// family with no SAFI sorts before the same AFI with any SAFI) --
/// `spec.md` §3 and §4.4, preserved from RFC 3779 Appendix B's examples.
impl Ord for FamilyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_octets().cmp(&other.to_octets())
    }
}

impl PartialOrd for FamilyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.safi {
            Some(safi) => write!(f, "AFI {}/SAFI {}", self.afi, safi),
            None => write!(f, "AFI {}", self.afi),
        }
    }
}

//------------ FamilyContent --------------------------------------------------

/// What a family holds: either "inherit the issuer's resources" or a
/// concrete, non-empty list of prefixes and ranges.
///
/// `spec.md` §3 requires exactly one representation per family; an empty
/// `Blocks` list is never constructed by this module (it is rejected at
/// the one place that would produce it, [`Families::append_prefix`] and
/// friends don't create empty lists, and the canonical-form check in
/// `addr::canon` treats an empty list as non-canonical per invariant
/// I1-I5's "Empty prefix-or-range lists are non-canonical").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FamilyContent {
    Inherit,
    Blocks(Vec<PrefixOrRange>),
}

impl FamilyContent {
    pub fn is_inherit(&self) -> bool {
        matches!(self, FamilyContent::Inherit)
    }

    pub fn blocks(&self) -> Option<&[PrefixOrRange]> {
        match self {
            FamilyContent::Inherit => None,
            FamilyContent::Blocks(v) => Some(v),
        }
    }
}

//------------ Family ----------------------------------------------------------

/// One `IPAddressFamily` entry: a key plus its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Family {
    key: FamilyKey,
    content: FamilyContent,
}

impl Family {
    pub fn new(key: FamilyKey, content: FamilyContent) -> Self {
        Family { key, content }
    }

    pub fn key(&self) -> FamilyKey {
        self.key
    }

    pub fn content(&self) -> &FamilyContent {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut FamilyContent {
        &mut self.content
    }

    pub fn into_content(self) -> FamilyContent {
        self.content
    }
}

//------------ Families ---------------------------------------------------

/// A growable, as-yet-unsorted set of families under construction.
///
/// Mirrors the `get_or_create`/`set_inheritance`/`append_*` operations
/// `spec.md` §4.3 describes: new families are appended in whatever order
/// the caller (the builder facade, or decode) discovers them, and
/// `addr::canon::canonicalise` sorts and merges them afterwards.
#[derive(Clone, Debug, Default)]
pub struct Families(Vec<Family>);

impl Families {
    pub fn new() -> Self {
        Families(Vec::new())
    }

    pub fn into_vec(self) -> Vec<Family> {
        self.0
    }

    fn position(&self, key: FamilyKey) -> Option<usize> {
        self.0.iter().position(|f| f.key == key)
    }

    /// Returns the index of the family for `key`, creating an empty
    /// concrete one if none exists yet.
    pub fn get_or_create(&mut self, key: FamilyKey) -> usize {
        match self.position(key) {
            Some(idx) => idx,
            None => {
                self.0.push(Family::new(key, FamilyContent::Blocks(Vec::new())));
                self.0.len() - 1
            }
        }
    }

    /// Marks the family for `key` as inheriting.
    ///
    /// Fails if the family already holds concrete prefixes or ranges;
    /// idempotent if it is already inheriting.
    pub fn set_inheritance(&mut self, key: FamilyKey) -> Result<(), Error> {
        let idx = self.get_or_create(key);
        let family = &mut self.0[idx];
        match &family.content {
            FamilyContent::Inherit => Ok(()),
            FamilyContent::Blocks(v) if v.is_empty() => {
                family.content = FamilyContent::Inherit;
                Ok(())
            }
            FamilyContent::Blocks(_) => {
                debug!("{}: cannot inherit, already has concrete resources", key);
                Err(Error::Inherited)
            }
        }
    }

    /// Appends a prefix-or-range to the family for `key`.
    ///
    /// Fails if the family is in inheritance mode.
    pub fn append(&mut self, key: FamilyKey, aor: PrefixOrRange) -> Result<(), Error> {
        let idx = self.get_or_create(key);
        match &mut self.0[idx].content {
            FamilyContent::Inherit => {
                debug!("{}: cannot add resources, family inherits", key);
                Err(Error::Inherited)
            }
            FamilyContent::Blocks(v) => {
                v.push(aor);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_key_sorts_first() {
        let no_safi = FamilyKey::new(AFI_IPV4, None);
        let with_safi = FamilyKey::new(AFI_IPV4, Some(1));
        assert!(no_safi < with_safi);
    }

    #[test]
    fn ipv4_sorts_before_ipv6() {
        let v4 = FamilyKey::new(AFI_IPV4, None);
        let v6 = FamilyKey::new(AFI_IPV6, None);
        assert!(v4 < v6);
    }

    #[test]
    fn octets_roundtrip() {
        let key = FamilyKey::new(AFI_IPV4, Some(7));
        assert_eq!(FamilyKey::from_octets(&key.to_octets()), Some(key));
    }
}
