//! The `IPAddrBlocks` extension value: decode, encode, and the
//! canonical-form operations built on top of it.
//!
//! ```text
//! IPAddrBlocks       ::= SEQUENCE OF IPAddressFamily
//!
//! IPAddressFamily     ::= SEQUENCE {
//!     addressFamily   OCTET STRING (SIZE (2..3)),
//!     ipAddressChoice IPAddressChoice }
//!
//! IPAddressChoice     ::= CHOICE {
//!     inherit            NULL,
//!     addressesOrRanges  SEQUENCE OF IPAddressOrRange }
//!
//! IPAddressOrRange   ::= CHOICE {
//!     addressPrefix      IPAddress,
//!     addressRange       IPAddressRange }
//!
//! IPAddressRange      ::= SEQUENCE {
//!     min                IPAddress,
//!     max                IPAddress }
//!
//! IPAddress           ::= BIT STRING
//! ```

pub mod bitstr;
pub mod canon;
pub mod contains;
pub mod family;
pub mod primitive;

use bytes::Bytes;
use log::debug;

use crate::der::{self, BitString, Constructed, OctetString, Source, SourceBytes, Tag};
use crate::error::Error;
use family::{Family, FamilyContent, FamilyKey};
use primitive::PrefixOrRange;

//------------ IpAddrBlocks ---------------------------------------------------

/// A decoded `IPAddrBlocks` extension value: the list of address
/// families a certificate carries IP resources for.
#[derive(Clone, Debug, Default)]
pub struct IpAddrBlocks(Vec<Family>);

impl IpAddrBlocks {
    pub fn new(families: Vec<Family>) -> Self {
        IpAddrBlocks(families)
    }

    pub fn families(&self) -> &[Family] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Family> {
        self.0
    }

    pub fn find(&self, key: FamilyKey) -> Option<&Family> {
        contains::find(&self.0, key)
    }

    /// Whether every invariant (I1-I5) already holds, without mutation.
    pub fn is_canonical(&self) -> bool {
        canon::is_canonical(&self.0)
    }

    /// Sorts and merges every family's address list, and the family
    /// order itself, into canonical form.
    pub fn canonicalise(self) -> Result<Self, Error> {
        Ok(IpAddrBlocks(canon::canonicalise(self.0)?))
    }

    /// Whether `self`'s resources are all contained in `other`'s,
    /// family by family.
    pub fn is_subset(&self, other: &IpAddrBlocks) -> Result<bool, Error> {
        contains::is_subset(&self.0, &other.0)
    }

    /// Decodes an `IPAddrBlocks` extension value from its DER content
    /// octets (the OCTET STRING wrapper around the extension is the
    /// caller's concern, not this module's).
    pub fn decode(content: Bytes) -> Result<Self, Error> {
        der::decode(content, |cons| Self::take_from(cons)).map_err(Error::from)
    }

    fn take_from<S: Source<Err = der::Error> + SourceBytes>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, der::Error> {
        cons.sequence(|cons| {
            let mut seen = Vec::new();
            let mut families = Vec::new();
            while let Some(family) = cons.opt_sequence(parse_family)? {
                if seen.contains(&family.key()) {
                    debug!("{}: duplicate IPAddressFamily entry", family.key());
                    return Err(der::Error::Malformed);
                }
                seen.push(family.key());
                families.push(family);
            }
            if families.is_empty() {
                return Err(der::Error::Malformed);
            }
            Ok(IpAddrBlocks(families))
        })
    }

    /// Encodes this value's DER content octets (the `SEQUENCE OF
    /// IPAddressFamily`, without an outer OCTET STRING wrapper).
    pub fn encode(&self) -> Vec<u8> {
        let children: Vec<Vec<u8>> = self.0.iter().map(encode_family).collect();
        der::encode::sequence(&children)
    }
}

fn parse_family<S: Source<Err = der::Error> + SourceBytes>(
    cons: &mut Constructed<S>,
) -> Result<Family, der::Error> {
    let afi = OctetString::take_from(cons)?;
    let key = FamilyKey::from_octets(afi.as_ref()).ok_or(der::Error::Malformed)?;
    let content = cons.take_value_any(|tag, content| {
        if tag == Tag::NULL {
            content.as_primitive()?;
            Ok(FamilyContent::Inherit)
        } else if tag == Tag::SEQUENCE {
            let list = parse_address_list(content.as_constructed()?)?;
            Ok(FamilyContent::Blocks(list))
        } else {
            Err(der::Error::Malformed)
        }
    })?;
    Ok(Family::new(key, content))
}

fn parse_address_list<S: Source<Err = der::Error> + SourceBytes>(
    cons: &mut Constructed<S>,
) -> Result<Vec<PrefixOrRange>, der::Error> {
    let mut list = Vec::new();
    while let Some(aor) = cons.opt_value_any(|tag, content| {
        if tag == Tag::BIT_STRING {
            Ok(PrefixOrRange::Prefix(BitString::parse_content(content)?))
        } else if tag == Tag::SEQUENCE {
            let inner = content.as_constructed()?;
            let min = BitString::take_from(&mut *inner)?;
            let max = BitString::take_from(&mut *inner)?;
            Ok(PrefixOrRange::Range(min, max))
        } else {
            Err(der::Error::Malformed)
        }
    })? {
        list.push(aor);
    }
    if list.is_empty() {
        debug!("empty addressesOrRanges SEQUENCE");
        return Err(der::Error::Malformed);
    }
    Ok(list)
}

fn encode_family(family: &Family) -> Vec<u8> {
    let afi = OctetString::new(Bytes::from(family.key().to_octets()));
    let choice = match family.content() {
        FamilyContent::Inherit => der::encode::null(),
        FamilyContent::Blocks(list) => {
            let children: Vec<Vec<u8>> = list.iter().map(encode_aor).collect();
            der::encode::sequence(&children)
        }
    };
    der::encode::sequence(&[afi.to_der(), choice])
}

fn encode_aor(aor: &PrefixOrRange) -> Vec<u8> {
    match aor {
        PrefixOrRange::Prefix(bs) => bs.to_der(),
        PrefixOrRange::Range(min, max) => {
            der::encode::sequence(&[min.to_der(), max.to_der()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::family::AFI_IPV4;
    use crate::addr::primitive::make_prefix;

    #[test]
    fn roundtrip_single_family() {
        let families = vec![Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()]),
        )];
        let blocks = IpAddrBlocks::new(families);
        let encoded = blocks.encode();
        let decoded = IpAddrBlocks::decode(Bytes::from(encoded)).unwrap();
        assert_eq!(decoded.families().len(), 1);
        assert!(decoded.is_canonical());
    }

    #[test]
    fn roundtrip_inherit() {
        let families = vec![Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Inherit,
        )];
        let blocks = IpAddrBlocks::new(families);
        let encoded = blocks.encode();
        let decoded = IpAddrBlocks::decode(Bytes::from(encoded)).unwrap();
        assert!(decoded.find(FamilyKey::new(AFI_IPV4, None)).unwrap().content().is_inherit());
    }

    #[test]
    fn decode_rejects_duplicate_family() {
        let family = Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()]),
        );
        let encoded = der::encode::sequence(&[encode_family(&family), encode_family(&family)]);
        assert!(IpAddrBlocks::decode(Bytes::from(encoded)).is_err());
    }

    #[test]
    fn decode_rejects_empty_top_level_sequence() {
        let encoded = der::encode::sequence(&[]);
        assert!(IpAddrBlocks::decode(Bytes::from(encoded)).is_err());
    }
}
