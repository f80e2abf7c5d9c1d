//! C8: the configuration-driven builder facade.
//!
//! Mirrors the shape of an `X509V3_EXT_nconf`-style textual config
//! loader: a sequence of `(key, value)` pairs comes in from whatever
//! parses the certificate-extension configuration file, and this module
//! turns each into a family and a prefix, range, or inheritance marker,
//! finishing with a single canonicalisation pass (§4.8).

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::addr::family::{self, FamilyKey, Families, AFI_IPV4, AFI_IPV6};
use crate::addr::primitive::{self, PrefixOrRange};
use crate::addr::{canon, IpAddrBlocks};
use crate::error::Error;

//------------ Builder -----------------------------------------------------

/// Accumulates families from configuration tuples; call [`seal`](Builder::seal)
/// once all values have been ingested.
#[derive(Debug, Default)]
pub struct Builder {
    families: Families,
}

impl Builder {
    pub fn new() -> Self {
        Builder { families: Families::new() }
    }

    /// Ingests one `(key, value)` configuration tuple.
    ///
    /// `key` must be one of `"IPv4"`, `"IPv6"`, `"IPv4-SAFI"`,
    /// `"IPv6-SAFI"`; anything else is rejected.
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let (afi, has_safi) = match key {
            "IPv4" => (AFI_IPV4, false),
            "IPv6" => (AFI_IPV6, false),
            "IPv4-SAFI" => (AFI_IPV4, true),
            "IPv6-SAFI" => (AFI_IPV6, true),
            _ => return Err(Error::Malformed),
        };
        let raw_len = family::raw_len(afi).ok_or(Error::UnsupportedFamily)?;

        let (safi, value) = if has_safi {
            let (safi, rest) = split_safi(value)?;
            (Some(safi), rest)
        } else {
            (None, value)
        };
        let key = FamilyKey::new(afi, safi);

        if value.trim() == "inherit" {
            return self.families.set_inheritance(key);
        }
        let aor = parse_value(value.trim(), afi, raw_len)?;
        self.families.append(key, aor)
    }

    /// Canonicalises the accumulated families and returns the sealed
    /// value. On failure the partial tree is simply dropped with
    /// `self`.
    pub fn seal(self) -> Result<IpAddrBlocks, Error> {
        let families = canon::canonicalise(self.families.into_vec())?;
        Ok(IpAddrBlocks::new(families))
    }
}

/// Splits a `-SAFI` value into its leading SAFI octet and the
/// remaining prefix/range/inherit text, on the first `:`.
fn split_safi(value: &str) -> Result<(u8, &str), Error> {
    let idx = value.find(':').ok_or(Error::BadSafi)?;
    let (safi_part, rest) = value.split_at(idx);
    let rest = rest[1..].trim_start();
    let safi_part = safi_part.trim();
    let safi = if let Some(hex) = safi_part.strip_prefix("0x").or_else(|| safi_part.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|_| Error::BadSafi)?
    } else {
        safi_part.parse::<u16>().ok().and_then(|n| u8::try_from(n).ok()).ok_or(Error::BadSafi)?
    };
    Ok((safi, rest))
}

fn parse_value(value: &str, afi: u16, raw_len: usize) -> Result<PrefixOrRange, Error> {
    if let Some((min_s, max_s)) = value.split_once('-') {
        let min = parse_address(min_s.trim(), afi)?;
        let max = parse_address(max_s.trim(), afi)?;
        return primitive::make_range(&min, &max, raw_len).ok_or(Error::InvalidRange);
    }
    if let Some((addr_s, len_s)) = value.split_once('/') {
        let addr = parse_address(addr_s.trim(), afi)?;
        let prefixlen: usize = len_s.trim().parse().map_err(|_| Error::Malformed)?;
        if prefixlen > 8 * raw_len {
            return Err(Error::Malformed);
        }
        return primitive::make_prefix(&addr, prefixlen).ok_or(Error::Malformed);
    }
    let addr = parse_address(value, afi)?;
    primitive::make_prefix(&addr, 8 * raw_len).ok_or(Error::Malformed)
}

fn parse_address(s: &str, afi: u16) -> Result<Vec<u8>, Error> {
    match afi {
        AFI_IPV4 => s.parse::<Ipv4Addr>().map(|a| a.octets().to_vec()).map_err(|_| Error::Malformed),
        AFI_IPV6 => s.parse::<Ipv6Addr>().map(|a| a.octets().to_vec()).map_err(|_| Error::Malformed),
        _ => Err(Error::UnsupportedFamily),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_single_prefix() {
        let mut b = Builder::new();
        b.add("IPv4", "10.0.0.0/24").unwrap();
        let blocks = b.seal().unwrap();
        assert!(blocks.is_canonical());
        assert_eq!(blocks.families().len(), 1);
    }

    #[test]
    fn builds_and_merges_adjacent_prefixes() {
        let mut b = Builder::new();
        b.add("IPv4", "10.0.0.0/25").unwrap();
        b.add("IPv4", "10.0.0.128/25").unwrap();
        let blocks = b.seal().unwrap();
        assert_eq!(blocks.families()[0].content().blocks().unwrap().len(), 1);
    }

    #[test]
    fn host_prefix_defaults_to_full_width() {
        let mut b = Builder::new();
        b.add("IPv4", "10.0.0.1").unwrap();
        let blocks = b.seal().unwrap();
        match &blocks.families()[0].content().blocks().unwrap()[0] {
            PrefixOrRange::Prefix(bs) => assert_eq!(crate::addr::bitstr::prefixlen(bs), 32),
            _ => panic!("expected a host prefix"),
        }
    }

    #[test]
    fn range_syntax_builds_a_range_or_collapses() {
        let mut b = Builder::new();
        b.add("IPv4", "10.0.0.0-10.0.0.255").unwrap();
        let blocks = b.seal().unwrap();
        match &blocks.families()[0].content().blocks().unwrap()[0] {
            PrefixOrRange::Prefix(bs) => assert_eq!(crate::addr::bitstr::prefixlen(bs), 24),
            _ => panic!("expected the range to collapse to a prefix"),
        }
    }

    #[test]
    fn inherit_sets_inheritance() {
        let mut b = Builder::new();
        b.add("IPv6", "inherit").unwrap();
        let blocks = b.seal().unwrap();
        assert!(blocks.families()[0].content().is_inherit());
    }

    #[test]
    fn safi_variant_parses_prefix_and_safi() {
        let mut b = Builder::new();
        b.add("IPv4-SAFI", "1: 10.0.0.0/24").unwrap();
        let blocks = b.seal().unwrap();
        assert_eq!(blocks.families()[0].key().safi(), Some(1));
    }

    #[test]
    fn inherit_then_concrete_on_same_family_fails() {
        let mut b = Builder::new();
        b.add("IPv4", "inherit").unwrap();
        assert!(b.add("IPv4", "10.0.0.0/24").is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut b = Builder::new();
        assert!(b.add("IPv5", "10.0.0.0/24").is_err());
    }
}
