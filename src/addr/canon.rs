//! C4: ordering, canonicalisation, and the canonical-form check.
//!
//! Grounded on OpenBSD's `x509_addr.c` (`X509v3_addr_canonize`,
//! `X509v3_addr_is_canonical`, `IPAddressOrRanges_canonize`): sort each
//! family's list, merge adjacent entries, reject overlaps and inverted
//! ranges, then sort the family list itself.

use std::cmp::Ordering;
use log::debug;
use crate::error::Error;
use super::bitstr;
use super::family::{Family, FamilyContent};
use super::primitive::{self, PrefixOrRange};

/// Compares two prefix-or-range values the way `spec.md` §4.4 describes:
/// by their expanded `min`, then (ties only possible between a prefix
/// and a range sharing a start) by specificity, with a range always
/// counted as "maximally specific" at its start.
///
/// Returns `Ordering::Less` if either side's bit-string fails to expand
/// (corrupt input the canonical-form check will reject regardless).
pub fn cmp_aor(a: &PrefixOrRange, b: &PrefixOrRange, raw_len: usize) -> Ordering {
    let a_min = primitive::extract_min_max(a, raw_len).map(|(min, _)| min);
    let b_min = primitive::extract_min_max(b, raw_len).map(|(min, _)| min);
    match (a_min, b_min) {
        (Some(a_min), Some(b_min)) => match a_min.cmp(&b_min) {
            Ordering::Equal => specificity(a, raw_len).cmp(&specificity(b, raw_len)),
            other => other,
        },
        _ => Ordering::Less,
    }
}

fn specificity(aor: &PrefixOrRange, raw_len: usize) -> usize {
    match aor {
        PrefixOrRange::Prefix(bs) => super::bitstr::prefixlen(bs),
        PrefixOrRange::Range(..) => 8 * raw_len,
    }
}

/// Decrements a big-endian byte string by one.
///
/// Returns `None` on underflow (all-zero input) rather than wrapping --
/// see `spec.md` §9's note that the source's in-place decrement of an
/// all-zero `b_min` is treated here as "not adjacent".
fn decrement(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = bytes.to_vec();
    for byte in out.iter_mut().rev() {
        if *byte == 0 {
            *byte = 0xFF;
        } else {
            *byte -= 1;
            return Some(out);
        }
    }
    None
}

/// Whether `[.., a_max]` and `[b_min, ..]` are exactly adjacent, i.e.
/// `a_max + 1 == b_min`.
fn is_adjacent(a_max: &[u8], b_min: &[u8]) -> bool {
    decrement(b_min).as_deref() == Some(a_max)
}

/// Whether a range's stored `min`/`max` bit strings are already stripped
/// of every trailing all-zero (resp. all-one) octet, i.e. re-deriving
/// them from their own expansion is a no-op (I5; a prefix's bit string
/// has no equivalent freedom, since its length is fixed by its
/// `prefixlen`, so this only applies to `PrefixOrRange::Range`).
fn range_is_minimal(aor: &PrefixOrRange, raw_len: usize) -> bool {
    match aor {
        PrefixOrRange::Prefix(_) => true,
        PrefixOrRange::Range(min, max) => {
            let min_raw = match bitstr::expand(min, raw_len, 0x00) {
                Some(v) => v,
                None => return false,
            };
            let max_raw = match bitstr::expand(max, raw_len, 0xFF) {
                Some(v) => v,
                None => return false,
            };
            bitstr::strip_min(&min_raw) == *min && bitstr::strip_max(&max_raw) == *max
        }
    }
}

/// Canonicalises one family's address list in place (§4.4).
fn canonicalise_list(
    list: &mut Vec<PrefixOrRange>,
    raw_len: usize,
) -> Result<(), Error> {
    if list.is_empty() {
        return Err(Error::NotCanonical);
    }
    list.sort_by(|a, b| cmp_aor(a, b, raw_len));

    let mut i = 0;
    while i + 1 < list.len() {
        let (a_min, a_max) = primitive::extract_min_max(&list[i], raw_len)
            .ok_or(Error::Malformed)?;
        let (b_min, b_max) = primitive::extract_min_max(&list[i + 1], raw_len)
            .ok_or(Error::Malformed)?;
        if a_min > a_max || b_min > b_max {
            debug!("inverted range in address list");
            return Err(Error::InvalidRange);
        }
        if a_max >= b_min {
            debug!("overlapping address ranges");
            return Err(Error::Overlap);
        }
        if is_adjacent(&a_max, &b_min) {
            let merged = primitive::make_range(&a_min, &b_max, raw_len)
                .ok_or(Error::Malformed)?;
            list[i] = merged;
            list.remove(i + 1);
            continue;
        }
        i += 1;
    }

    // The loop above only ever compares consecutive pairs; the last
    // element's own orientation needs a final check when it was never
    // a `b` in a comparison (single-element lists).
    let (min, max) = primitive::extract_min_max(list.last().unwrap(), raw_len)
        .ok_or(Error::Malformed)?;
    if min > max {
        return Err(Error::InvalidRange);
    }
    Ok(())
}

/// Canonicalises a full set of families: each family's list, then the
/// family order itself.
pub fn canonicalise(mut families: Vec<Family>) -> Result<Vec<Family>, Error> {
    for family in &mut families {
        if let FamilyContent::Blocks(list) = family.content_mut() {
            let raw_len = family.key().raw_len().ok_or(Error::UnsupportedFamily)?;
            canonicalise_list(list, raw_len)?;
        }
    }
    families.sort_by_key(|f| f.key());
    Ok(families)
}

/// The canonical-form check of §4.4 (`is_canonical`): true iff every
/// invariant I1-I5 holds already, with no mutation.
pub fn is_canonical(families: &[Family]) -> bool {
    for pair in families.windows(2) {
        if pair[0].key() >= pair[1].key() {
            return false;
        }
    }
    families.iter().all(family_is_canonical)
}

fn family_is_canonical(family: &Family) -> bool {
    let list = match family.content() {
        FamilyContent::Inherit => return true,
        FamilyContent::Blocks(list) => list,
    };
    if list.is_empty() {
        return false;
    }
    let raw_len = match family.key().raw_len() {
        Some(len) => len,
        None => return false,
    };
    for pair in list.windows(2) {
        let (a_min, a_max) = match primitive::extract_min_max(&pair[0], raw_len) {
            Some(v) => v,
            None => return false,
        };
        let (b_min, b_max) = match primitive::extract_min_max(&pair[1], raw_len) {
            Some(v) => v,
            None => return false,
        };
        if a_min > a_max || b_min > b_max {
            return false;
        }
        if a_min >= b_min || a_max >= b_min {
            return false;
        }
        // Adjacency is also non-canonical: it should have been merged.
        if let Some(dec) = decrement(&b_min) {
            if a_max == dec {
                return false;
            }
        }
        if pair[0].is_range() && primitive::collapse(&a_min, &a_max).is_some() {
            return false;
        }
        if !range_is_minimal(&pair[0], raw_len) {
            return false;
        }
    }
    let last = list.last().unwrap();
    let raw = primitive::extract_min_max(last, raw_len);
    match raw {
        Some((min, max)) => {
            if min > max {
                return false;
            }
            if last.is_range() && primitive::collapse(&min, &max).is_some() {
                return false;
            }
            range_is_minimal(last, raw_len)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::family::FamilyKey;
    use crate::addr::primitive::make_prefix;

    fn v4(safi: Option<u8>) -> FamilyKey {
        FamilyKey::new(crate::addr::family::AFI_IPV4, safi)
    }

    #[test]
    fn canonicalise_merges_adjacent_prefixes() {
        let lo = make_prefix(&[10, 0, 0, 0], 25).unwrap();
        let hi = make_prefix(&[10, 0, 0, 128], 25).unwrap();
        let families = vec![Family::new(
            v4(None),
            FamilyContent::Blocks(vec![hi, lo]),
        )];
        let out = canonicalise(families).unwrap();
        let list = out[0].content().blocks().unwrap();
        assert_eq!(list.len(), 1);
        match &list[0] {
            PrefixOrRange::Prefix(bs) => {
                assert_eq!(crate::addr::bitstr::prefixlen(bs), 24);
            }
            _ => panic!("expected merged prefix"),
        }
    }

    #[test]
    fn canonicalise_rejects_overlap() {
        let a = make_prefix(&[10, 0, 0, 0], 24).unwrap();
        let b = make_prefix(&[10, 0, 0, 128], 25).unwrap();
        let families = vec![Family::new(v4(None), FamilyContent::Blocks(vec![a, b]))];
        assert!(canonicalise(families).is_err());
    }

    #[test]
    fn is_canonical_false_on_unsorted_overlap() {
        let a = make_prefix(&[10, 0, 0, 0], 24).unwrap();
        let b = make_prefix(&[10, 0, 0, 128], 25).unwrap();
        let families = vec![Family::new(v4(None), FamilyContent::Blocks(vec![a, b]))];
        assert!(!is_canonical(&families));
    }

    #[test]
    fn is_canonical_true_after_canonicalise() {
        let a = make_prefix(&[10, 0, 0, 0], 25).unwrap();
        let b = make_prefix(&[10, 0, 0, 128], 25).unwrap();
        let families = vec![Family::new(v4(None), FamilyContent::Blocks(vec![a, b]))];
        let out = canonicalise(families).unwrap();
        assert!(is_canonical(&out));
    }

    #[test]
    fn canonicalise_orders_families() {
        let pfx = || make_prefix(&[10, 0, 0, 0], 8).unwrap();
        let v6 = FamilyKey::new(crate::addr::family::AFI_IPV6, None);
        let families = vec![
            Family::new(v6, FamilyContent::Blocks(vec![make_prefix(&[0u8; 16], 8).unwrap()])),
            Family::new(v4(None), FamilyContent::Blocks(vec![pfx()])),
            Family::new(v4(Some(1)), FamilyContent::Blocks(vec![pfx()])),
        ];
        let out = canonicalise(families).unwrap();
        let keys: Vec<_> = out.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec![v4(None), v4(Some(1)), v6]);
    }
}
