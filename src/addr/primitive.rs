//! C2: prefixes and ranges, and the range-to-prefix collapse rule.

use crate::der::BitString;
use super::bitstr;

//------------ PrefixOrRange --------------------------------------------------

/// One entry in a family's address list: either a single prefix or an
/// arbitrary closed range of addresses.
///
/// `spec.md` §3 requires any range that happens to be exactly a
/// power-of-two-aligned block to be represented as a prefix instead; the
/// only way to construct a `Range` through this module is via
/// [`make_range`], which enforces that by running the collapse test
/// first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrefixOrRange {
    Prefix(BitString),
    Range(BitString, BitString),
}

impl PrefixOrRange {
    pub fn is_range(&self) -> bool {
        matches!(self, PrefixOrRange::Range(..))
    }
}

/// Builds a prefix from `(addr, prefixlen)` (§4.1, §4.2).
pub fn make_prefix(addr: &[u8], prefixlen: usize) -> Option<PrefixOrRange> {
    bitstr::build_prefix(addr, prefixlen).map(PrefixOrRange::Prefix)
}

/// Builds a range (or, if it collapses, a prefix) from raw `min`/`max`
/// endpoints of `raw_len` octets each (§4.2, §4.4).
///
/// Returns `None` if `min > max` lexicographically.
pub fn make_range(
    min_raw: &[u8],
    max_raw: &[u8],
    raw_len: usize,
) -> Option<PrefixOrRange> {
    if min_raw.len() != raw_len || max_raw.len() != raw_len {
        return None;
    }
    if min_raw > max_raw {
        return None;
    }
    if let Some(prefixlen) = collapse(min_raw, max_raw) {
        return make_prefix(min_raw, prefixlen);
    }
    Some(PrefixOrRange::Range(
        bitstr::strip_min(min_raw),
        bitstr::strip_max(max_raw),
    ))
}

/// The range-to-prefix collapse test of §4.4.
///
/// Returns `Some(prefixlen)` if `[min, max]` is exactly the set of
/// addresses sharing a `prefixlen`-bit prefix, `None` otherwise.
/// `min` and `max` must be the same length and `min <= max`.
pub fn collapse(min: &[u8], max: &[u8]) -> Option<usize> {
    debug_assert_eq!(min.len(), max.len());
    let len = min.len();

    // Longest common byte prefix.
    let i = min.iter().zip(max.iter()).take_while(|(a, b)| a == b).count();

    // Longest suffix where min is all-zero and max is all-one.
    let mut j = len;
    while j > i && min[j - 1] == 0x00 && max[j - 1] == 0xFF {
        j -= 1;
    }

    if i < j {
        return None;
    }
    if i > j {
        // i == len: min and max are bytewise identical.
        return Some(i * 8);
    }
    // i == j: the differing byte at index i must be a run of low-order
    // set bits, i.e. 2^k - 1 for some k in 1..=8.
    if i >= len {
        // No differing byte at all -- already handled by i > j above
        // unless min == max exactly, which is i == len == j.
        return Some(i * 8);
    }
    let diff = min[i] ^ max[i];
    if diff == 0 || diff & (diff.wrapping_add(1)) != 0 {
        return None;
    }
    let k = (diff.count_ones()) as u32;
    let mask = diff;
    if min[i] & mask != 0 || max[i] & mask != mask {
        return None;
    }
    Some(i * 8 + (8 - k as usize))
}

/// Expands a prefix-or-range to its `(min, max)` raw endpoints, `raw_len`
/// octets each (§4.2's `extract_min_max`).
pub fn extract_min_max(
    aor: &PrefixOrRange,
    raw_len: usize,
) -> Option<(Vec<u8>, Vec<u8>)> {
    match aor {
        PrefixOrRange::Prefix(bs) => {
            let min = bitstr::expand(bs, raw_len, 0x00)?;
            let max = bitstr::expand(bs, raw_len, 0xFF)?;
            Some((min, max))
        }
        PrefixOrRange::Range(min, max) => {
            let min = bitstr::expand(min, raw_len, 0x00)?;
            let max = bitstr::expand(max, raw_len, 0xFF)?;
            Some((min, max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_aligned_block_is_a_prefix() {
        // 10.0.0.0 - 10.0.0.255 == 10.0.0.0/24
        assert_eq!(collapse(&[10, 0, 0, 0], &[10, 0, 0, 255]), Some(24));
    }

    #[test]
    fn collapse_unaligned_range_is_not_a_prefix() {
        // 10.0.0.0 - 10.0.0.254 is not aligned.
        assert_eq!(collapse(&[10, 0, 0, 0], &[10, 0, 0, 254]), None);
    }

    #[test]
    fn collapse_whole_address_is_a_prefix() {
        assert_eq!(collapse(&[10, 0, 0, 0], &[10, 0, 0, 0]), Some(32));
    }

    #[test]
    fn make_range_collapses_to_prefix() {
        let aor = make_range(&[10, 0, 0, 0], &[10, 0, 0, 255], 4).unwrap();
        match aor {
            PrefixOrRange::Prefix(bs) => {
                assert_eq!(bitstr::prefixlen(&bs), 24);
            }
            PrefixOrRange::Range(..) => panic!("expected a collapsed prefix"),
        }
    }

    #[test]
    fn make_range_rejects_inverted_range() {
        assert!(make_range(&[10, 0, 0, 5], &[10, 0, 0, 1], 4).is_none());
    }

    #[test]
    fn extract_min_max_on_prefix() {
        let aor = make_prefix(&[10, 0, 0, 0], 24).unwrap();
        let (min, max) = extract_min_max(&aor, 4).unwrap();
        assert_eq!(min, vec![10, 0, 0, 0]);
        assert_eq!(max, vec![10, 0, 0, 255]);
    }
}
