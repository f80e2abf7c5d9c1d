//! C5: containment between canonical-form address lists.

use crate::error::Error;
use super::family::FamilyKey;
use super::family::{Family, FamilyContent};
use super::primitive::{self, PrefixOrRange};

/// Whether `child`'s addresses are wholly contained in `parent`'s,
/// given both lists are already in canonical form.
///
/// A linear two-pointer scan over sorted, non-overlapping intervals
/// (§4.5's `addr_contains`).
pub fn addr_contains(
    parent: &[PrefixOrRange],
    child: &[PrefixOrRange],
    raw_len: usize,
) -> Result<bool, Error> {
    let mut p = 0;
    for c in child {
        let (c_min, c_max) =
            primitive::extract_min_max(c, raw_len).ok_or(Error::Malformed)?;
        loop {
            let parent_aor = match parent.get(p) {
                Some(aor) => aor,
                None => return Ok(false),
            };
            let (p_min, p_max) = primitive::extract_min_max(parent_aor, raw_len)
                .ok_or(Error::Malformed)?;
            if p_max < c_max {
                p += 1;
                continue;
            }
            if p_min > c_min {
                return Ok(false);
            }
            break;
        }
    }
    Ok(true)
}

/// `X509v3_addr_subset`: whether every family in `a` is contained in the
/// matching family of `b` (§4.5).
///
/// Trivially true if `a` is empty; false if either side uses
/// inheritance, since inheritance is resolved only by the path
/// validator, never by a static subset test.
pub fn is_subset(a: &[Family], b: &[Family]) -> Result<bool, Error> {
    let inherits = |list: &[Family]| list.iter().any(|f| f.content().is_inherit());
    if inherits(a) || inherits(b) {
        return Ok(false);
    }
    for fa in a {
        let fb = match b.iter().find(|f| f.key() == fa.key()) {
            Some(fb) => fb,
            None => return Ok(false),
        };
        let raw_len = fa.key().raw_len().ok_or(Error::UnsupportedFamily)?;
        let a_list = match fa.content() {
            FamilyContent::Inherit => return Ok(false),
            FamilyContent::Blocks(list) => list,
        };
        let b_list = match fb.content() {
            FamilyContent::Inherit => return Ok(false),
            FamilyContent::Blocks(list) => list,
        };
        if !addr_contains(b_list, a_list, raw_len)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Looks up the family with key `key` in `families`, if any.
pub fn find<'a>(families: &'a [Family], key: FamilyKey) -> Option<&'a Family> {
    families.iter().find(|f| f.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::family::AFI_IPV4;
    use crate::addr::primitive::make_prefix;

    fn key() -> FamilyKey {
        FamilyKey::new(AFI_IPV4, None)
    }

    #[test]
    fn contains_exact_and_subnet() {
        let parent = vec![make_prefix(&[10, 0, 0, 0], 16).unwrap()];
        let child = vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()];
        assert!(addr_contains(&parent, &child, 4).unwrap());
    }

    #[test]
    fn does_not_contain_sibling() {
        let parent = vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()];
        let child = vec![make_prefix(&[10, 0, 1, 0], 24).unwrap()];
        assert!(!addr_contains(&parent, &child, 4).unwrap());
    }

    #[test]
    fn subset_is_reflexive() {
        let list = vec![Family::new(
            key(),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 8).unwrap()]),
        )];
        assert!(is_subset(&list, &list).unwrap());
    }

    #[test]
    fn subset_false_when_family_missing() {
        let a = vec![Family::new(
            key(),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 8).unwrap()]),
        )];
        let b: Vec<Family> = vec![];
        assert!(!is_subset(&a, &b).unwrap());
    }

    #[test]
    fn subset_false_when_unrelated_family_inherits() {
        use crate::addr::family::AFI_IPV6;

        let a = vec![Family::new(
            key(),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()]),
        )];
        let b = vec![
            Family::new(
                key(),
                FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 16).unwrap()]),
            ),
            Family::new(FamilyKey::new(AFI_IPV6, None), FamilyContent::Inherit),
        ];
        assert!(!is_subset(&a, &b).unwrap());
    }
}
