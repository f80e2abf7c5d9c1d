//! C6: path validation -- walking a certificate chain leaf-to-root and
//! checking that each certificate's IP resources nest inside its
//! issuer's, per RFC 3779 §2.3.
//!
//! Grounded on OpenBSD's `X509v3_addr_get_afi`/`X509_V_ERR_UNNESTED_RESOURCE`
//! handling in `x509_addr.c`'s `addr_validate_path_internal`: a single
//! forward walk maintaining one "current" resource set per family,
//! replaced by an ancestor's set whenever that ancestor supplies (or
//! covers) it, and refusing to let an inheriting trust anchor stand in
//! for concrete resources.

use log::debug;

use crate::addr::contains;
use crate::addr::family::{Family, FamilyContent};
use crate::addr::IpAddrBlocks;

//------------ ValidationError -------------------------------------------

/// The validation error codes surfaced through the context (§6).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// A certificate's `IPAddrBlocks` extension is present but not in
    /// canonical form.
    InvalidExtension,

    /// A certificate claims (or inherits) a resource its issuer does
    /// not cover.
    UnnestedResource,

    /// Allocation failed while building the transient `child` set.
    OutOfMemory,

    /// A precondition was violated (empty chain, no extension and no
    /// context) before any per-certificate check could run.
    Unspecified,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::InvalidExtension => write!(f, "certificate extension is not canonical"),
            ValidationError::UnnestedResource => write!(f, "resource not covered by issuer"),
            ValidationError::OutOfMemory => write!(f, "out of memory"),
            ValidationError::Unspecified => write!(f, "unspecified validation precondition violated"),
        }
    }
}

impl std::error::Error for ValidationError {}

//------------ Certificate ------------------------------------------------

/// What the path validator needs from one certificate in the chain: its
/// `IPAddrBlocks` extension, if any.
pub trait Certificate {
    fn ip_addr_blocks(&self) -> Option<&IpAddrBlocks>;
}

//------------ validate ----------------------------------------------------

/// Validates that every certificate's resources in `chain` (leaf at
/// index 0, trust anchor last) nest inside its issuer's.
///
/// `ext` overrides the leaf's own extension when given (used when a
/// caller validates resources not literally encoded on the leaf
/// itself); otherwise the leaf's extension is used, and an absent leaf
/// extension means there are no RFC 3779 constraints to check.
///
/// `report` is the error sink: called with each violation found and its
/// zero-based chain depth. Returning `false` aborts the walk
/// immediately with that error; returning `true` accumulates the error
/// and continues.
pub fn validate<C, F>(
    chain: &[C],
    ext: Option<&IpAddrBlocks>,
    mut report: F,
) -> Result<(), ValidationError>
where
    C: Certificate,
    F: FnMut(ValidationError, usize) -> bool,
{
    if chain.is_empty() {
        return Err(ValidationError::Unspecified);
    }

    let (mut i, ext): (isize, &IpAddrBlocks) = match ext {
        Some(ext) => (-1, ext),
        None => match chain[0].ip_addr_blocks() {
            Some(ext) => (0, ext),
            None => return Ok(()),
        },
    };

    if !ext.is_canonical() {
        debug!("leaf IPAddrBlocks extension is not canonical");
        if !report(ValidationError::InvalidExtension, 0) {
            return Err(ValidationError::InvalidExtension);
        }
    }

    let mut child: Vec<Family> = ext.families().to_vec();

    loop {
        i += 1;
        if i as usize >= chain.len() {
            break;
        }
        let depth = i as usize;
        match chain[depth].ip_addr_blocks() {
            None => {
                for fc in &child {
                    if !fc.content().is_inherit() {
                        debug!("{}: unnested, issuer carries no extension", fc.key());
                        if !report(ValidationError::UnnestedResource, depth) {
                            return Err(ValidationError::UnnestedResource);
                        }
                    }
                }
            }
            Some(parent_ext) => {
                if !parent_ext.is_canonical() {
                    debug!("depth {depth}: issuer extension is not canonical");
                    if !report(ValidationError::InvalidExtension, depth) {
                        return Err(ValidationError::InvalidExtension);
                    }
                }
                for fc in child.iter_mut() {
                    let key = fc.key();
                    let fp = match parent_ext.find(key) {
                        Some(fp) => fp,
                        None => {
                            if fc.content().is_inherit() {
                                continue;
                            }
                            debug!("{key}: issuer has no matching family");
                            if !report(ValidationError::UnnestedResource, depth) {
                                return Err(ValidationError::UnnestedResource);
                            }
                            continue;
                        }
                    };
                    let parent_list = match fp.content() {
                        FamilyContent::Inherit => continue,
                        FamilyContent::Blocks(list) => list,
                    };
                    let covered = match fc.content() {
                        FamilyContent::Inherit => true,
                        FamilyContent::Blocks(child_list) => {
                            let raw_len = key.raw_len();
                            match raw_len.and_then(|len| {
                                contains::addr_contains(parent_list, child_list, len).ok()
                            }) {
                                Some(true) => true,
                                _ => false,
                            }
                        }
                    };
                    if covered {
                        *fc = fp.clone();
                    } else {
                        debug!("{key}: not covered by issuer's resources");
                        if !report(ValidationError::UnnestedResource, depth) {
                            return Err(ValidationError::UnnestedResource);
                        }
                    }
                }
            }
        }
    }

    // A trust anchor can never itself inherit: it has no issuer to
    // inherit from.
    if let Some(anchor_ext) = chain.last().unwrap().ip_addr_blocks() {
        for fa in anchor_ext.families() {
            if fa.content().is_inherit() && contains::find(&child, fa.key()).is_some() {
                debug!("{}: trust anchor cannot inherit", fa.key());
                if !report(ValidationError::UnnestedResource, chain.len() - 1) {
                    return Err(ValidationError::UnnestedResource);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::family::{FamilyKey, AFI_IPV4, AFI_IPV6};
    use crate::addr::primitive::make_prefix;

    struct Cert(Option<IpAddrBlocks>);

    impl Certificate for Cert {
        fn ip_addr_blocks(&self) -> Option<&IpAddrBlocks> {
            self.0.as_ref()
        }
    }

    fn blocks(prefixlen: usize, addr: [u8; 4]) -> IpAddrBlocks {
        IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Blocks(vec![make_prefix(&addr, prefixlen).unwrap()]),
        )])
    }

    fn inherit() -> IpAddrBlocks {
        IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Inherit,
        )])
    }

    fn inherit_v6() -> IpAddrBlocks {
        IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV6, None),
            FamilyContent::Inherit,
        )])
    }

    #[test]
    fn nested_chain_validates_without_callbacks() {
        let chain = vec![
            Cert(Some(blocks(24, [10, 0, 0, 0]))),
            Cert(Some(blocks(16, [10, 0, 0, 0]))),
            Cert(Some(blocks(8, [10, 0, 0, 0]))),
        ];
        let result = validate(&chain, None, |_, _| false);
        assert!(result.is_ok());
    }

    #[test]
    fn unrelated_prefix_is_unnested() {
        let chain = vec![
            Cert(Some(blocks(24, [10, 1, 0, 0]))),
            Cert(Some(blocks(16, [10, 0, 0, 0]))),
        ];
        let result = validate(&chain, None, |_, _| false);
        assert_eq!(result, Err(ValidationError::UnnestedResource));
    }

    #[test]
    fn inheritance_resolves_to_ancestor_resources() {
        let chain = vec![
            Cert(Some(inherit())),
            Cert(Some(blocks(16, [10, 0, 0, 0]))),
            Cert(Some(blocks(8, [10, 0, 0, 0]))),
        ];
        let result = validate(&chain, None, |_, _| false);
        assert!(result.is_ok());
    }

    #[test]
    fn inheriting_trust_anchor_is_rejected() {
        let chain = vec![
            Cert(Some(blocks(24, [10, 0, 0, 0]))),
            Cert(Some(blocks(16, [10, 0, 0, 0]))),
            Cert(Some(inherit())),
        ];
        let result = validate(&chain, None, |_, _| false);
        assert_eq!(result, Err(ValidationError::UnnestedResource));
    }

    #[test]
    fn inheriting_family_with_no_ancestor_entry_is_not_unnested() {
        // Leaf inherits IPv6, but no certificate up the chain carries an
        // IPv6 family at all -- nothing ever contradicts the inherited
        // family, so there is nothing to fault.
        let chain = vec![
            Cert(Some(inherit_v6())),
            Cert(Some(blocks(16, [10, 0, 0, 0]))),
            Cert(Some(blocks(8, [10, 0, 0, 0]))),
        ];
        let result = validate(&chain, None, |_, _| false);
        assert!(result.is_ok());
    }

    #[test]
    fn no_extension_anywhere_is_a_no_op() {
        let chain = vec![Cert(None), Cert(None)];
        let result = validate(&chain, None, |_, _| false);
        assert!(result.is_ok());
    }
}
