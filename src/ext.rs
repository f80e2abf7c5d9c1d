//! Registration plumbing for the `sbgp-ipAddrBlock` certificate
//! extension: the object identifier, and the pair of handlers (C8 for
//! building from configuration, C7 for rendering) a caller's
//! extension-method table wires up once at startup.

use crate::addr::IpAddrBlocks;
use crate::builder::Builder;
use crate::error::Error;

/// The standard RFC 3779 `id-pe-ipAddrBlocks` OID, `1.3.6.1.5.5.7.1.28`.
pub const SBGP_IP_ADDR_BLOCK_OID: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 28];

/// A constant descriptor pairing the OID with the two handlers this
/// crate supplies. Holds no mutable state; a caller registers one of
/// these per extension method table.
pub struct ExtensionMethods {
    pub oid: &'static [u64],
    pub from_config: fn(&[(&str, &str)]) -> Result<IpAddrBlocks, Error>,
    pub to_text: fn(&IpAddrBlocks) -> String,
}

/// The registration descriptor for `sbgp-ipAddrBlock`.
pub const SBGP_IP_ADDR_BLOCK: ExtensionMethods = ExtensionMethods {
    oid: SBGP_IP_ADDR_BLOCK_OID,
    from_config: from_config,
    to_text: to_text,
};

fn from_config(values: &[(&str, &str)]) -> Result<IpAddrBlocks, Error> {
    let mut builder = Builder::new();
    for (key, value) in values {
        builder.add(key, value)?;
    }
    builder.seal()
}

fn to_text(blocks: &IpAddrBlocks) -> String {
    blocks.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_and_to_text_renders() {
        let values = [("IPv4", "10.0.0.0/24")];
        let blocks = (SBGP_IP_ADDR_BLOCK.from_config)(&values).unwrap();
        assert_eq!((SBGP_IP_ADDR_BLOCK.to_text)(&blocks), "IPv4: 10.0.0.0/24");
    }
}
