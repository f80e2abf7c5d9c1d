//! RFC 3779 §2.2/§2.3 IP address delegation for X.509 certificates.
//!
//! This crate decodes, encodes, canonicalises, renders, and validates
//! the `sbgp-ipAddrBlock` certificate extension (`IPAddrBlocks`), and
//! checks that a certificate chain's IP resources nest properly from
//! leaf to trust anchor.
//!
//! [`addr::IpAddrBlocks`] is the central type: decode it from the
//! extension's DER content octets, check or establish canonical form,
//! test containment between two values, or build one from scratch with
//! [`builder::Builder`]. [`path::validate`] walks a certificate chain
//! and reports any resource that isn't covered by its issuer.

pub mod addr;
pub mod builder;
pub mod der;
pub mod error;
pub mod ext;
pub mod fmt;
pub mod path;

pub use addr::IpAddrBlocks;
pub use error::Error;
