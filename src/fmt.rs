//! C7: rendering an `IPAddrBlocks` value as human-readable text.
//!
//! Grounded on OpenBSD's `i2r_IPAddrBlocks`/`addr_expand` presentation
//! helpers in `x509_addr.c`: each family gets one line naming its AFI
//! (and SAFI, if any), followed by either `inherit` or its list of
//! prefixes and ranges.

use std::fmt;

use crate::addr::family::{Family, FamilyContent, AFI_IPV4, AFI_IPV6};
use crate::addr::primitive::PrefixOrRange;
use crate::addr::{bitstr, IpAddrBlocks};

/// The fixed SAFI name table (§4.7).
fn safi_name(safi: u8) -> Option<&'static str> {
    match safi {
        1 => Some("Unicast"),
        2 => Some("Multicast"),
        3 => Some("Unicast/Multicast"),
        4 => Some("MPLS"),
        64 => Some("Tunnel"),
        65 => Some("VPLS"),
        66 => Some("BGP MDT"),
        128 => Some("MPLS-labeled VPN"),
        _ => None,
    }
}

impl fmt::Display for IpAddrBlocks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, family) in self.families().iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write_family(f, family)?;
        }
        Ok(())
    }
}

fn write_family(f: &mut fmt::Formatter, family: &Family) -> fmt::Result {
    let key = family.key();
    match key.afi() {
        AFI_IPV4 => write!(f, "IPv4")?,
        AFI_IPV6 => write!(f, "IPv6")?,
        other => write!(f, "Unknown AFI {other}")?,
    }
    if let Some(safi) = key.safi() {
        match safi_name(safi) {
            Some(name) => write!(f, " ({name})")?,
            None => write!(f, " (Unknown SAFI {safi})")?,
        }
    }
    write!(f, ": ")?;
    match family.content() {
        FamilyContent::Inherit => write!(f, "inherit"),
        FamilyContent::Blocks(list) => {
            let raw_len = key.raw_len();
            for (idx, aor) in list.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write_aor(f, aor, key.afi(), raw_len)?;
            }
            Ok(())
        }
    }
}

fn write_aor(
    f: &mut fmt::Formatter,
    aor: &PrefixOrRange,
    afi: u16,
    raw_len: Option<usize>,
) -> fmt::Result {
    match aor {
        PrefixOrRange::Prefix(bs) => match raw_len {
            Some(raw_len) => {
                let addr = bitstr::expand(bs, raw_len, 0x00)
                    .expect("prefix length already checked against raw_len by the caller");
                write!(f, "{}/{}", render_address(&addr, afi), bitstr::prefixlen(bs))
            }
            None => write!(f, "{}", render_generic(bs.octets())),
        },
        PrefixOrRange::Range(min, max) => match raw_len {
            Some(raw_len) => {
                let min = bitstr::expand(min, raw_len, 0x00)
                    .expect("range endpoint already checked against raw_len by the caller");
                let max = bitstr::expand(max, raw_len, 0xFF)
                    .expect("range endpoint already checked against raw_len by the caller");
                write!(f, "{}-{}", render_address(&min, afi), render_address(&max, afi))
            }
            None => write!(f, "{}-{}", render_generic(min.octets()), render_generic(max.octets())),
        },
    }
}

fn render_address(raw: &[u8], afi: u16) -> String {
    match afi {
        AFI_IPV4 if raw.len() == 4 => format!("{}.{}.{}.{}", raw[0], raw[1], raw[2], raw[3]),
        AFI_IPV6 if raw.len() == 16 => render_ipv6(raw),
        _ => render_generic(raw),
    }
}

/// Renders 16 raw octets per the truncation rule of §4.7: drop trailing
/// all-zero 16-bit groups, join what's left with `:`, append one more
/// `:` if anything was dropped, and a second one if everything was.
fn render_ipv6(raw: &[u8]) -> String {
    let groups: Vec<u16> = raw.chunks(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
    let mut truncated = 0;
    while truncated < groups.len() && groups[groups.len() - 1 - truncated] == 0 {
        truncated += 1;
    }
    let kept = &groups[..groups.len() - truncated];
    let mut out = kept.iter().map(|g| format!("{g:x}")).collect::<Vec<_>>().join(":");
    if truncated > 0 {
        out.push(':');
    }
    if truncated == groups.len() {
        out.push(':');
    }
    out
}

fn render_generic(octets: &[u8]) -> String {
    octets.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::family::FamilyKey;
    use crate::addr::primitive::make_prefix;

    #[test]
    fn prefix_renders_as_dotted_decimal_slash_len() {
        let blocks = IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV4, None),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 24).unwrap()]),
        )]);
        assert_eq!(blocks.to_string(), "IPv4: 10.0.0.0/24");
    }

    #[test]
    fn inherit_renders_literally() {
        let blocks = IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV6, None),
            FamilyContent::Inherit,
        )]);
        assert_eq!(blocks.to_string(), "IPv6: inherit");
    }

    #[test]
    fn all_zero_ipv6_renders_double_colon() {
        assert_eq!(render_ipv6(&[0u8; 16]), "::");
    }

    #[test]
    fn partial_ipv6_tail_gets_single_trailing_colon() {
        let mut raw = [0u8; 16];
        raw[0] = 0x20;
        raw[1] = 0x01;
        raw[2] = 0x0d;
        raw[3] = 0xb8;
        assert_eq!(render_ipv6(&raw), "2001:db8:");
    }

    #[test]
    fn safi_name_is_looked_up_from_the_fixed_table() {
        let blocks = IpAddrBlocks::new(vec![Family::new(
            FamilyKey::new(AFI_IPV4, Some(1)),
            FamilyContent::Blocks(vec![make_prefix(&[10, 0, 0, 0], 8).unwrap()]),
        )]);
        assert_eq!(blocks.to_string(), "IPv4 (Unicast): 10.0.0.0/8");
    }
}
