//! CIDR allocation for per-zone subnets
//!
//! IPv4 subnets are laid out by bumping the third octet of a base block, one
//! step per availability zone. IPv6 subnets are carved out of the
//! VPC-assigned block with a fixed linear numbering.

use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnetwork::Ipv4Network;

use crate::error::CidrError;
use crate::schema::validate_cidr;

/// Offset a base IPv4 CIDR block by `index` in its third octet
///
/// `10.0.1.0/24` at index 2 yields `10.0.3.0/24`. The prefix length is kept.
pub fn cidr_offset(base: &str, index: u32) -> Result<String, CidrError> {
    // ipnetwork accepts truncated forms like "10.0/16", so check the shape first
    validate_cidr(base).map_err(|message| CidrError::Invalid {
        cidr: base.to_string(),
        message,
    })?;
    let network = Ipv4Network::from_str(base).map_err(|e| CidrError::Invalid {
        cidr: base.to_string(),
        message: e.to_string(),
    })?;

    let [a, b, c, d] = network.ip().octets();
    let octet = u32::from(c).saturating_add(index);
    let third = u8::try_from(octet).map_err(|_| CidrError::Overflow {
        base: base.to_string(),
        index,
        octet,
    })?;

    Ok(format!(
        "{}/{}",
        Ipv4Addr::new(a, b, third, d),
        network.prefix()
    ))
}

/// Subnet number of the public subnet in zone `index`
pub fn ipv6_public_netnum(index: u32) -> u32 {
    index * 10
}

/// Subnet number of the private subnet in zone `index`
pub fn ipv6_private_netnum(index: u32) -> u32 {
    100 + index * 10
}

/// Derive a /64 block from a VPC-assigned IPv6 block
///
/// Everything before the `::` separator is kept and the subnet number is
/// appended as the next group, written out in decimal digits:
/// `2600:1f16:abc:de00::/56` with 10 gives `2600:1f16:abc:de00:10::/64`.
pub fn ipv6_subnet_block(vpc_block: &str, netnum: u32) -> String {
    let prefix = vpc_block.split("::").next().unwrap_or(vpc_block);
    format!("{}:{}::/64", prefix, netnum)
}
