//! Webhook source-address allow-list.
//!
//! Webhook calls originate from two published IPv4 ranges. Anything else is
//! rejected before the request body is read.

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

/// Published webhook ranges as `(network, prefix length)`.
pub const TRUSTED_RANGES: [(Ipv4Addr, u8); 2] = [
    (Ipv4Addr::new(149, 154, 160, 0), 20),
    (Ipv4Addr::new(91, 108, 4, 0), 22),
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UntrustedSource {
    #[error("webhook source {0} is outside the trusted ranges")]
    OutOfRange(IpAddr),
    #[error("webhook source {0:?} is not an IP address")]
    Unparseable(String),
}

#[must_use]
pub fn is_trusted_source(addr: IpAddr) -> bool {
    let v4 = match addr {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4,
            None => return false,
        },
    };
    let addr = u32::from(v4);
    TRUSTED_RANGES.iter().any(|(network, prefix)| {
        let mask = u32::MAX << (32 - u32::from(*prefix));
        addr & mask == u32::from(*network) & mask
    })
}

pub fn verify_source(raw: &str) -> Result<IpAddr, UntrustedSource> {
    let addr: IpAddr = raw
        .trim()
        .parse()
        .map_err(|_| UntrustedSource::Unparseable(raw.to_string()))?;
    if is_trusted_source(addr) {
        Ok(addr)
    } else {
        Err(UntrustedSource::OutOfRange(addr))
    }
}
