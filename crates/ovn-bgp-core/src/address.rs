//! Gateway address selection
//!
//! Dual-stack gateways carry several addresses, and only the IPv4 one is
//! announced. A gateway with a single address is taken as-is, whatever its
//! family; see [`select_ipv4`].

use crate::error::AddressError;
use std::net::IpAddr;

/// Pick the gateway address to announce or withdraw
///
/// - exactly one candidate: returned unchanged, without checking its family
/// - several candidates: the first IPv4 one, in the given order
/// - no candidates, or several without any IPv4: [`AddressError::NoIPv4Gateway`]
///
/// The single-candidate case skipping the IPv4 check is long-standing
/// behavior that speakers rely on, so it is kept even though it differs from
/// the multi-candidate case.
pub fn select_ipv4(candidates: &[IpAddr]) -> Result<IpAddr, AddressError> {
    match candidates {
        [only] => Ok(*only),
        _ => candidates
            .iter()
            .copied()
            .find(IpAddr::is_ipv4)
            .ok_or_else(|| AddressError::NoIPv4Gateway {
                candidates: candidates.to_vec(),
            }),
    }
}
