//! Event classification
//!
//! Pure functions turning a lifecycle event into a [`Decision`]. Nothing here
//! performs I/O or logs; the dispatcher does both.

use crate::address::select_ipv4;
use crate::decision::Decision;
use crate::error::AddressError;
use crate::event::{GatewayPhase, LifecycleEvent};
use std::net::IpAddr;

/// Classify any lifecycle event
///
/// Total over all event shapes: [`LifecycleEvent::Unsupported`] yields
/// `Decision::Skip`. Only gateway events can fail.
pub fn classify(event: &LifecycleEvent) -> Result<Decision, AddressError> {
    match event {
        LifecycleEvent::FloatingIpUpdated {
            router_id_before,
            router_id_after,
            address,
        } => Ok(classify_floatingip_update(
            router_id_before.as_deref(),
            router_id_after.as_deref(),
            *address,
        )),
        LifecycleEvent::FloatingIpDeleted { address } => Ok(classify_floatingip_delete(*address)),
        LifecycleEvent::GatewayChanged {
            phase,
            candidate_addresses,
        } => classify_gateway_change(*phase, candidate_addresses),
        LifecycleEvent::Unsupported => Ok(Decision::Skip),
    }
}

/// Classify a floating IP update from its router association
///
/// Announce on attach, withdraw on detach. A floating IP that was never
/// attached, or whose association did not appear or disappear, is skipped.
/// Empty router ids count as absent.
pub fn classify_floatingip_update(
    router_id_before: Option<&str>,
    router_id_after: Option<&str>,
    address: IpAddr,
) -> Decision {
    let before = router_id_before.is_some_and(|id| !id.is_empty());
    let after = router_id_after.is_some_and(|id| !id.is_empty());

    match (before, after) {
        (false, true) => Decision::Announce(address),
        (true, false) => Decision::Withdraw(address),
        _ => Decision::Skip,
    }
}

/// Classify a floating IP deletion
///
/// Always a withdraw, whatever the floating IP was attached to.
pub fn classify_floatingip_delete(address: IpAddr) -> Decision {
    Decision::Withdraw(address)
}

/// Classify a router gateway creation or deletion
pub fn classify_gateway_change(
    phase: GatewayPhase,
    candidate_addresses: &[IpAddr],
) -> Result<Decision, AddressError> {
    let selected = select_ipv4(candidate_addresses)?;

    Ok(match phase {
        GatewayPhase::Created => Decision::Announce(selected),
        GatewayPhase::Deleted => Decision::Withdraw(selected),
    })
}
