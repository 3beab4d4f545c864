//! Lifecycle events delivered by the host networking service
//!
//! Events arrive after the underlying change has been committed. On the wire
//! they are JSON objects tagged by `"type"`:
//!
//! ```json
//! {"type": "floating_ip_updated", "router_id_before": null, "router_id_after": "r1", "address": "203.0.113.9"}
//! {"type": "floating_ip_deleted", "address": "203.0.113.9"}
//! {"type": "gateway_changed", "phase": "created", "candidate_addresses": ["2001:db8::1", "198.51.100.7"]}
//! ```
//!
//! Unknown `"type"` values decode to [`LifecycleEvent::Unsupported`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A committed lifecycle transition of a floating IP or router gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A floating IP's router association changed (or may have)
    FloatingIpUpdated {
        /// Router the floating IP was associated with before the update
        #[serde(default)]
        router_id_before: Option<String>,
        /// Router the floating IP is associated with after the update
        #[serde(default)]
        router_id_after: Option<String>,
        /// The floating IP address
        address: IpAddr,
    },

    /// A floating IP was deleted
    FloatingIpDeleted {
        /// The floating IP address
        address: IpAddr,
    },

    /// A router gateway was created or deleted
    GatewayChanged {
        phase: GatewayPhase,
        /// Addresses of the gateway port, in host order
        #[serde(default)]
        candidate_addresses: Vec<IpAddr>,
    },

    /// Any event shape this integration does not act on
    #[serde(other)]
    Unsupported,
}

impl LifecycleEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::FloatingIpUpdated { .. } => "floating_ip_updated",
            LifecycleEvent::FloatingIpDeleted { .. } => "floating_ip_deleted",
            LifecycleEvent::GatewayChanged { .. } => "gateway_changed",
            LifecycleEvent::Unsupported => "unsupported",
        }
    }
}

/// Gateway lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPhase {
    Created,
    Deleted,
}

impl fmt::Display for GatewayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayPhase::Created => f.write_str("created"),
            GatewayPhase::Deleted => f.write_str("deleted"),
        }
    }
}
