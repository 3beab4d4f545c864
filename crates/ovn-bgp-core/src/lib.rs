// # ovn-bgp-core
//
// Core library for announcing OVN floating IPs and router gateways to BGP
// speakers.
//
// ## Architecture Overview
//
// This library turns committed networking lifecycle events into speaker
// notifications:
// - **LifecycleEvent**: Floating IP / router gateway transitions from the host
// - **Classifier**: Pure mapping from an event to an announce/withdraw/skip Decision
// - **select_ipv4**: Picks the gateway address to announce from its candidates
// - **SpeakerNotifier**: Trait for delivering a Decision to every speaker endpoint
// - **Dispatcher**: Thin glue from events to classifier to notifier
//
// ## Design Principles
//
// 1. **Stateless**: Nothing is remembered between events
// 2. **Explicit configuration**: Endpoints are passed in, never looked up globally
// 3. **Failure stays here**: Delivery errors are logged and reported, never raised
//    into the host operation that produced the event
// 4. **Library-First**: The daemon is a thin adapter over this crate

pub mod address;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod traits;

// Re-export core types for convenience
pub use address::select_ipv4;
pub use classifier::{
    classify, classify_floatingip_delete, classify_floatingip_update, classify_gateway_change,
};
pub use config::{BasicAuth, DispatcherConfig, OvnBgpConfig, SpeakerConfig, SpeakerEndpoint};
pub use decision::{Decision, DecisionKind, SpeakerEvent, SpeakerNotification};
pub use dispatcher::{DispatchEvent, Dispatcher};
pub use error::{AddressError, DeliveryError, Error, Result};
pub use event::{GatewayPhase, LifecycleEvent};
pub use traits::{NotificationOutcome, SpeakerNotifier};

/// Plugin type reported to the host networking service
pub const PLUGIN_TYPE: &str = "ovn-bgp";

/// Plugin description reported to the host networking service
pub const PLUGIN_DESCRIPTION: &str = "L3 Router Service Plugin for basic OVN-BGP integration";
