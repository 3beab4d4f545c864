// # Speaker Notifier Trait
//
// Defines the interface for delivering decisions to BGP speakers.
//
// ## Implementations
//
// - HTTP: `ovn-bgp-speaker-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ovn_bgp_core::{Decision, SpeakerNotifier};
//
// #[tokio::main]
// async fn main() {
//     let notifier = /* SpeakerNotifier implementation */;
//
//     let outcomes = notifier
//         .notify(&Decision::Announce("203.0.113.9".parse().unwrap()))
//         .await;
//
//     for outcome in outcomes.iter().filter(|o| !o.is_success()) {
//         eprintln!("{} failed", outcome.endpoint);
//     }
// }
// ```

use crate::decision::Decision;
use crate::error::DeliveryError;
use async_trait::async_trait;

/// Result of delivering one decision to one speaker endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    /// The endpoint URL
    pub endpoint: String,
    /// HTTP status on success, delivery error otherwise
    pub result: Result<u16, DeliveryError>,
}

impl NotificationOutcome {
    /// A successful delivery answered with `status`
    pub fn delivered(endpoint: impl Into<String>, status: u16) -> Self {
        Self {
            endpoint: endpoint.into(),
            result: Ok(status),
        }
    }

    /// A failed delivery
    pub fn failed(endpoint: impl Into<String>, error: DeliveryError) -> Self {
        Self {
            endpoint: endpoint.into(),
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// HTTP status, if the endpoint answered successfully
    pub fn status(&self) -> Option<u16> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&DeliveryError> {
        self.result.as_ref().err()
    }
}

/// Trait for speaker notifier implementations
///
/// # Contract
///
/// - `Decision::Skip` is a no-op: no request is made and the returned
///   batch is empty.
/// - Every configured endpoint is attempted independently. One endpoint
///   failing never stops delivery to the others.
/// - One outcome per endpoint, in configuration order.
/// - At most one attempt per endpoint per call. There is no retry and no
///   queue; a failed delivery is reported and dropped.
/// - Never fails as a whole. Errors are data in the returned outcomes so
///   they cannot roll back the host operation that produced the event.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
/// Endpoint configuration is fixed at construction and never mutated.
#[async_trait]
pub trait SpeakerNotifier: Send + Sync {
    /// Deliver a decision to every configured speaker endpoint
    async fn notify(&self, decision: &Decision) -> Vec<NotificationOutcome>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
