//! Test doubles and common utilities for dispatcher contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without making real HTTP calls.

#![allow(dead_code)]

use ovn_bgp_core::error::DeliveryError;
use ovn_bgp_core::traits::{NotificationOutcome, SpeakerNotifier};
use ovn_bgp_core::{Decision, DispatchEvent, DispatcherConfig, LifecycleEvent};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A mock SpeakerNotifier that records every decision it is given
///
/// Each configured endpoint answers with the result it was set up with.
pub struct RecordingNotifier {
    /// Call counter for notify()
    notify_call_count: Arc<AtomicUsize>,
    /// Recorded decisions, in call order
    decisions: Arc<std::sync::Mutex<Vec<Decision>>>,
    /// Per-endpoint canned results
    endpoints: Vec<(String, Result<u16, DeliveryError>)>,
}

impl RecordingNotifier {
    /// A notifier whose endpoints all accept with 200
    pub fn accepting(urls: &[&str]) -> Self {
        Self::with_results(urls.iter().map(|url| (url.to_string(), Ok(200))).collect())
    }

    pub fn with_results(endpoints: Vec<(String, Result<u16, DeliveryError>)>) -> Self {
        Self {
            notify_call_count: Arc::new(AtomicUsize::new(0)),
            decisions: Arc::new(std::sync::Mutex::new(Vec::new())),
            endpoints,
        }
    }

    /// Get the number of times notify() was called
    pub fn notify_call_count(&self) -> usize {
        self.notify_call_count.load(Ordering::SeqCst)
    }

    /// Get the decisions notify() was called with
    pub fn decisions(&self) -> Vec<Decision> {
        self.decisions.lock().unwrap().clone()
    }

    /// Create a new RecordingNotifier that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            notify_call_count: Arc::clone(&other.notify_call_count),
            decisions: Arc::clone(&other.decisions),
            endpoints: other.endpoints.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SpeakerNotifier for RecordingNotifier {
    async fn notify(&self, decision: &Decision) -> Vec<NotificationOutcome> {
        self.notify_call_count.fetch_add(1, Ordering::SeqCst);
        self.decisions.lock().unwrap().push(*decision);

        self.endpoints
            .iter()
            .map(|(url, result)| NotificationOutcome {
                endpoint: url.clone(),
                result: result.clone(),
            })
            .collect()
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a dispatcher config for testing
pub fn test_config() -> DispatcherConfig {
    DispatcherConfig {
        event_channel_capacity: 100,
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

pub fn attach(address: &str) -> LifecycleEvent {
    LifecycleEvent::FloatingIpUpdated {
        router_id_before: None,
        router_id_after: Some("router-1".to_string()),
        address: ip(address),
    }
}

pub fn detach(address: &str) -> LifecycleEvent {
    LifecycleEvent::FloatingIpUpdated {
        router_id_before: Some("router-1".to_string()),
        router_id_after: None,
        address: ip(address),
    }
}

/// Drain every dispatch event currently buffered
pub fn drain(rx: &mut mpsc::Receiver<DispatchEvent>) -> Vec<DispatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
