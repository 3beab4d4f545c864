//! Core traits for the OVN BGP integration
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`SpeakerNotifier`]: Deliver announce/withdraw decisions to BGP speakers

pub mod speaker_notifier;

pub use speaker_notifier::{NotificationOutcome, SpeakerNotifier};
