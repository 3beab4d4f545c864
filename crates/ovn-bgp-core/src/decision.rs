//! Announcement decisions and their wire form
//!
//! A [`Decision`] is what the classifier makes of one lifecycle event. It is
//! built fresh per event and never stored. The address lives inside the
//! `Announce`/`Withdraw` variants, so a `Skip` can never carry one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Outcome of classifying a lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Start announcing the address to the BGP speakers
    Announce(IpAddr),
    /// Withdraw the address from the BGP speakers
    Withdraw(IpAddr),
    /// Nothing to tell the speakers
    Skip,
}

impl Decision {
    /// The kind of this decision, without its address
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::Announce(_) => DecisionKind::Announce,
            Decision::Withdraw(_) => DecisionKind::Withdraw,
            Decision::Skip => DecisionKind::Skip,
        }
    }

    /// The subject address, present iff the decision is not `Skip`
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Decision::Announce(ip) | Decision::Withdraw(ip) => Some(*ip),
            Decision::Skip => None,
        }
    }

    /// Whether this decision requires no notification
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Some(ip) => write!(f, "{} {}", self.kind(), ip),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Decision kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Announce,
    Withdraw,
    Skip,
}

impl DecisionKind {
    /// Lowercase name, as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Announce => "announce",
            DecisionKind::Withdraw => "withdraw",
            DecisionKind::Skip => "skip",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event name carried in a speaker notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerEvent {
    Announce,
    Withdraw,
}

/// JSON body POSTed to every speaker endpoint
///
/// Serializes to exactly `{"event":"announce","ip_address":"203.0.113.9"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerNotification {
    pub event: SpeakerEvent,
    pub ip_address: IpAddr,
}

impl SpeakerNotification {
    /// Build the wire body for a decision, or `None` for `Skip`
    pub fn from_decision(decision: &Decision) -> Option<Self> {
        match *decision {
            Decision::Announce(ip_address) => Some(Self {
                event: SpeakerEvent::Announce,
                ip_address,
            }),
            Decision::Withdraw(ip_address) => Some(Self {
                event: SpeakerEvent::Withdraw,
                ip_address,
            }),
            Decision::Skip => None,
        }
    }
}
