//! Lifecycle event dispatcher
//!
//! The Dispatcher is responsible for:
//! - Classifying each lifecycle event into a Decision
//! - Handing non-skip decisions to the SpeakerNotifier
//! - Logging and emitting the outcome of every step
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Host adapter    │─── LifecycleEvent ───┐
//! └──────────────────┘                      │
//!                                           ▼
//!                                  ┌──────────────┐
//!                                  │  Dispatcher  │
//!                                  └──────────────┘
//!                                           │
//!               ┌───────────────────────────┼───────────────────────────┐
//!               │                           │                           │
//!               ▼                           ▼                           ▼
//!       ┌─────────────┐          ┌──────────────────┐          ┌─────────────┐
//!       │ Classifier  │          │ SpeakerNotifier  │          │   Events    │
//!       │ (decide)    │          │ (fan-out)        │          │  (observe)  │
//!       └─────────────┘          └──────────────────┘          └─────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Lifecycle event received (post-commit)
//! 2. Classify into Announce / Withdraw / Skip
//! 3. If not Skip, notify every speaker endpoint
//! 4. Emit one event per endpoint outcome for monitoring/logging
//!
//! Nothing in this flow returns an error to the caller. Failures end here as
//! log lines and [`DispatchEvent`]s.

use crate::classifier::classify;
use crate::config::DispatcherConfig;
use crate::decision::Decision;
use crate::error::{AddressError, DeliveryError};
use crate::event::{GatewayPhase, LifecycleEvent};
use crate::traits::SpeakerNotifier;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Events emitted by the Dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// An event was classified into an announce or withdraw
    Classified { decision: Decision },

    /// An event required no notification
    Skipped { event: &'static str },

    /// No gateway address could be selected
    AddressSelectionFailed { error: AddressError },

    /// A speaker accepted the notification
    Delivered { endpoint: String, status: u16 },

    /// A speaker could not be notified
    DeliveryFailed {
        endpoint: String,
        error: DeliveryError,
    },

    /// Dispatcher stopped consuming events
    Stopped { reason: String },
}

/// Routes lifecycle events to the classifier and the speaker notifier
///
/// Stateless between events: every call to [`Dispatcher::handle`] works only
/// from its argument and the read-only notifier configuration.
pub struct Dispatcher {
    /// Notifier for speaker endpoints
    notifier: Box<dyn SpeakerNotifier>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<DispatchEvent>,
}

impl Dispatcher {
    /// Create a new dispatcher
    ///
    /// # Returns
    ///
    /// A tuple of (dispatcher, event_receiver) where event_receiver yields dispatch events
    pub fn new(
        notifier: Box<dyn SpeakerNotifier>,
        config: DispatcherConfig,
    ) -> crate::Result<(Self, mpsc::Receiver<DispatchEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        Ok((
            Self {
                notifier,
                event_tx: tx,
            },
            rx,
        ))
    }

    /// Handle one lifecycle event
    ///
    /// Returns once every endpoint has been attempted (or immediately for
    /// skipped and unclassifiable events).
    pub async fn handle(&self, event: LifecycleEvent) {
        debug!(event = event.name(), payload = ?event, "Lifecycle event received");

        let decision = match classify(&event) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Dropping {} event: {}", event.name(), e);
                self.emit_event(DispatchEvent::AddressSelectionFailed { error: e });
                return;
            }
        };

        if decision.is_skip() {
            debug!("No BGP update needed for {} event", event.name());
            self.emit_event(DispatchEvent::Skipped {
                event: event.name(),
            });
            return;
        }

        info!("{}", describe(&event, &decision));
        self.emit_event(DispatchEvent::Classified { decision });

        let outcomes = self.notifier.notify(&decision).await;

        for outcome in outcomes {
            match outcome.result {
                Ok(status) => {
                    info!(
                        "Speaker {} accepted {} (status {})",
                        outcome.endpoint, decision, status
                    );
                    self.emit_event(DispatchEvent::Delivered {
                        endpoint: outcome.endpoint,
                        status,
                    });
                }
                Err(e) => {
                    error!(
                        "Failed to notify speaker {} of {}: {}",
                        outcome.endpoint, decision, e
                    );
                    self.emit_event(DispatchEvent::DeliveryFailed {
                        endpoint: outcome.endpoint,
                        error: e,
                    });
                }
            }
        }
    }

    /// Consume lifecycle events until the stream ends or Ctrl-C
    ///
    /// Events are handled one at a time, in arrival order.
    pub async fn run<S>(&self, events: S) -> crate::Result<()>
    where
        S: Stream<Item = LifecycleEvent>,
    {
        self.run_internal(events, None).await
    }

    /// Run with a controlled shutdown signal instead of Ctrl-C
    ///
    /// Used by embedders that own their own shutdown handling, and by tests.
    pub async fn run_with_shutdown<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> crate::Result<()>
    where
        S: Stream<Item = LifecycleEvent>,
    {
        self.run_internal(events, shutdown_rx).await
    }

    async fn run_internal<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> crate::Result<()>
    where
        S: Stream<Item = LifecycleEvent>,
    {
        info!(
            "Dispatching lifecycle events to {} notifier",
            self.notifier.notifier_name()
        );

        tokio::pin!(events);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    // A dropped sender counts as a shutdown request
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                next = events.next() => match next {
                    Some(event) => self.handle(event).await,
                    None => break "Event stream closed",
                },

                _ = &mut shutdown => break "Shutdown signal",
            }
        };

        info!("Dispatcher stopped: {}", reason);
        self.emit_event(DispatchEvent::Stopped {
            reason: reason.to_string(),
        });

        Ok(())
    }

    /// Emit a dispatch event
    fn emit_event(&self, event: DispatchEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// Log line describing what is about to be sent, in the host's wording
fn describe(event: &LifecycleEvent, decision: &Decision) -> String {
    let ip = decision
        .address()
        .map(|ip| ip.to_string())
        .unwrap_or_default();

    match (event, decision) {
        (LifecycleEvent::FloatingIpUpdated { .. }, Decision::Announce(_)) => format!(
            "Floating IP {} has been attached to a router. Updating BGP speakers.",
            ip
        ),
        (LifecycleEvent::FloatingIpUpdated { .. }, _) => format!(
            "Floating IP {} has been detached from a router. Updating BGP speakers.",
            ip
        ),
        (LifecycleEvent::FloatingIpDeleted { .. }, _) => {
            format!("Floating IP {} has been deleted. Updating BGP speakers.", ip)
        }
        (LifecycleEvent::GatewayChanged { phase, .. }, _) => {
            let action = match phase {
                GatewayPhase::Created => "set",
                GatewayPhase::Deleted => "cleared",
            };
            format!(
                "Router gateway {} has been {}. Updating BGP speakers.",
                ip, action
            )
        }
        (LifecycleEvent::Unsupported, _) => format!("{}. Updating BGP speakers.", decision),
    }
}
