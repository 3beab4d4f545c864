// # HTTP Speaker Notifier
//
// This crate delivers announce/withdraw decisions to BGP speakers over HTTP.
//
// ## Behavior
//
// - One POST per configured endpoint per decision, issued concurrently
// - Each endpoint has its own prebuilt client carrying its timeout and TLS policy
// - HTTP basic auth when credentials are configured
// - A failing endpoint (timeout, refused connection, non-2xx) never stops the others
// - `Decision::Skip` makes no request at all
// - No retry, no queue: each failure is reported once in the outcome batch
//
// ## Wire Format
//
// ```http
// POST <speaker url>
// Authorization: Basic <base64(username:password)>
// Content-Type: application/json
//
// {"event": "announce", "ip_address": "203.0.113.9"}
// ```
//
// `event` is `"announce"` or `"withdraw"`; `ip_address` is the textual address.
//
// ## Security
//
// - Passwords NEVER appear in logs or `Debug` output
// - Certificate verification is on unless the endpoint is marked insecure

use async_trait::async_trait;
use futures_util::future::join_all;
use ovn_bgp_core::config::{SpeakerConfig, SpeakerEndpoint};
use ovn_bgp_core::traits::{NotificationOutcome, SpeakerNotifier};
use ovn_bgp_core::{Decision, DeliveryError, Error, Result, SpeakerNotification};
use std::fmt;

/// A configured endpoint with its dedicated HTTP client
struct Speaker {
    endpoint: SpeakerEndpoint,
    client: reqwest::Client,
}

impl Speaker {
    fn new(endpoint: SpeakerEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .danger_accept_invalid_certs(endpoint.insecure)
            .build()
            .map_err(|e| {
                Error::http(format!(
                    "Failed to build HTTP client for {}: {}",
                    endpoint.url, e
                ))
            })?;

        if endpoint.insecure {
            tracing::warn!(
                "TLS certificate verification disabled for speaker {}",
                endpoint.url
            );
        }

        Ok(Self { endpoint, client })
    }

    /// POST the notification once and record what happened
    async fn deliver(&self, body: &SpeakerNotification) -> NotificationOutcome {
        let url = &self.endpoint.url;

        let mut request = self.client.post(url).json(body);
        if let Some(ref credentials) = self.endpoint.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    tracing::debug!("Speaker {} answered {}", url, status);
                    NotificationOutcome::delivered(url.as_str(), status.as_u16())
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error response".to_string());
                    tracing::warn!("Speaker {} answered {}: {}", url, status, error_text);
                    NotificationOutcome::failed(
                        url.as_str(),
                        DeliveryError::NonSuccessStatus(status.as_u16()),
                    )
                }
            }
            Err(e) => {
                tracing::warn!("Request to speaker {} failed: {}", url, e);
                NotificationOutcome::failed(url.as_str(), delivery_error(&e))
            }
        }
    }
}

/// Map a transport error onto the delivery error taxonomy
fn delivery_error(err: &reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else if err.is_connect() {
        DeliveryError::ConnectionFailed(err.to_string())
    } else {
        DeliveryError::Request(err.to_string())
    }
}

/// HTTP notifier for a fixed set of BGP speaker endpoints
///
/// Endpoints are fixed at construction and never mutated, so one notifier
/// can be shared across tasks.
pub struct HttpSpeakerNotifier {
    speakers: Vec<Speaker>,
}

// Custom Debug implementation that hides the HTTP clients (credentials are
// already redacted by `BasicAuth`)
impl fmt::Debug for HttpSpeakerNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSpeakerNotifier")
            .field("endpoints", &self.endpoints().collect::<Vec<_>>())
            .finish()
    }
}

impl HttpSpeakerNotifier {
    /// Create a notifier for the given endpoints
    ///
    /// Fails if no endpoint is given or an HTTP client cannot be built.
    pub fn new(endpoints: Vec<SpeakerEndpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::config("No BGP speakers configured"));
        }

        let speakers = endpoints
            .into_iter()
            .map(Speaker::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { speakers })
    }

    /// Create a notifier from speaker configuration
    pub fn from_config(config: &SpeakerConfig) -> Result<Self> {
        Self::new(config.endpoints()?)
    }

    /// The configured endpoints, in delivery order
    pub fn endpoints(&self) -> impl Iterator<Item = &SpeakerEndpoint> {
        self.speakers.iter().map(|speaker| &speaker.endpoint)
    }
}

#[async_trait]
impl SpeakerNotifier for HttpSpeakerNotifier {
    async fn notify(&self, decision: &Decision) -> Vec<NotificationOutcome> {
        let Some(body) = SpeakerNotification::from_decision(decision) else {
            tracing::debug!("Skip decision, no speakers notified");
            return Vec::new();
        };

        tracing::info!(
            "Notifying {} BGP speaker(s): {}",
            self.speakers.len(),
            decision
        );

        let outcomes = join_all(self.speakers.iter().map(|speaker| speaker.deliver(&body))).await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            tracing::warn!(
                "{} of {} BGP speaker(s) were not notified of {}",
                failed,
                outcomes.len(),
                decision
            );
        }

        outcomes
    }

    fn notifier_name(&self) -> &'static str {
        "http"
    }
}
