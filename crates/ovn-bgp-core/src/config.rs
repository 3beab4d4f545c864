//! Configuration types for the OVN BGP integration
//!
//! This module defines all configuration structures used throughout the crate.
//! Configuration is loaded once at startup and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvnBgpConfig {
    /// BGP speaker endpoints and their shared request policy
    pub speakers: SpeakerConfig,

    /// Optional dispatcher settings
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

impl OvnBgpConfig {
    /// Create a configuration for the given speakers with default settings
    pub fn new(speakers: SpeakerConfig) -> Self {
        Self {
            speakers,
            dispatcher: DispatcherConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.speakers.validate()?;
        self.dispatcher.validate()?;
        Ok(())
    }
}

/// Speaker endpoint configuration
///
/// Every URL shares the same credentials, TLS policy and timeout.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeakerConfig {
    /// Speaker API URLs
    pub speakers: Vec<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Basic auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl SpeakerConfig {
    /// Create a speaker configuration with default policy
    pub fn new(speakers: Vec<String>) -> Self {
        Self {
            speakers,
            insecure: false,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set basic auth credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout_secs(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the speaker configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.speakers.is_empty() {
            return Err(crate::Error::config("No BGP speakers configured"));
        }

        for url in &self.speakers {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(crate::Error::config(format!(
                    "Speaker URL must use HTTP or HTTPS scheme. Got: {}",
                    url
                )));
            }
        }

        match (&self.username, &self.password) {
            (Some(_), None) => {
                return Err(crate::Error::config(
                    "Speaker username is set but password is missing",
                ));
            }
            (None, Some(_)) => {
                return Err(crate::Error::config(
                    "Speaker password is set but username is missing",
                ));
            }
            _ => {}
        }

        self.timeout()?;

        Ok(())
    }

    /// The request timeout as a `Duration`
    pub fn timeout(&self) -> Result<Duration, crate::Error> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(crate::Error::config(format!(
                "Speaker timeout must be a positive number of seconds. Got: {}",
                self.timeout_secs
            )));
        }

        Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|e| crate::Error::config(format!("Invalid speaker timeout: {}", e)))
    }

    /// Expand into one endpoint per speaker URL
    pub fn endpoints(&self) -> Result<Vec<SpeakerEndpoint>, crate::Error> {
        self.validate()?;

        let timeout = self.timeout()?;
        let credentials = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(BasicAuth::new(username, password)),
            _ => None,
        };

        Ok(self
            .speakers
            .iter()
            .map(|url| SpeakerEndpoint {
                url: url.clone(),
                credentials: credentials.clone(),
                insecure: self.insecure,
                timeout,
            })
            .collect())
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for SpeakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakerConfig")
            .field("speakers", &self.speakers)
            .field("insecure", &self.insecure)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// One BGP speaker endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerEndpoint {
    /// URL notifications are POSTed to
    pub url: String,
    /// Basic auth credentials, if any
    pub credentials: Option<BasicAuth>,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Request timeout
    pub timeout: Duration,
}

impl SpeakerEndpoint {
    /// Create an endpoint with the default timeout and no credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            insecure: false,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set basic auth credentials
    pub fn with_credentials(mut self, credentials: BasicAuth) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

/// HTTP basic auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Capacity of the observability event channel
    ///
    /// When full, new dispatch events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl DispatcherConfig {
    /// Validate the dispatcher configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Default speaker request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 2.0;

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_event_channel_capacity() -> usize {
    1000
}
