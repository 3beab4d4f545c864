// # ovn-bgpd - OVN BGP notification daemon
//
// This is a THIN integration layer. Classification and delivery live in
// ovn-bgp-core and ovn-bgp-speaker-http; nothing here decides whether or
// how a route is announced.
//
// The ovn-bgpd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the HTTP speaker notifier and the dispatcher
// 4. Feeding lifecycle events from stdin to the dispatcher
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `OVN_BGP_SPEAKERS`: Comma-separated speaker URLs (required)
// - `OVN_BGP_USERNAME`: Basic auth username (required)
// - `OVN_BGP_PASSWORD`: Basic auth password (required)
// - `OVN_BGP_INSECURE`: Skip TLS certificate verification (default: false)
// - `OVN_BGP_API_SERVER_TIMEOUT`: Request timeout in seconds (default: 2.0)
// - `OVN_BGP_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Input
//
// One JSON lifecycle event per line on stdin, written by the host adapter:
//
// ```text
// {"type":"floating_ip_updated","router_id_before":null,"router_id_after":"r1","address":"203.0.113.9"}
// {"type":"gateway_changed","phase":"created","candidate_addresses":["2001:db8::1","198.51.100.7"]}
// ```
//
// Malformed lines are logged and skipped. The daemon exits cleanly when
// stdin closes or on SIGINT/SIGTERM.
//
// ## Example
//
// ```bash
// export OVN_BGP_SPEAKERS=https://speaker-1:8443/events,https://speaker-2:8443/events
// export OVN_BGP_USERNAME=neutron
// export OVN_BGP_PASSWORD=secret
//
// host-event-adapter | ovn-bgpd
// ```

use anyhow::Result;
use ovn_bgp_core::config::{DispatcherConfig, OvnBgpConfig, SpeakerConfig};
use ovn_bgp_core::{DispatchEvent, Dispatcher, LifecycleEvent};
use ovn_bgp_speaker_http::HttpSpeakerNotifier;
use std::env;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BgpdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<BgpdExitCode> for ExitCode {
    fn from(code: BgpdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    speakers: Vec<String>,
    username: String,
    password: String,
    insecure: bool,
    timeout_secs: f64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            speakers: parse_speakers(&env::var("OVN_BGP_SPEAKERS").unwrap_or_default()),
            username: env::var("OVN_BGP_USERNAME")
                .map_err(|_| anyhow::anyhow!("OVN_BGP_USERNAME is required"))?,
            password: env::var("OVN_BGP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("OVN_BGP_PASSWORD is required"))?,
            insecure: match env::var("OVN_BGP_INSECURE") {
                Ok(value) => parse_bool(&value).ok_or_else(|| {
                    anyhow::anyhow!(
                        "OVN_BGP_INSECURE must be true or false. Got: {}",
                        value
                    )
                })?,
                Err(_) => false,
            },
            timeout_secs: match env::var("OVN_BGP_API_SERVER_TIMEOUT") {
                Ok(value) => value.trim().parse().map_err(|_| {
                    anyhow::anyhow!(
                        "OVN_BGP_API_SERVER_TIMEOUT must be a number of seconds. Got: {}",
                        value
                    )
                })?,
                Err(_) => ovn_bgp_core::config::DEFAULT_TIMEOUT_SECS,
            },
            log_level: env::var("OVN_BGP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.speakers.is_empty() {
            anyhow::bail!(
                "OVN_BGP_SPEAKERS must contain at least one speaker URL. \
                Set it via: export OVN_BGP_SPEAKERS=https://speaker-1:8443/events"
            );
        }

        if self.username.is_empty() {
            anyhow::bail!("OVN_BGP_USERNAME cannot be empty");
        }

        if self.password.is_empty() {
            anyhow::bail!("OVN_BGP_PASSWORD cannot be empty");
        }

        for url in &self.speakers {
            if url.starts_with("http://") {
                eprintln!(
                    "WARNING: speaker {} uses HTTP (not HTTPS). \
                    Credentials will be sent in clear text.",
                    url
                );
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "OVN_BGP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.to_core().validate()?;

        Ok(())
    }

    /// Convert into the core library configuration
    fn to_core(&self) -> OvnBgpConfig {
        let speakers = SpeakerConfig::new(self.speakers.clone())
            .with_credentials(self.username.clone(), self.password.clone())
            .with_insecure(self.insecure)
            .with_timeout_secs(self.timeout_secs);

        OvnBgpConfig {
            speakers,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

fn parse_speakers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Decode one input line, logging and dropping anything unusable
fn parse_event_line(line: &str) -> Option<LifecycleEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Ignoring malformed lifecycle event: {}", e);
            None
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return BgpdExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return BgpdExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdin carries events
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BgpdExitCode::ConfigError.into();
    }

    info!(
        "Starting ovn-bgpd ({}: {})",
        ovn_bgp_core::PLUGIN_TYPE,
        ovn_bgp_core::PLUGIN_DESCRIPTION
    );
    info!("Configuration loaded: {} speaker(s)", config.speakers.len());

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BgpdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            BgpdExitCode::RuntimeError
        } else {
            BgpdExitCode::CleanShutdown
        }
    });

    // A blocked stdin read must not hold up process exit
    rt.shutdown_background();

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let core_config = config.to_core();

    let notifier = HttpSpeakerNotifier::from_config(&core_config.speakers)?;
    for endpoint in notifier.endpoints() {
        info!("Notifying speaker: {}", endpoint.url);
    }

    let (dispatcher, mut event_rx) = Dispatcher::new(Box::new(notifier), core_config.dispatcher)?;

    // Dispatch events are already logged by the dispatcher; keep the channel drained
    let observer = tokio::spawn(async move {
        let mut failures = 0usize;
        while let Some(event) = event_rx.recv().await {
            if let DispatchEvent::DeliveryFailed { .. } = event {
                failures += 1;
            }
            debug!(?event, "Dispatch event");
        }
        failures
    });

    let shutdown_signals = ShutdownSignals::install()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signals = tokio::spawn(forward_shutdown(shutdown_signals.recv(), shutdown_tx));

    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let events = lines.filter_map(|line| match line {
        Ok(line) => parse_event_line(&line),
        Err(e) => {
            warn!("Failed to read lifecycle event: {}", e);
            None
        }
    });

    info!("Ready to receive lifecycle events");
    dispatcher.run_with_shutdown(events, Some(shutdown_rx)).await?;

    signals.abort();
    drop(dispatcher);

    match observer.await {
        Ok(failures) if failures > 0 => {
            warn!("{} speaker notification(s) failed during this run", failures)
        }
        Ok(_) => {}
        Err(e) => error!("Dispatch event observer failed: {}", e),
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Forward the first shutdown signal to the dispatcher
///
/// A dropped sender reads as a shutdown request, so it is held for the
/// rest of the run if waiting fails.
async fn forward_shutdown<F>(signal: F, shutdown_tx: oneshot::Sender<()>)
where
    F: Future<Output = Result<&'static str>>,
{
    match signal.await {
        Ok(signal) => {
            info!("Received shutdown signal: {}", signal);
            let _ = shutdown_tx.send(());
        }
        Err(e) => {
            error!("Shutdown signal handling failed: {}", e);
            let _shutdown_tx = shutdown_tx;
            std::future::pending::<()>().await;
        }
    }
}

/// Shutdown signal handlers (SIGTERM, SIGINT)
///
/// Installed before dispatching starts so a failure is a startup error.
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

        Ok(Self { sigterm, sigint })
    }

    /// Wait for a signal and return its name
    async fn recv(mut self) -> Result<&'static str> {
        let signal = tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        };

        Ok(signal)
    }
}

/// Shutdown signal handler (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> Result<&'static str> {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
        Ok("SIGINT")
    }
}
