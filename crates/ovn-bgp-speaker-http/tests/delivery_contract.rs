//! Contract Test: Speaker Delivery
//!
//! Exercises the HTTP notifier against local mock speakers.
//!
//! Constraints verified:
//! - The request is a POST with the exact JSON body and basic auth
//! - Skip decisions make no HTTP call
//! - Every endpoint is attempted, whatever happens to the others
//! - Timeouts are enforced per endpoint and never delay the rest
//! - Deliveries run concurrently
//!
//! If this test fails, someone has changed the wire contract existing
//! speakers depend on, or made delivery fail-fast or sequential.

use ovn_bgp_core::config::{BasicAuth, SpeakerEndpoint};
use ovn_bgp_core::traits::SpeakerNotifier;
use ovn_bgp_core::{Decision, DeliveryError};
use ovn_bgp_speaker_http::HttpSpeakerNotifier;
use serde_json::json;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An address on a closed port of the loopback interface
const UNREACHABLE_SPEAKER: &str = "http://127.0.0.1:1/events";

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn events_url(server: &MockServer) -> String {
    format!("{}/events", server.uri())
}

#[tokio::test]
async fn announce_posts_exact_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events"))
        .and(body_json(json!({
            "event": "announce",
            "ip_address": "203.0.113.9"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![SpeakerEndpoint::new(events_url(&server))])
        .expect("notifier construction");

    let outcomes = notifier
        .notify(&Decision::Announce(ip("203.0.113.9")))
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].result, Ok(200));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({ "event": "announce", "ip_address": "203.0.113.9" })
    );
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn withdraw_sends_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events"))
        // base64("user:pass")
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(body_json(json!({
            "event": "withdraw",
            "ip_address": "198.51.100.7"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = SpeakerEndpoint::new(events_url(&server))
        .with_credentials(BasicAuth::new("user", "pass"));
    let notifier = HttpSpeakerNotifier::new(vec![endpoint]).expect("notifier construction");

    let outcomes = notifier
        .notify(&Decision::Withdraw(ip("198.51.100.7")))
        .await;

    assert_eq!(outcomes[0].result, Ok(202));
}

#[tokio::test]
async fn no_auth_header_without_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![SpeakerEndpoint::new(events_url(&server))])
        .expect("notifier construction");
    notifier
        .notify(&Decision::Announce(ip("203.0.113.9")))
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn skip_makes_no_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(events_url(&server)),
        SpeakerEndpoint::new(UNREACHABLE_SPEAKER),
    ])
    .expect("notifier construction");

    let outcomes = notifier.notify(&Decision::Skip).await;

    assert!(outcomes.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_speaker_does_not_stop_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // Failing endpoint first and last: order must not matter
    let notifier = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(UNREACHABLE_SPEAKER),
        SpeakerEndpoint::new(events_url(&server)),
    ])
    .expect("notifier construction");

    let outcomes = notifier.notify(&Decision::Announce(ip("10.0.0.5"))).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].endpoint, UNREACHABLE_SPEAKER);
    assert!(matches!(
        outcomes[0].result,
        Err(DeliveryError::ConnectionFailed(_))
    ));
    assert_eq!(outcomes[1].endpoint, events_url(&server));
    assert_eq!(outcomes[1].result, Ok(200));

    let other = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&other)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(events_url(&other)),
        SpeakerEndpoint::new(UNREACHABLE_SPEAKER),
    ])
    .expect("notifier construction");

    let outcomes = notifier.notify(&Decision::Announce(ip("10.0.0.5"))).await;

    assert_eq!(outcomes[0].result, Ok(200));
    assert!(!outcomes[1].is_success());
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("speaker busy"))
        .expect(1)
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&healthy)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(events_url(&failing)),
        SpeakerEndpoint::new(events_url(&healthy)),
    ])
    .expect("notifier construction");

    let outcomes = notifier
        .notify(&Decision::Withdraw(ip("203.0.113.9")))
        .await;

    assert_eq!(
        outcomes[0].result,
        Err(DeliveryError::NonSuccessStatus(503))
    );
    assert_eq!(outcomes[1].result, Ok(200));
}

#[tokio::test]
async fn slow_speaker_times_out_without_blocking_others() {
    let slow = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .mount(&slow)
        .await;

    let fast = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fast)
        .await;

    let notifier = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(events_url(&slow)).with_timeout(Duration::from_millis(1)),
        SpeakerEndpoint::new(events_url(&fast)),
    ])
    .expect("notifier construction");

    let started = Instant::now();
    let outcomes = notifier
        .notify(&Decision::Announce(ip("203.0.113.9")))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(outcomes[0].result, Err(DeliveryError::Timeout));
    assert_eq!(outcomes[1].result, Ok(200));
    assert!(
        elapsed < Duration::from_millis(100),
        "timed out call should not wait for the slow speaker, took {:?}",
        elapsed
    );

    // The timeout alone: 1ms plus scheduling overhead
    let slow_only = HttpSpeakerNotifier::new(vec![
        SpeakerEndpoint::new(events_url(&slow)).with_timeout(Duration::from_millis(1)),
    ])
    .expect("notifier construction");

    let started = Instant::now();
    let outcomes = slow_only
        .notify(&Decision::Announce(ip("203.0.113.9")))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(outcomes[0].result, Err(DeliveryError::Timeout));
    assert!(
        elapsed < Duration::from_millis(1 + 50),
        "1ms timeout should be reported promptly, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn deliveries_run_concurrently() {
    let mut servers = Vec::new();
    for _ in 0..3 {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;
        servers.push(server);
    }

    let notifier = HttpSpeakerNotifier::new(
        servers
            .iter()
            .map(|server| SpeakerEndpoint::new(events_url(server)))
            .collect(),
    )
    .expect("notifier construction");

    let started = Instant::now();
    let outcomes = notifier
        .notify(&Decision::Announce(ip("203.0.113.9")))
        .await;
    let elapsed = started.elapsed();

    assert!(outcomes.iter().all(|o| o.is_success()));
    // Sequential delivery would take at least 900ms
    assert!(
        elapsed < Duration::from_millis(800),
        "deliveries should overlap, took {:?}",
        elapsed
    );
}
