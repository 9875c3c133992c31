mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{profile_responder, FakeHttp};
use winstreak_board::http_client::HttpGet;
use winstreak_board::identifiers::{BatchOutcome, IdentifierResolver};
use winstreak_board::relay::{RelayConfig, Transport};

const PROFILE_BASE: &str = "https://profiles.test/users";

fn resolver(fake: &Arc<FakeHttp>, delay: Duration) -> IdentifierResolver {
    let http: Arc<dyn HttpGet> = fake.clone();
    IdentifierResolver::new(Transport::direct(http), PROFILE_BASE, 3, delay)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn cache_hit_skips_network() {
    let fake = FakeHttp::new(profile_responder);
    let mut resolver = resolver(&fake, Duration::ZERO);

    assert_eq!(resolver.resolve("Steve").as_deref(), Some("id-Steve"));
    assert_eq!(resolver.resolve("Steve").as_deref(), Some("id-Steve"));
    assert_eq!(fake.calls(), 1);
    assert_eq!(resolver.cached("Steve"), Some("id-Steve"));
}

#[test]
fn failures_are_not_cached_and_retry() {
    let fake = FakeHttp::new(profile_responder);
    let mut resolver = resolver(&fake, Duration::ZERO);

    assert_eq!(resolver.resolve("ghost1"), None);
    assert_eq!(resolver.cached("ghost1"), None);
    assert_eq!(resolver.resolve("ghost1"), None);
    assert_eq!(fake.calls(), 2);
    assert_eq!(resolver.cache_len(), 0);
}

#[test]
fn transport_errors_resolve_to_none() {
    let fake = FakeHttp::new(|_| {
        Err(winstreak_board::error::FetchError::Transport(
            "connection refused".to_string(),
        ))
    });
    let mut resolver = resolver(&fake, Duration::ZERO);
    assert_eq!(resolver.resolve("Steve"), None);
}

#[test]
fn resolve_all_batches_by_three_and_skips_cached() {
    let fake = FakeHttp::new(profile_responder);
    let mut resolver = resolver(&fake, Duration::ZERO);
    resolver.resolve("a");

    let mut batches: Vec<BatchOutcome> = Vec::new();
    resolver.resolve_all(
        &names(&["a", "b", "c", "ghost", "d", "e", "f", "b", ""]),
        |outcome| batches.push(outcome),
    );

    // "a" was cached, the duplicate "b" and the empty name are dropped.
    let sizes: Vec<usize> = batches
        .iter()
        .map(|b| b.resolved.len() + b.failed.len())
        .collect();
    assert_eq!(sizes, [3, 3]);
    assert_eq!(fake.calls(), 1 + 6);
    assert!(fake.max_in_flight.load(std::sync::atomic::Ordering::SeqCst) <= 3);

    let failed: Vec<&String> = batches.iter().flat_map(|b| &b.failed).collect();
    assert_eq!(failed, [&"ghost".to_string()]);
    assert_eq!(resolver.cached("f"), Some("id-f"));
    assert_eq!(resolver.cached("ghost"), None);
}

#[test]
fn resolve_all_with_everything_cached_does_nothing() {
    let fake = FakeHttp::new(profile_responder);
    let mut resolver = resolver(&fake, Duration::ZERO);
    resolver.resolve("a");
    let mut called = false;
    resolver.resolve_all(&names(&["a"]), |_| called = true);
    assert!(!called);
    assert_eq!(fake.calls(), 1);
}

#[test]
fn delay_separates_batches_but_not_after_the_last() {
    let fake = FakeHttp::new(profile_responder);
    let delay = Duration::from_millis(40);
    let mut resolver = resolver(&fake, delay);

    let started = Instant::now();
    let mut stamps = Vec::new();
    resolver.resolve_all(&names(&["a", "b", "c", "d", "e", "f", "g"]), |_| {
        stamps.push(started.elapsed());
    });

    assert_eq!(stamps.len(), 3);
    assert!(stamps[1] - stamps[0] >= delay);
    assert!(stamps[2] - stamps[1] >= delay);
    // Only two gaps for three batches.
    assert!(started.elapsed() < stamps[2] + delay);
}

#[test]
fn lookups_go_through_the_relay_when_configured() {
    let fake = FakeHttp::new(|url| {
        assert!(url.starts_with("https://relay.test/get?url="));
        let envelope = serde_json::json!({
            "contents": r#"{"id":"relayed-id","name":"Steve"}"#,
            "status": {"http_code": 200}
        });
        Ok((200, envelope.to_string()))
    });
    let http: Arc<dyn HttpGet> = fake.clone();
    let relay = RelayConfig {
        url: "https://relay.test/get".to_string(),
        param: "url".to_string(),
        field: "contents".to_string(),
    };
    let mut resolver =
        IdentifierResolver::new(Transport::new(http, Some(relay)), PROFILE_BASE, 3, Duration::ZERO);

    assert_eq!(resolver.resolve("Steve").as_deref(), Some("relayed-id"));
    assert_eq!(
        fake.calls_matching("url=https%3A%2F%2Fprofiles.test%2Fusers%2FSteve"),
        1
    );
}
