use std::sync::Arc;

use tempfile::TempDir;

use eveapi::{
    ApiKey, DiskCache, Error, ErrorCachePolicy, MemoryCache, Params, cache_key, parse_timestamp,
};

use crate::common::test_helpers::{
    CACHED_UNTIL_TS, CURRENT_TIME, CURRENT_TS, TestApi, error_body, param, success_body,
};

const ROWSET: &str = r#"<rowset><row foo="bar"/><row foo="baz"/></rowset>"#;

#[test]
fn test_success_envelope_end_to_end() {
    let harness = TestApi::new();
    harness.transport.respond("foo/Bar", success_body(ROWSET));

    let envelope = harness.api.fetch("foo/Bar", &Params::new()).unwrap();

    assert_eq!(envelope.timestamp, CURRENT_TS);
    assert_eq!(envelope.expires, CACHED_UNTIL_TS);
    assert_eq!(envelope.ttl(), 1258563931 - 1255885531);
    assert_eq!(envelope.result.child("rowset").unwrap().rows().count(), 2);

    let key = harness.api.request_key("foo/Bar", &Params::new()).unwrap();
    assert!(harness.cache.get(&key).unwrap().is_some());
}

#[test]
fn test_cache_hit_suppresses_network() {
    let harness = TestApi::new();
    harness.transport.respond("foo/Bar", success_body(ROWSET));

    let params = Params::new().with("a", 1i64);
    let first = harness.api.fetch("foo/Bar", &params).unwrap();
    let second = harness.api.fetch("foo/Bar", &params).unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.transport.request_count(), 1);
}

#[test]
fn test_prepopulated_cache_answers_without_network() {
    let harness = TestApi::new();
    let key = harness.api.request_key("foo/Bar", &Params::new()).unwrap();
    harness.cache.put(&key, &success_body(ROWSET), 3600).unwrap();

    let envelope = harness.api.fetch("foo/Bar", &Params::new()).unwrap();
    assert_eq!(envelope.result.child("rowset").unwrap().rows().count(), 2);
    assert_eq!(harness.transport.request_count(), 0);
}

#[test]
fn test_error_envelope_is_replayed_from_cache() {
    let harness = TestApi::new();
    harness.transport.respond(
        "eve/Broken",
        error_body(123, "Test error message.", CURRENT_TIME, "2009-11-18 19:05:31"),
    );

    let first = harness.api.fetch("eve/Broken", &Params::new()).unwrap_err();
    let api_error = first.as_api_error().unwrap().clone();
    assert_eq!(api_error.code, 123);
    assert_eq!(api_error.message, "Test error message.");
    assert_eq!(api_error.timestamp, 1255885531);
    assert_eq!(api_error.expires, 1258571131);
    assert_eq!(
        harness.api.last_timestamps(),
        Some((1255885531, 1258571131))
    );

    // The server now answers successfully, but the cached error still wins
    harness.transport.respond("eve/Broken", success_body(ROWSET));
    let second = harness.api.fetch("eve/Broken", &Params::new()).unwrap_err();
    assert_eq!(second.as_api_error(), Some(&api_error));
    assert_eq!(harness.transport.request_count(), 1);
}

#[test]
fn test_skip_policy_retries_after_error() {
    let harness = TestApi::build(Arc::new(MemoryCache::new(10)), |api| {
        api.with_error_policy(ErrorCachePolicy::Skip)
    });
    harness.transport.respond(
        "eve/Broken",
        error_body(123, "Test error message.", CURRENT_TIME, "2009-11-18 19:05:31"),
    );
    assert!(harness.api.fetch("eve/Broken", &Params::new()).is_err());

    harness.transport.respond("eve/Broken", success_body(ROWSET));
    assert!(harness.api.fetch("eve/Broken", &Params::new()).is_ok());
    assert_eq!(harness.transport.request_count(), 2);
}

#[test]
fn test_expired_envelope_is_not_reused() {
    let harness = TestApi::new();
    // cachedUntil equal to currentTime grants no lifetime at all
    harness.transport.respond(
        "foo/Bar",
        crate::common::test_helpers::success_body_at(ROWSET, CURRENT_TIME, CURRENT_TIME),
    );

    harness.api.fetch("foo/Bar", &Params::new()).unwrap();
    harness.api.fetch("foo/Bar", &Params::new()).unwrap();
    assert_eq!(harness.transport.request_count(), 2);
}

#[test]
fn test_transport_failure_propagates_without_retry() {
    let harness = TestApi::new();
    harness.transport.fail("foo/Bar", 500);

    let err = harness.api.fetch("foo/Bar", &Params::new()).unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(harness.transport.request_count(), 1);
    assert_eq!(harness.api.last_timestamps(), None);
}

#[test]
fn test_malformed_xml_is_parse_error_and_not_cached() {
    let harness = TestApi::new();
    harness.transport.respond("foo/Bar", "<eveapi><currentTime>");

    assert!(matches!(
        harness.api.fetch("foo/Bar", &Params::new()),
        Err(Error::Parse { .. })
    ));
    let key = harness.api.request_key("foo/Bar", &Params::new()).unwrap();
    assert_eq!(harness.cache.get(&key).unwrap(), None);
}

#[test]
fn test_request_method_and_parameters() {
    let harness = TestApi::new();
    harness.transport.respond("foo/Bar", success_body(ROWSET));

    let params = Params::new()
        .with("ids", vec![1i64, 2, 3])
        .with("skip", Option::<i64>::None)
        .with("flag", true);
    harness.api.fetch("foo/Bar", &params).unwrap();

    let request = harness.transport.only_request();
    assert_eq!(request.url, "https://api.eveonline.com/foo/Bar.xml.aspx");
    assert_eq!(param(&request.params, "ids"), Some("1,2,3"));
    assert_eq!(param(&request.params, "flag"), Some("1"));
    assert_eq!(param(&request.params, "skip"), None);
    assert_eq!(request.params.len(), 2);
}

#[test]
fn test_credentials_are_sent() {
    let harness = TestApi::build(Arc::new(MemoryCache::new(10)), |api| {
        api.with_api_key(ApiKey::new(42, "secret"))
            .with_base_host("api.testeveonline.com")
    });
    harness.transport.respond("account/Characters", success_body(""));

    harness
        .api
        .fetch("account/Characters", &Params::new())
        .unwrap();

    let request = harness.transport.only_request();
    assert!(request.url.starts_with("https://api.testeveonline.com/"));
    assert_eq!(param(&request.params, "keyID"), Some("42"));
    assert_eq!(param(&request.params, "vCode"), Some("secret"));
}

#[test]
fn test_parameter_order_does_not_change_cache_entry() {
    let harness = TestApi::new();
    harness.transport.respond("foo/Bar", success_body(ROWSET));

    let forward = Params::new().with("a", 1i64).with("b", 2i64);
    let backward = Params::new().with("b", 2i64).with("a", 1i64);
    harness.api.fetch("foo/Bar", &forward).unwrap();
    harness.api.fetch("foo/Bar", &backward).unwrap();

    assert_eq!(harness.transport.request_count(), 1);
}

#[test]
fn test_cache_key_properties() {
    let pairs = |items: &[(&str, &str)]| -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };

    assert_eq!(
        cache_key("foo", &pairs(&[("a", "1"), ("b", "2")])),
        cache_key("foo", &pairs(&[("b", "2"), ("a", "1")]))
    );
    assert_ne!(
        cache_key("foo", &pairs(&[("a", "1")])),
        cache_key("foo", &pairs(&[("a", "2")]))
    );
    assert_ne!(
        cache_key("foo", &pairs(&[("a", "1")])),
        cache_key("foo", &pairs(&[("b", "1")]))
    );
    assert_ne!(cache_key("foo", &[]), cache_key("bar", &[]));

    // Stable across runs: a fixed input always hashes to the same hex digest
    let key = cache_key("server/ServerStatus", &[]);
    assert_eq!(key.len(), 64);
    assert_eq!(key, cache_key("server/ServerStatus", &[]));
}

#[test]
fn test_timestamp_literal() {
    assert_eq!(parse_timestamp("2012-06-12 12:04:33").unwrap(), 1339502673);
}

#[test]
fn test_disk_cache_shared_between_clients() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("cache");

    let first = TestApi::with_cache(Arc::new(DiskCache::new(dir.clone())));
    first.transport.respond("foo/Bar", success_body(ROWSET));
    first.api.fetch("foo/Bar", &Params::new()).unwrap();

    let second = TestApi::with_cache(Arc::new(DiskCache::new(dir)));
    let envelope = second.api.fetch("foo/Bar", &Params::new()).unwrap();
    assert_eq!(envelope.timestamp, CURRENT_TS);
    assert_eq!(second.transport.request_count(), 0);
}
