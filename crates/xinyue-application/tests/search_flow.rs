mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use tokio::time::Instant;
use xinyue_core::backend::{Backend, SearchTarget};
use xinyue_core::config::RateLimitConfig;
use xinyue_core::search::SearchOutcome;
use xinyue_core::EngineConfig;

const SEARCHING: &str = "Searching the whole network, please wait...";

#[tokio::test(start_paused = true)]
async fn test_too_many_requests_retries_with_backoff() {
    let h = harness(plain_config(), MockSearchGateway::always(SearchOutcome::TooManyRequests));

    let started = Instant::now();
    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;
    let elapsed = started.elapsed();

    assert_eq!(h.search.calls(), 3, "max_retries attempts in total");
    assert_eq!(
        replies,
        vec![
            SEARCHING.to_string(),
            "Requests are too frequent, please try again later".to_string()
        ]
    );
    // 2s after the first failure, 4s after the second, none after the last.
    assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_retries_with_fixed_delay() {
    let h = harness(plain_config(), MockSearchGateway::always(SearchOutcome::Status(502)));

    let started = Instant::now();
    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 3);
    assert_eq!(replies[1], "Search service unavailable (status=502)");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_then_success() {
    let search = MockSearchGateway::scripted(vec![SearchOutcome::Timeout], records_body(2));
    let h = harness(plain_config(), search);

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 2);
    assert!(replies[1].starts_with("Found 2 resources:"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_on_every_attempt() {
    let h = harness(plain_config(), MockSearchGateway::always(SearchOutcome::Timeout));

    let started = Instant::now();
    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 3);
    assert_eq!(replies[1], "Search timed out, please try again later");
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert!(h.engine.sessions().snapshot("alice").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_on_every_attempt() {
    let refused = SearchOutcome::Transport("connection refused".to_string());
    let h = harness(plain_config(), MockSearchGateway::always(refused));

    let started = Instant::now();
    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 3);
    assert_eq!(replies[1], "Network error, please check the connection");
    assert!(started.elapsed() >= Duration::from_secs(6));
}

#[tokio::test]
async fn test_not_found_is_terminal() {
    let h = harness(plain_config(), MockSearchGateway::always(SearchOutcome::NotFound));

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 1);
    assert_eq!(
        replies[1],
        "No resources found for 'movie'\n\nTip: try searching another drive"
    );
}

#[tokio::test]
async fn test_broken_json_is_a_parse_failure_without_retry() {
    let broken = SearchOutcome::Body {
        content_type: "application/json".to_string(),
        body: "{\"data\": [".to_string(),
    };
    let h = harness(plain_config(), MockSearchGateway::always(broken));

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    assert_eq!(h.search.calls(), 1);
    assert_eq!(replies[1], "Failed to parse search results");
    assert!(h.engine.sessions().snapshot("alice").await.is_none());
}

#[tokio::test]
async fn test_blank_and_oversized_keywords_make_no_calls() {
    let h = harness(plain_config(), MockSearchGateway::always(records_body(1)));

    let replies = h.engine.search("alice", "   ", SearchTarget::default()).await;
    assert_eq!(replies, vec!["Search keyword cannot be empty".to_string()]);

    let long = "x".repeat(51);
    let replies = h.engine.search("alice", &long, SearchTarget::default()).await;
    assert_eq!(
        replies,
        vec!["Search keyword is too long (more than 50 characters)".to_string()]
    );

    assert_eq!(h.search.calls(), 0);

    let exact = "字".repeat(50);
    h.engine.search("alice", &exact, SearchTarget::default()).await;
    assert_eq!(h.search.calls(), 1, "50 characters is still accepted");
}

#[tokio::test]
async fn test_keyword_is_trimmed_and_target_forwarded() {
    let h = harness(plain_config(), MockSearchGateway::always(records_body(1)));

    h.engine
        .search("alice", "  matrix  ", SearchTarget::narrow(Backend::Baidu).unwrap())
        .await;
    h.engine.search("alice", "matrix", SearchTarget::FullNetwork).await;

    let requests = h.search.requests.lock().unwrap();
    assert_eq!(requests[0].keyword, "matrix");
    assert_eq!(requests[0].target.backend(), Some(Backend::Baidu));
    assert!(requests[1].target.is_full_network());
}

#[tokio::test]
async fn test_wrapped_json_yields_single_page() {
    let body = json_body(json!({"data": [
        {"title": "A", "url": "https://pan.quark.cn/s/a"},
        {"title": "B", "url": "https://pan.baidu.com/s/b"},
        {"title": "C", "url": "https://pan.xunlei.com/s/c"}
    ]}));
    let h = harness(plain_config(), MockSearchGateway::always(body));

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;

    let session = h.engine.sessions().snapshot("alice").await.unwrap();
    assert_eq!(session.results().len(), 3);
    assert_eq!(session.total_pages(), 1);
    assert_eq!(session.current_page(), 1);
    assert!(replies[1].contains("1. A\nLink: https://pan.quark.cn/s/a"));
    assert!(replies[1].contains("3. C\nLink: https://pan.xunlei.com/s/c"));
    assert!(replies[1].contains("Page 1/1"));
}

#[tokio::test]
async fn test_sse_stream_is_folded() {
    let body = sse_body(
        "data: {\"title\":\"One\",\"url\":\"https://pan.quark.cn/s/1\"}\n\
         data: {\"data\":[{\"title\":\"Two\",\"url\":\"https://drive.uc.cn/s/2\"}]}\n\
         data: [DONE]\n",
    );
    let h = harness(plain_config(), MockSearchGateway::always(body));

    let replies = h.engine.search("alice", "movie", SearchTarget::FullNetwork).await;

    assert!(replies[1].starts_with("Found 2 resources:"));
    let session = h.engine.sessions().snapshot("alice").await.unwrap();
    assert_eq!(session.encoding(), xinyue_core::SourceEncoding::Sse);
}

#[tokio::test]
async fn test_empty_result_list() {
    let h = harness(plain_config(), MockSearchGateway::always(json_body(json!([]))));

    let replies = h.engine.search("alice", "nothing", SearchTarget::default()).await;

    assert_eq!(
        replies[1],
        "No resources found for 'nothing'\n\nTip: try searching another drive"
    );
    assert_eq!(h.engine.next_page("alice").await, None);
    assert_eq!(h.engine.previous_page("alice").await, None);
}

#[tokio::test]
async fn test_new_search_replaces_session() {
    let search = MockSearchGateway::scripted(vec![records_body(12)], records_body(3));
    let h = harness(plain_config(), search);

    h.engine.search("alice", "first", SearchTarget::default()).await;
    h.engine.next_page("alice").await;
    h.engine.search("alice", "second", SearchTarget::default()).await;

    let session = h.engine.sessions().snapshot("alice").await.unwrap();
    assert_eq!(session.keyword(), "second");
    assert_eq!(session.results().len(), 3);
    assert_eq!(session.current_page(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_rejects_extra_request() {
    let config = EngineConfig {
        rate_limit: RateLimitConfig {
            max_requests: 3,
            window_secs: 60,
        },
        ..plain_config()
    };
    let h = harness(config, MockSearchGateway::always(records_body(1)));

    for _ in 0..3 {
        let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;
        assert_eq!(replies.len(), 2);
    }

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;
    assert_eq!(
        replies,
        vec!["Too many requests, please retry in 60 seconds".to_string()]
    );
    assert_eq!(h.search.calls(), 3);

    let replies = h.engine.search("bob", "movie", SearchTarget::default()).await;
    assert_eq!(replies.len(), 2, "other identities keep their own window");

    tokio::time::advance(Duration::from_secs(60)).await;
    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;
    assert_eq!(replies.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_keyword_counts_against_rate_limit() {
    let config = EngineConfig {
        rate_limit: RateLimitConfig {
            max_requests: 1,
            window_secs: 60,
        },
        ..plain_config()
    };
    let h = harness(config, MockSearchGateway::always(records_body(1)));

    let replies = h.engine.search("alice", "   ", SearchTarget::default()).await;
    assert_eq!(replies, vec!["Search keyword cannot be empty".to_string()]);

    let replies = h.engine.search("alice", "movie", SearchTarget::default()).await;
    assert_eq!(
        replies,
        vec!["Too many requests, please retry in 60 seconds".to_string()]
    );
    assert_eq!(h.search.calls(), 0);
}

#[tokio::test]
async fn test_entitlement_denied_blocks_everything() {
    let h = harness_with(plain_config(), MockSearchGateway::always(records_body(3)), false);

    let denied = "This service is not licensed".to_string();
    assert_eq!(
        h.engine.search("alice", "movie", SearchTarget::default()).await,
        vec![denied.clone()]
    );
    assert_eq!(h.engine.local_search("alice", "movie").await, vec![denied.clone()]);
    assert_eq!(h.engine.next_page("alice").await, Some(denied.clone()));
    assert_eq!(h.engine.render("alice", 1).await, denied);
    assert_eq!(h.search.calls(), 0);
}

#[tokio::test]
async fn test_identities_do_not_share_sessions() {
    let search = MockSearchGateway::scripted(vec![records_body(2)], records_body(9));
    let h = harness(plain_config(), search);

    let (a, b) = tokio::join!(
        h.engine.search("alice", "one", SearchTarget::default()),
        h.engine.search("bob", "two", SearchTarget::default()),
    );
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 2);

    let alice = h.engine.sessions().snapshot("alice").await.unwrap();
    let bob = h.engine.sessions().snapshot("bob").await.unwrap();
    assert_eq!(alice.keyword(), "one");
    assert_eq!(bob.keyword(), "two");
    assert_eq!(alice.results().len() + bob.results().len(), 11);
}
