//! Integration tests using a mock HTTP server
//!
//! Exercises the full flow: registry → engine → HTTP → records → bookmarks.

use sendbird_tap::engine::{CollectingSink, SyncEngine, SyncOutcome};
use sendbird_tap::error::Result;
use sendbird_tap::http::{HttpClient, HttpClientConfig, RetryPolicy};
use sendbird_tap::state::StateManager;
use sendbird_tap::streams::{
    GroupChannelsStream, MessagesStream, QueryPlan, SourceStream, StreamDescriptor,
    StreamRegistry, SyncContext, UsersStream,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START_MS: i64 = 1_620_000_000_000;

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(
        HttpClientConfig::new(server.uri(), "test-token")
            .with_retry(RetryPolicy::new(10, Duration::from_millis(1)))
            .without_rate_limit(),
    )
    .unwrap()
}

fn engine_for(server: &MockServer) -> SyncEngine {
    SyncEngine::new(client_for(server), StateManager::in_memory(), START_MS)
}

fn messages_page(from: i64, count: usize) -> Value {
    let messages: Vec<Value> = (0..count as i64)
        .map(|i| json!({"message_id": from + i, "created_at": from + i, "message": "m"}))
        .collect();
    json!({ "messages": messages })
}

// ============================================================================
// Root resource with a cursor field
// ============================================================================

/// A root stream with a replication key, for exercising the generic
/// incremental path of the engine.
struct EventsStream {
    descriptor: StreamDescriptor,
}

impl EventsStream {
    fn new() -> Self {
        Self {
            descriptor: StreamDescriptor {
                name: "events",
                path: "/events",
                primary_keys: &["event_id"],
                records_path: "$.events[*]",
                replication_key: Some("created_at"),
                parent: None,
                page_size: 100,
            },
        }
    }
}

impl SourceStream for EventsStream {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn plan_request(
        &self,
        start_cursor: Option<&str>,
        page_token: Option<&str>,
        _context: Option<&SyncContext>,
    ) -> Result<QueryPlan> {
        let mut params = vec![("limit".to_string(), "100".to_string())];
        if let Some(start) = start_cursor {
            params.push(("created_at".to_string(), start.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("token".to_string(), token.to_string()));
        }
        Ok(QueryPlan::Proceed {
            path: self.descriptor.path.to_string(),
            params,
        })
    }
}

#[tokio::test]
async fn test_short_root_page_exhausts_with_bookmark() {
    let server = MockServer::start().await;

    let events: Vec<Value> = (0..50)
        .map(|i| json!({"event_id": i, "created_at": START_MS + i}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": events})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = StreamRegistry::new(vec![Box::new(EventsStream::new())]).unwrap();
    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();

    let stats = engine.run(&registry, &mut sink).await.unwrap();

    // 50 records on a 100-record page: exhausted after exactly one request.
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.records_emitted, 50);
    assert_eq!(
        engine.state().get_cursor("events").await,
        Some((START_MS + 49).to_string())
    );
}

// ============================================================================
// Child resource: two-page window walk
// ============================================================================

#[tokio::test]
async fn test_messages_two_page_walk_in_order() {
    let server = MockServer::start().await;
    let page1_last = START_MS + 199;

    Mock::given(method("GET"))
        .and(path("/group_channels/ch_1/messages"))
        .and(query_param("message_ts", START_MS.to_string()))
        .and(query_param("prev_limit", "0"))
        .and(query_param("next_limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(START_MS, 200)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/ch_1/messages"))
        .and(query_param("message_ts", page1_last.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(page1_last + 1, 120)))
        .expect(1)
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();
    let stream = registry.get("messages").unwrap();
    let context = SyncContext {
        channel_type: "group_channel",
        channel_url: "ch_1".to_string(),
        last_message_ts: START_MS + 400,
    };

    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();
    let outcome = engine
        .sync_stream(&registry, stream, Some(&context), &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Exhausted);
    assert_eq!(engine.stats().pages_fetched, 2);

    let records = sink.records_for("messages");
    assert_eq!(records.len(), 320);
    let cursors: Vec<i64> = records
        .iter()
        .map(|r| r["created_at"].as_i64().unwrap())
        .collect();
    let mut sorted = cursors.clone();
    sorted.sort_unstable();
    assert_eq!(cursors, sorted, "records must be emitted in API order");

    // Bookmark is the max created_at across both pages.
    assert_eq!(
        engine.state().get_cursor("messages").await,
        Some((page1_last + 120).to_string())
    );
}

// ============================================================================
// Early termination: stale channels issue zero requests
// ============================================================================

#[tokio::test]
async fn test_stale_channel_skipped_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    // One channel whose last activity predates the start date.
    Mock::given(method("GET"))
        .and(path("/group_channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [
                {"channel_url": "stale", "last_message": {"created_at": START_MS - 1000}}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/stale/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(START_MS, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();
    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();

    let stats = engine.run(&registry, &mut sink).await.unwrap();

    assert_eq!(stats.contexts_skipped, 1);
    assert!(sink.records_for("messages").is_empty());
    // Skipped context never writes a bookmark.
    assert!(engine.state().get_cursor("messages").await.is_none());
}

#[tokio::test]
async fn test_channel_without_messages_still_synced_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    // No last_message at all: watermark is the sentinel, sync proceeds.
    Mock::given(method("GET"))
        .and(path("/group_channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [{"channel_url": "empty"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/empty/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();
    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();

    let stats = engine.run(&registry, &mut sink).await.unwrap();
    assert_eq!(stats.contexts_skipped, 0);
}

// ============================================================================
// Full hierarchy
// ============================================================================

#[tokio::test]
async fn test_full_sync_emits_all_streams() {
    let server = MockServer::start().await;
    let active_ts = START_MS + 5000;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"user_id": "u1", "metadata": {"tier": "gold"}},
                {"user_id": "u2"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels"))
        .and(query_param("show_member", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [
                {"channel_url": "active", "last_message": {"created_at": active_ts}},
                {"channel_url": "stale", "last_message": {"created_at": START_MS - 1}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/active/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(active_ts, 3)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/stale/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(START_MS, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();
    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();

    let stats = engine.run(&registry, &mut sink).await.unwrap();

    assert_eq!(sink.records_for("users").len(), 2);
    assert_eq!(sink.records_for("group_channels").len(), 2);
    assert_eq!(sink.records_for("messages").len(), 3);
    assert_eq!(stats.contexts_skipped, 1);

    // Post-processing: the metadata object left as a JSON string.
    let users = sink.records_for("users");
    assert_eq!(users[0]["metadata"], json!("{\"tier\":\"gold\"}"));

    assert_eq!(
        engine.state().get_cursor("messages").await,
        Some((active_ts + 2).to_string())
    );
}

#[tokio::test]
async fn test_root_opaque_token_pagination() {
    let server = MockServer::start().await;

    let page1: Vec<Value> = (0..100).map(|i| json!({"user_id": i})).collect();
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("token", "tok2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"users": [{"user_id": 100}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"users": page1, "next": "tok2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = StreamRegistry::new(vec![Box::new(UsersStream::new())]).unwrap();
    let mut engine = engine_for(&server);
    let mut sink = CollectingSink::new();

    let stats = engine.run(&registry, &mut sink).await.unwrap();
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(sink.records_for("users").len(), 101);
}

// ============================================================================
// Bookmark durability and monotonicity
// ============================================================================

#[tokio::test]
async fn test_bookmark_monotonic_across_runs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    // The watermark lags the newest message, as it does when activity
    // lands between the channel listing and the message fetch.
    Mock::given(method("GET"))
        .and(path("/group_channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [{"channel_url": "c", "last_message": {"created_at": START_MS + 5}}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/c/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(START_MS + 1, 10)))
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();

    let first = {
        let state = StateManager::from_file(&state_path).unwrap();
        let mut engine = SyncEngine::new(client_for(&server), state, START_MS);
        let mut sink = CollectingSink::new();
        engine.run(&registry, &mut sink).await.unwrap();
        engine.state().get_cursor("messages").await.unwrap()
    };

    // Second run against unchanged data: the channel watermark now
    // predates the bookmark, so the sync is skipped and the bookmark
    // stays put.
    let second = {
        let state = StateManager::from_file(&state_path).unwrap();
        let mut engine = SyncEngine::new(client_for(&server), state, START_MS);
        let mut sink = CollectingSink::new();
        let stats = engine.run(&registry, &mut sink).await.unwrap();
        assert_eq!(stats.contexts_skipped, 1);
        engine.state().get_cursor("messages").await.unwrap()
    };

    assert!(second.parse::<i64>().unwrap() >= first.parse::<i64>().unwrap());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_stream_keeps_completed_bookmarks() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [
                {"channel_url": "good", "last_message": {"created_at": START_MS + 10}},
                {"channel_url": "bad", "last_message": {"created_at": START_MS + 10}}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group_channels/good/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_page(START_MS + 1, 5)))
        .mount(&server)
        .await;

    // Fatal on the first attempt; aborts the run.
    Mock::given(method("GET"))
        .and(path("/group_channels/bad/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = StreamRegistry::builtin().unwrap();
    let state = StateManager::from_file(&state_path).unwrap();
    let mut engine = SyncEngine::new(client_for(&server), state, START_MS);
    let mut sink = CollectingSink::new();

    assert!(engine.run(&registry, &mut sink).await.is_err());

    // The first channel's pages were checkpointed before the failure.
    let reloaded = StateManager::from_file(&state_path).unwrap();
    assert_eq!(
        reloaded.get_cursor("messages").await,
        Some((START_MS + 5).to_string())
    );
}

// ============================================================================
// Context derivation sanity (public API level)
// ============================================================================

#[test]
fn test_channel_context_watermark_sources() {
    let channels = GroupChannelsStream::new();

    let record = json!({"channel_url": "a", "last_message": {"created_at": 42}});
    assert_eq!(channels.child_context(&record).unwrap().last_message_ts, 42);

    let record = json!({"channel_url": "a"});
    let context = channels.child_context(&record).unwrap();
    let plan = MessagesStream::new()
        .plan_request(Some(&START_MS.to_string()), None, Some(&context))
        .unwrap();
    assert!(matches!(plan, QueryPlan::Proceed { .. }));
}
