//! Sync orchestrator
//!
//! Drives the resource DAG: root streams sync against a single empty
//! context, and each parent record spawns one child sync with the
//! propagated context. Execution is strictly sequential with one
//! outstanding request; bookmarks are written only after the records that
//! produced them were handed to the sink, so an abort at any point leaves
//! the previous checkpoint intact.

mod types;

pub use types::{CollectingSink, JsonLineSink, Message, RecordSink, SyncOutcome, SyncStats};

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::PageCursor;
use crate::state::StateManager;
use crate::streams::{extract_records, QueryPlan, SourceStream, StreamRegistry, SyncContext};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine tying streams, transport, and state together
pub struct SyncEngine {
    client: HttpClient,
    state: StateManager,
    /// Epoch-millis starting cursor for streams with no bookmark
    default_start: String,
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new engine
    pub fn new(client: HttpClient, state: StateManager, default_start_millis: i64) -> Self {
        Self {
            client,
            state,
            default_start: default_start_millis.to_string(),
            stats: SyncStats::default(),
        }
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics for the current run
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync every stream in the registry, parents before children
    ///
    /// Child streams are not synced directly here; they run per parent
    /// record inside their parent's sync.
    pub async fn run(
        &mut self,
        registry: &StreamRegistry,
        sink: &mut dyn RecordSink,
    ) -> Result<SyncStats> {
        let start = Instant::now();
        self.stats = SyncStats::default();

        for stream in registry.roots() {
            self.sync_stream(registry, stream, None, sink).await?;
        }

        self.stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            pages = self.stats.pages_fetched,
            records = self.stats.records_emitted,
            skipped = self.stats.contexts_skipped,
            "sync complete"
        );
        Ok(self.stats)
    }

    /// Sync one stream for one context, recursing into child streams
    pub async fn sync_stream(
        &mut self,
        registry: &StreamRegistry,
        stream: &dyn SourceStream,
        context: Option<&SyncContext>,
        sink: &mut dyn RecordSink,
    ) -> Result<SyncOutcome> {
        let descriptor = stream.descriptor();
        let name = descriptor.name;

        // Starting replication value: persisted bookmark, else the
        // configured start date. Only incremental streams carry one.
        let start_cursor = match descriptor.replication_key {
            Some(_) => Some(
                self.state
                    .get_cursor(name)
                    .await
                    .unwrap_or_else(|| self.default_start.clone()),
            ),
            None => None,
        };

        let children = registry.children_of(name);
        let mut cursor = PageCursor::new();
        let mut max_cursor: Option<String> = None;

        loop {
            let (path, params) =
                match stream.plan_request(start_cursor.as_deref(), cursor.token(), context)? {
                    QueryPlan::Proceed { path, params } => (path, params),
                    QueryPlan::Skip { reason } => {
                        info!(stream = name, %reason, "skipping sync");
                        self.stats.contexts_skipped += 1;
                        return Ok(SyncOutcome::Skipped);
                    }
                };

            let body = self.client.get_json(&path, &params).await?;
            self.stats.pages_fetched += 1;

            let records = extract_records(&body, descriptor.records_path)?;
            let record_count = records.len();
            debug!(stream = name, page = cursor.pages() + 1, records = record_count, "fetched page");

            for record in &records {
                if let Some(key) = descriptor.replication_key {
                    if let Some(value) = cursor_value(record, key) {
                        if is_newer_cursor(max_cursor.as_deref(), &value) {
                            max_cursor = Some(value);
                        }
                    }
                }

                sink.write(Message::record(name, stream.post_process(record.clone())))?;
                self.stats.records_emitted += 1;

                for child in &children {
                    let child_context = stream.child_context(record)?;
                    Box::pin(self.sync_stream(registry, *child, Some(&child_context), sink))
                        .await?;
                }
            }

            let candidate = stream.next_page_token(&body, &records);
            if cursor
                .advance(record_count, descriptor.page_size, candidate)
                .is_done()
            {
                break;
            }
        }

        // Bookmark happens-after every record emission for this context.
        if let Some(max) = max_cursor {
            self.state.advance_cursor(name, max).await?;
            sink.write(Message::state(self.state.to_value().await?))?;
        }

        self.stats.syncs_completed += 1;
        Ok(SyncOutcome::Exhausted)
    }
}

/// Extract a cursor value from a record, supporting dot notation for
/// nested fields (e.g. `data.timestamp`)
fn cursor_value(record: &Value, cursor_field: &str) -> Option<String> {
    let mut current = record;
    for part in cursor_field.split('.') {
        current = current.get(part)?;
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whether `candidate` is a newer cursor than `current`; numeric compare
/// when both parse, lexicographic otherwise
fn is_newer_cursor(current: Option<&str>, candidate: &str) -> bool {
    match current {
        None => true,
        Some(current) => match (current.parse::<i64>(), candidate.parse::<i64>()) {
            (Ok(a), Ok(b)) => b > a,
            _ => candidate > current,
        },
    }
}
