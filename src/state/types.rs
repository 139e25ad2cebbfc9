//! Bookmark types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs. A
//! bookmark is keyed by stream name; streams with partitioning enabled
//! keep one cursor per partition key, while the no-partitioning mode
//! (the only mode the built-in streams use) stores a single scalar.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete persisted state for the tap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the global cursor for a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&str> {
        self.streams.get(stream)?.cursor.as_deref()
    }

    /// Advance the global cursor for a stream, keeping it monotonically
    /// non-decreasing
    pub fn advance_cursor(&mut self, stream: &str, candidate: String) {
        let state = self.get_stream_mut(stream);
        if is_newer(state.cursor.as_deref(), &candidate) {
            state.cursor = Some(candidate);
        }
    }
}

/// Bookmarks for a single stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Global cursor value (no-partitioning mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Per-partition cursors, for streams partitioned by context key
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub partitions: HashMap<String, String>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cursor for a partition
    pub fn get_partition_cursor(&self, partition: &str) -> Option<&str> {
        self.partitions.get(partition).map(String::as_str)
    }

    /// Advance a partition cursor, keeping it monotonically non-decreasing
    pub fn advance_partition_cursor(&mut self, partition: &str, candidate: String) {
        let current = self.partitions.get(partition).map(String::as_str);
        if is_newer(current, &candidate) {
            self.partitions.insert(partition.to_string(), candidate);
        }
    }
}

/// Whether `candidate` is newer than `current`
///
/// Cursor values here are epoch timestamps, so compare numerically when
/// both sides parse; falls back to a lexicographic compare for opaque
/// values.
fn is_newer(current: Option<&str>, candidate: &str) -> bool {
    match current {
        None => true,
        Some(current) => match (current.parse::<i64>(), candidate.parse::<i64>()) {
            (Ok(a), Ok(b)) => b > a,
            _ => candidate > current,
        },
    }
}
