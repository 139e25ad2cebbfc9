//! Engine types
//!
//! Output messages, the sink boundary, and sync bookkeeping.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// A message emitted during sync, serialized as one JSON line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
    /// A single extracted record
    #[serde(rename = "RECORD")]
    Record {
        /// Stream name
        stream: String,
        /// The record payload
        record: Value,
    },
    /// Bookmark snapshot, emitted after a resource completes
    #[serde(rename = "STATE")]
    State {
        /// The full bookmark state
        value: Value,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Value) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
        }
    }

    /// Create a state message
    pub fn state(value: Value) -> Self {
        Self::State { value }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

/// Downstream boundary receiving emitted messages
///
/// The engine never buffers records; each one is handed to the sink in the
/// order the remote API returned it.
pub trait RecordSink {
    /// Emit one message
    fn write(&mut self, message: Message) -> Result<()>;
}

/// Sink writing one JSON line per message
pub struct JsonLineSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLineSink<W> {
    /// Create a sink over any writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> RecordSink for JsonLineSink<W> {
    fn write(&mut self, message: Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Sink collecting messages in memory, used by tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Messages in emission order
    pub messages: Vec<Message>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for the given stream, in order
    pub fn records_for(&self, stream: &str) -> Vec<&Value> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record { stream: s, record } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }
}

impl RecordSink for CollectingSink {
    fn write(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}

/// Outcome of syncing one (resource, context) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// All pages fetched, bookmark persisted
    Exhausted,
    /// Early-terminated before the first request
    Skipped,
}

/// Counters for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Pages fetched (one HTTP request each)
    pub pages_fetched: u64,
    /// Records handed to the sink
    pub records_emitted: u64,
    /// Resource-context syncs that ran to exhaustion
    pub syncs_completed: u64,
    /// Child contexts skipped without a request
    pub contexts_skipped: u64,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}
