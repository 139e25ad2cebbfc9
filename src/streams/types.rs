//! Stream types and the capability trait
//!
//! Each Sendbird resource is described by a static [`StreamDescriptor`]
//! and a [`SourceStream`] implementation covering the behavior that varies
//! per resource: query planning, next-page tokens, child context
//! derivation, and record post-processing.

use crate::error::{Error, Result};
use crate::transform;
use serde_json::Value;

/// Watermark sentinel: the parent channel has no known prior message
pub const NO_PRIOR_MESSAGE: i64 = -1;

/// Static metadata for one stream, fixed at startup
#[derive(Debug, Clone)]
pub struct StreamDescriptor {
    /// Stream name, also the bookmark key
    pub name: &'static str,
    /// Request path (child streams build theirs from context instead)
    pub path: &'static str,
    /// Identity fields, never empty
    pub primary_keys: &'static [&'static str],
    /// JSON path the records live under, e.g. `$.users[*]`
    pub records_path: &'static str,
    /// Replication (cursor) field for incremental streams
    pub replication_key: Option<&'static str>,
    /// Parent stream name for child streams
    pub parent: Option<&'static str>,
    /// Records requested per page
    pub page_size: usize,
}

/// Context propagated from a parent channel record to its message sync
///
/// Derivation is pure: it never touches I/O and never mutates the parent
/// record, and it is total - every channel yields a context, with
/// [`NO_PRIOR_MESSAGE`] standing in when the channel has no last message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    /// Channel kind tag, fixed to `group_channel`
    pub channel_type: &'static str,
    /// URL identifying the parent channel
    pub channel_url: String,
    /// Timestamp of the channel's most recent known message, or
    /// [`NO_PRIOR_MESSAGE`]
    pub last_message_ts: i64,
}

/// Outcome of planning the next request for a stream
///
/// The skip decision is made here, during planning, and consumed by the
/// orchestrator; no request is issued for a skipped context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Issue a GET for `path` with `params`
    Proceed {
        path: String,
        params: Vec<(String, String)>,
    },
    /// Nothing new can exist for this context; do not request at all
    Skip { reason: String },
}

/// Common capability interface implemented by every stream
pub trait SourceStream: Send + Sync {
    /// Static metadata for this stream
    fn descriptor(&self) -> &StreamDescriptor;

    /// Plan the next page request
    ///
    /// `start_cursor` is the starting replication value (bookmark or
    /// configured start date, epoch millis as a string) for incremental
    /// streams; `page_token` is the continuation token after the first
    /// page; `context` is present for child streams only.
    fn plan_request(
        &self,
        start_cursor: Option<&str>,
        page_token: Option<&str>,
        context: Option<&SyncContext>,
    ) -> Result<QueryPlan>;

    /// Compute the continuation token from a fetched page, or None when
    /// the remote signals exhaustion
    ///
    /// The default covers root resources: an opaque token under `next` in
    /// the response body.
    fn next_page_token(&self, body: &Value, records: &[Value]) -> Option<String> {
        let _ = records;
        match body.get("next") {
            Some(Value::String(token)) if !token.is_empty() => Some(token.clone()),
            _ => None,
        }
    }

    /// Derive the sync context for child streams from one parent record
    fn child_context(&self, record: &Value) -> Result<SyncContext> {
        let _ = record;
        Err(Error::state(format!(
            "stream '{}' has no child streams",
            self.descriptor().name
        )))
    }

    /// Transform a record before emission
    fn post_process(&self, record: Value) -> Value {
        transform::clean_record(record)
    }
}

/// Extract the record array from a response body using a `$.field[*]` path
///
/// An absent or null field reads as an empty page; a present non-array
/// value is a shape violation.
pub fn extract_records(body: &Value, records_path: &str) -> Result<Vec<Value>> {
    let field = records_path
        .strip_prefix("$.")
        .and_then(|p| p.strip_suffix("[*]"))
        .ok_or_else(|| Error::extraction(records_path, "unsupported extraction path"))?;

    match body.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(Error::extraction(
            records_path,
            format!("expected an array, found {other}"),
        )),
    }
}
