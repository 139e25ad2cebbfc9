//! Tap configuration
//!
//! The tap is configured with a small JSON document:
//!
//! ```json
//! {
//!   "app_id": "ABCD-1234",
//!   "api_token": "secret",
//!   "start_date": "2021-05-01T00:00:00Z"
//! }
//! ```
//!
//! `app_id` selects the regional API host, `api_token` is sent as the
//! `Api-Token` header on every request, and `start_date` is the lower bound
//! for incremental streams that have no persisted bookmark yet.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tap configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// The App ID used to construct the API base URL
    pub app_id: String,

    /// API credential, sent as the `Api-Token` request header
    pub api_token: String,

    /// ISO-8601 lower bound for streams with no prior bookmark
    pub start_date: String,
}

impl TapConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields; fails before any I/O is attempted
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(Error::missing_field("app_id"));
        }
        if self.api_token.is_empty() {
            return Err(Error::missing_field("api_token"));
        }
        if self.start_date.is_empty() {
            return Err(Error::missing_field("start_date"));
        }
        self.start_timestamp_millis()?;
        Ok(())
    }

    /// API base URL for this application
    pub fn base_url(&self) -> String {
        format!("https://api-{}.sendbird.com/v3", self.app_id)
    }

    /// Parse `start_date` into an epoch-milliseconds timestamp
    ///
    /// Accepts a full RFC 3339 datetime or a plain `YYYY-MM-DD` date
    /// (interpreted as midnight UTC).
    pub fn start_timestamp_millis(&self) -> Result<i64> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.start_date) {
            return Ok(dt.with_timezone(&Utc).timestamp_millis());
        }

        if let Ok(date) = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d") {
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| Error::invalid_value("start_date", "invalid date"))?;
            return Ok(midnight.and_utc().timestamp_millis());
        }

        Err(Error::invalid_value(
            "start_date",
            format!("'{}' is not an ISO-8601 datetime", self.start_date),
        ))
    }
}
