//! HTTP transport with retry and rate limiting
//!
//! The client classifies every response into success, retriable failure,
//! or fatal failure, and applies bounded exponential backoff to retriable
//! ones. One request is outstanding at a time.

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::{classify_status, Classification, RetryPolicy};
