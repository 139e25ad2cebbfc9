//! Page cursor state and cursor value helpers
//!
//! A [`PageCursor`] drives one resource's fetch loop to exhaustion for a
//! single sync context. It lives only for the duration of that sync and is
//! never persisted; resumable progress is the state module's job.

use crate::error::{Error, Result};

/// Width of a millisecond-epoch timestamp in decimal digits
pub const MILLIS_DIGITS: usize = 13;

/// Normalize an epoch timestamp string to millisecond precision
///
/// Values supplied with fewer digits (e.g. second-precision epochs) are
/// zero-padded on the right. More than 13 digits violates the cursor
/// contract and is rejected rather than silently truncated.
///
/// ```
/// # use sendbird_tap::pagination::pad_to_millis;
/// assert_eq!(pad_to_millis("1620000000").unwrap(), "1620000000000");
/// ```
pub fn pad_to_millis(ts: &str) -> Result<String> {
    if ts.len() > MILLIS_DIGITS {
        return Err(Error::contract(format!(
            "cursor value '{ts}' exceeds {MILLIS_DIGITS} digits"
        )));
    }
    Ok(format!("{ts:0<MILLIS_DIGITS$}"))
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available, continue with the stored token
    Continue,
    /// No more pages for this context
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Tracks pagination progress for one (resource, context) sync
#[derive(Debug, Clone, Default)]
pub struct PageCursor {
    token: Option<String>,
    pages: u32,
    exhausted: bool,
}

impl PageCursor {
    /// Create a cursor positioned before the first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Current continuation token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Number of pages fetched so far
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Whether the resource is exhausted for this context
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advance past a fetched page
    ///
    /// A page shorter than `page_size` means the collection is exhausted,
    /// as does the absence of a next token. A candidate token equal to the
    /// previous one also terminates: requiring the token to change on every
    /// page rules out looping forever on an unchanged cursor.
    pub fn advance(
        &mut self,
        record_count: usize,
        page_size: usize,
        candidate: Option<String>,
    ) -> NextPage {
        self.pages += 1;

        if record_count < page_size {
            self.exhausted = true;
            return NextPage::Done;
        }

        match candidate {
            Some(next) if self.token.as_deref() != Some(next.as_str()) => {
                self.token = Some(next);
                NextPage::Continue
            }
            _ => {
                self.exhausted = true;
                NextPage::Done
            }
        }
    }
}
