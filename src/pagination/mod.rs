//! Pagination cursor state machine
//!
//! Drives one resource's page-fetch loop to exhaustion for a given sync
//! context, with a progress guarantee: an unchanged continuation token
//! terminates the loop instead of re-requesting the same page forever.

mod cursor;

pub use cursor::{pad_to_millis, NextPage, PageCursor, MILLIS_DIGITS};
