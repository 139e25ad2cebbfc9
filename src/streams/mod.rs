//! Stream descriptors, behaviors, and the registry
//!
//! A stream is a resource on the Sendbird API: its static descriptor plus
//! the per-resource behavior behind the [`SourceStream`] trait. The
//! registry enumerates streams parents-first for the orchestrator.

mod definitions;
mod registry;
mod types;

pub use definitions::{
    GroupChannelsStream, MessagesStream, UsersStream, DEFAULT_PAGE_SIZE, MESSAGES_PAGE_SIZE,
};
pub use registry::StreamRegistry;
pub use types::{
    extract_records, QueryPlan, SourceStream, StreamDescriptor, SyncContext, NO_PRIOR_MESSAGE,
};
