//! Static stream registry
//!
//! Holds the streams in topological order (parents before children) so the
//! orchestrator can sync in dependency order. The registry is immutable
//! after construction; a child declared before its parent is a fatal
//! configuration error, caught here before any I/O happens.

use super::definitions::{GroupChannelsStream, MessagesStream, UsersStream};
use super::types::SourceStream;
use crate::error::{Error, Result};

/// Ordered, immutable set of streams
pub struct StreamRegistry {
    streams: Vec<Box<dyn SourceStream>>,
}

impl StreamRegistry {
    /// Build a registry from streams in declaration order, validating that
    /// every parent precedes its children
    pub fn new(streams: Vec<Box<dyn SourceStream>>) -> Result<Self> {
        let mut seen: Vec<&str> = Vec::new();
        for stream in &streams {
            let descriptor = stream.descriptor();
            if descriptor.primary_keys.is_empty() {
                return Err(Error::config(format!(
                    "stream '{}' declares no primary keys",
                    descriptor.name
                )));
            }
            if seen.contains(&descriptor.name) {
                return Err(Error::config(format!(
                    "stream '{}' declared twice",
                    descriptor.name
                )));
            }
            if let Some(parent) = descriptor.parent {
                if !seen.contains(&parent) {
                    return Err(Error::config(format!(
                        "stream '{}' declares parent '{parent}' which is not declared before it",
                        descriptor.name
                    )));
                }
            }
            seen.push(descriptor.name);
        }
        Ok(Self { streams })
    }

    /// The built-in Sendbird streams: users, group_channels, messages
    pub fn builtin() -> Result<Self> {
        Self::new(vec![
            Box::new(UsersStream::new()),
            Box::new(GroupChannelsStream::new()),
            Box::new(MessagesStream::new()),
        ])
    }

    /// All streams in topological order
    pub fn iter(&self) -> impl Iterator<Item = &dyn SourceStream> {
        self.streams.iter().map(AsRef::as_ref)
    }

    /// Streams without a parent, in declaration order
    pub fn roots(&self) -> impl Iterator<Item = &dyn SourceStream> {
        self.iter().filter(|s| s.descriptor().parent.is_none())
    }

    /// Direct children of the named stream, in declaration order
    pub fn children_of(&self, parent: &str) -> Vec<&dyn SourceStream> {
        self.iter()
            .filter(|s| s.descriptor().parent == Some(parent))
            .collect()
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&dyn SourceStream> {
        self.iter().find(|s| s.descriptor().name == name)
    }

    /// Stream names in topological order
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|s| s.descriptor().name).collect()
    }
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("streams", &self.names())
            .finish()
    }
}
