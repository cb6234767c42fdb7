// HiveTail - core/model.rs
//
// Core data types shared by the poller, the HTTP client and the UI.

use crate::util::error::NodeIdError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// One response from `GET /nodes/{node}/log`.
///
/// `content` holds the new lines in order; `position` is the cursor to send on
/// the next request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogChunk {
    pub content: Vec<String>,
    pub position: i64,
}

/// A node name that is safe to place in a single URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Validate and wrap a node name. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self, NodeIdError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(NodeIdError::Empty);
        }
        if let Some(ch) = name
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
        {
            return Err(NodeIdError::InvalidChar {
                name: name.to_string(),
                ch,
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Messages sent from a running poller back to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum TailProgress {
    /// The poll thread is up and about to issue its first request.
    Started { node: NodeId },

    /// A cycle succeeded. `appended` lines were added to the surface and the
    /// cursor moved from `requested` to `position`.
    Chunk {
        requested: i64,
        position: i64,
        appended: usize,
        snapped: bool,
    },

    /// A cycle failed; the cursor stays at `requested`. The next attempt is
    /// made after `retry_in`.
    PollFailed {
        requested: i64,
        error: String,
        consecutive_failures: u32,
        retry_in: Duration,
    },

    /// The poller observed its cancel flag and exited.
    Stopped,
}
