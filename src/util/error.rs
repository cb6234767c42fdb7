// HiveTail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all HiveTail operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum HiveTailError {
    /// An HTTP request to the Hivemind controller failed.
    Fetch(FetchError),

    /// A node identifier was rejected before any request was made.
    Node(NodeIdError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for HiveTailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Request error: {e}"),
            Self::Node(e) => write!(f, "Node error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for HiveTailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors from a single JSON request against the controller.
///
/// The poll loop treats every variant the same way (log, keep the cursor,
/// retry later); the split exists so diagnostics say what actually broke.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure before a status was received.
    Transport {
        url: String,
        source: Box<ureq::Transport>,
    },

    /// The server answered with a status outside 200-299.
    Status {
        url: String,
        code: u16,
        status_text: String,
    },

    /// The body could not be read or was not the expected JSON shape.
    Decode { url: String, source: io::Error },
}

impl FetchError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, source } => write!(f, "GET {url} failed: {source}"),
            Self::Status {
                url,
                code,
                status_text,
            } => write!(f, "GET {url} returned {code} {status_text}"),
            Self::Decode { url, source } => {
                write!(f, "GET {url} returned an unreadable body: {source}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source.as_ref()),
            Self::Decode { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

impl From<FetchError> for HiveTailError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Node identifier errors
// ---------------------------------------------------------------------------

/// Reasons a string cannot be used as a node identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeIdError {
    /// Empty or whitespace-only input.
    Empty,

    /// The name contains a character that cannot appear in a single URL
    /// path segment without escaping.
    InvalidChar { name: String, ch: char },
}

impl fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "node name must not be empty"),
            Self::InvalidChar { name, ch } => {
                write!(f, "node name '{name}' contains invalid character {ch:?}")
            }
        }
    }
}

impl std::error::Error for NodeIdError {}

impl From<NodeIdError> for HiveTailError {
    fn from(e: NodeIdError) -> Self {
        Self::Node(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for HiveTailError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for HiveTail results.
pub type Result<T> = std::result::Result<T, HiveTailError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_status_error_display_names_code_and_url() {
        let err = FetchError::Status {
            url: "http://hive/nodes/a/log".to_string(),
            code: 404,
            status_text: "Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET http://hive/nodes/a/log returned 404 Not Found"
        );
        assert_eq!(err.url(), "http://hive/nodes/a/log");
    }

    #[test]
    fn test_top_level_error_preserves_source_chain() {
        let err: HiveTailError = FetchError::Decode {
            url: "http://hive/x".to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, "expected value"),
        }
        .into();
        let fetch = err.source().expect("fetch error source");
        assert!(fetch.source().is_some(), "decode error should expose io source");
    }

    #[test]
    fn test_node_error_display() {
        let err = NodeIdError::InvalidChar {
            name: "a/b".to_string(),
            ch: '/',
        };
        assert_eq!(
            err.to_string(),
            "node name 'a/b' contains invalid character '/'"
        );
    }
}
