// HiveTail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Config validation in platform::config range-checks against these.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "HiveTail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "HiveTail";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Server
// =============================================================================

/// Hivemind root controller address used when neither config nor CLI set one.
/// 9476 is the controller's stock listening port.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9476";

/// Per-request HTTP timeout (ms). Applies to connect + read.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Minimum user-configurable request timeout (ms).
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 500;

/// Maximum user-configurable request timeout (ms).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000; // 5 min

// =============================================================================
// Live tail
// =============================================================================

/// Initial cursor sent on the first request. Negative positions are resolved
/// by the server as "the last N lines".
pub const DEFAULT_INITIAL_POSITION: i64 = -100;

/// Delay before the first poll after a tail is started (ms).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 10;

/// Time between the end of one poll cycle and the start of the next (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// Minimum user-configurable poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Maximum user-configurable poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000; // 60 s

/// Wait between appending new lines and snapping to the bottom (ms), so the
/// surface has re-measured its content height.
pub const DEFAULT_REFLOW_DELAY_MS: u64 = 10;

/// Maximum user-configurable reflow delay (ms).
pub const MAX_REFLOW_DELAY_MS: u64 = 1_000;

/// Distance from the bottom edge (px) within which the view still counts as
/// "following the tail".
pub const DEFAULT_SCROLL_TOLERANCE_PX: f32 = 1.0;

/// Maximum user-configurable scroll tolerance (px).
pub const MAX_SCROLL_TOLERANCE_PX: f32 = 200.0;

/// Upper bound on the backoff delay after repeated poll failures (ms).
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Maximum user-configurable backoff cap (ms).
pub const ABSOLUTE_MAX_RETRY_DELAY_MS: u64 = 600_000; // 10 min

/// How often the cancel flag is checked within each poll sleep interval (ms).
/// The background thread wakes every this many ms to check for cancellation.
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

// =============================================================================
// Per-frame UI budgets
// =============================================================================

/// Maximum number of live-tail messages processed per UI frame.
pub const MAX_TAIL_MESSAGES_PER_FRAME: usize = 200;

/// Repaint cadence while a tail is active (ms). Snap-to-bottom requests made
/// by the poll thread become visible on the next repaint.
pub const TAIL_REPAINT_INTERVAL_MS: u64 = 250;

/// Maximum number of non-fatal warnings kept for display.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.5;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Viewport height assumed for a surface before the UI has measured it.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
