// HiveTail - platform/config.rs
//
// Platform-specific configuration path resolution and config.toml loading
// with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for HiveTail configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/hivetail/ or %APPDATA%\HiveTail\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Controller root URL, e.g. "http://127.0.0.1:9476".
    pub base_url: Option<String>,
    /// Per-request timeout in ms.
    pub request_timeout_ms: Option<u64>,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Cursor for the first request (negative = last N lines).
    pub initial_position: Option<i64>,
    /// Delay before the first request in ms.
    pub initial_delay_ms: Option<u64>,
    /// Delay between polls in ms.
    pub poll_interval_ms: Option<u64>,
    /// Wait between append and snap-to-bottom in ms.
    pub reflow_delay_ms: Option<u64>,
    /// Distance from the bottom (px) that still counts as following.
    pub scroll_tolerance_px: Option<f32>,
    /// Cap on the retry delay after repeated failures in ms.
    pub max_retry_delay_ms: Option<u64>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Server --
    pub base_url: String,
    pub request_timeout_ms: u64,

    // -- Tail --
    pub initial_position: i64,
    pub initial_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub reflow_delay_ms: u64,
    pub scroll_tolerance_px: f32,
    pub max_retry_delay_ms: u64,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    /// Body font size in points.
    pub font_size: f32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
            initial_position: constants::DEFAULT_INITIAL_POSITION,
            initial_delay_ms: constants::DEFAULT_INITIAL_DELAY_MS,
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            reflow_delay_ms: constants::DEFAULT_REFLOW_DELAY_MS,
            scroll_tolerance_px: constants::DEFAULT_SCROLL_TOLERANCE_PX,
            max_retry_delay_ms: constants::DEFAULT_MAX_RETRY_DELAY_MS,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Check a base URL for the one thing ureq cannot recover from later: a
/// missing or unsupported scheme.
pub fn is_valid_base_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning so the
/// application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!(
                "{err}. Using defaults. See config.example.toml for the expected format."
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Server: base_url --
    if let Some(url) = raw.server.base_url {
        if is_valid_base_url(&url) {
            config.base_url = url;
        } else {
            warnings.push(format!(
                "[server] base_url = \"{url}\" must start with http:// or https://. Using default ({}).",
                constants::DEFAULT_BASE_URL,
            ));
        }
    }

    // -- Server: request_timeout_ms --
    if let Some(ms) = raw.server.request_timeout_ms {
        if (constants::MIN_REQUEST_TIMEOUT_MS..=constants::MAX_REQUEST_TIMEOUT_MS).contains(&ms) {
            config.request_timeout_ms = ms;
        } else {
            warnings.push(format!(
                "[server] request_timeout_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_REQUEST_TIMEOUT_MS,
                constants::MAX_REQUEST_TIMEOUT_MS,
                constants::DEFAULT_REQUEST_TIMEOUT_MS,
            ));
        }
    }

    // -- Tail: initial_position (any value; the server interprets it) --
    if let Some(pos) = raw.tail.initial_position {
        config.initial_position = pos;
    }

    // -- Tail: initial_delay_ms --
    if let Some(ms) = raw.tail.initial_delay_ms {
        if ms <= constants::MAX_POLL_INTERVAL_MS {
            config.initial_delay_ms = ms;
        } else {
            warnings.push(format!(
                "[tail] initial_delay_ms = {ms} is out of range (0-{}). Using default ({}).",
                constants::MAX_POLL_INTERVAL_MS,
                constants::DEFAULT_INITIAL_DELAY_MS,
            ));
        }
    }

    // -- Tail: poll_interval_ms --
    if let Some(ms) = raw.tail.poll_interval_ms {
        if (constants::MIN_POLL_INTERVAL_MS..=constants::MAX_POLL_INTERVAL_MS).contains(&ms) {
            config.poll_interval_ms = ms;
        } else {
            warnings.push(format!(
                "[tail] poll_interval_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_POLL_INTERVAL_MS,
                constants::MAX_POLL_INTERVAL_MS,
                constants::DEFAULT_POLL_INTERVAL_MS,
            ));
        }
    }

    // -- Tail: reflow_delay_ms --
    if let Some(ms) = raw.tail.reflow_delay_ms {
        if ms <= constants::MAX_REFLOW_DELAY_MS {
            config.reflow_delay_ms = ms;
        } else {
            warnings.push(format!(
                "[tail] reflow_delay_ms = {ms} is out of range (0-{}). Using default ({}).",
                constants::MAX_REFLOW_DELAY_MS,
                constants::DEFAULT_REFLOW_DELAY_MS,
            ));
        }
    }

    // -- Tail: scroll_tolerance_px --
    if let Some(px) = raw.tail.scroll_tolerance_px {
        if (0.0..=constants::MAX_SCROLL_TOLERANCE_PX).contains(&px) {
            config.scroll_tolerance_px = px;
        } else {
            warnings.push(format!(
                "[tail] scroll_tolerance_px = {px} is out of range (0-{}). Using default ({}).",
                constants::MAX_SCROLL_TOLERANCE_PX,
                constants::DEFAULT_SCROLL_TOLERANCE_PX,
            ));
        }
    }

    // -- Tail: max_retry_delay_ms --
    if let Some(ms) = raw.tail.max_retry_delay_ms {
        if (constants::MIN_POLL_INTERVAL_MS..=constants::ABSOLUTE_MAX_RETRY_DELAY_MS).contains(&ms)
        {
            config.max_retry_delay_ms = ms;
        } else {
            warnings.push(format!(
                "[tail] max_retry_delay_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_POLL_INTERVAL_MS,
                constants::ABSOLUTE_MAX_RETRY_DELAY_MS,
                constants::DEFAULT_MAX_RETRY_DELAY_MS,
            ));
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
                ));
            }
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            warnings.push(format!(
                "[ui] font_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FONT_SIZE,
                constants::MAX_FONT_SIZE,
                constants::DEFAULT_FONT_SIZE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (_dir, path) = write_config(
            r#"
            [server]
            base_url = "http://hive.lan:9000"
            request_timeout_ms = 5000

            [tail]
            initial_position = -500
            poll_interval_ms = 1000
            reflow_delay_ms = 25
            scroll_tolerance_px = 4.0
            max_retry_delay_ms = 30000

            [ui]
            theme = "light"

            [logging]
            level = "debug"
            file = "/tmp/hivetail.log"
            "#,
        );
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.base_url, "http://hive.lan:9000");
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.initial_position, -500);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.reflow_delay_ms, 25);
        assert_eq!(config.scroll_tolerance_px, 4.0);
        assert_eq!(config.max_retry_delay_ms, 30000);
        assert!(!config.dark_mode);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/hivetail.log"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (_dir, path) = write_config(
            r#"
            [server]
            base_url = "hive.lan"

            [tail]
            poll_interval_ms = 5
            scroll_tolerance_px = -1.0
            "#,
        );
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval_ms, constants::DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(
            config.scroll_tolerance_px,
            constants::DEFAULT_SCROLL_TOLERANCE_PX
        );
    }

    #[test]
    fn test_unparseable_file_gives_defaults_with_warning() {
        let (_dir, path) = write_config("[tail\npoll_interval_ms = ");
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_dir, path) = write_config("[future]\nfeature = true\n[tail]\nsomething = 1\n");
        let (_, warnings) = load_config(&path);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_base_url_validation() {
        assert!(is_valid_base_url("http://127.0.0.1:9476"));
        assert!(is_valid_base_url("https://hive.example"));
        assert!(!is_valid_base_url("ftp://hive"));
        assert!(!is_valid_base_url("http://"));
        assert!(!is_valid_base_url("127.0.0.1:9476"));
    }
}
