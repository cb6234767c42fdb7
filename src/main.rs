// HiveTail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. Headless follow, or eframe GUI launch

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use hivetail::app;
pub use hivetail::core;
pub use hivetail::platform;
pub use hivetail::ui;
pub use hivetail::util;

use crate::app::client::{HiveClient, LogSource};
use crate::app::tail::TailConfig;
use crate::core::model::NodeId;
use crate::platform::config::AppConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// HiveTail - follow the log of a Hivemind node.
///
/// Opens a viewer window by default. With --headless the log is streamed to
/// stdout instead.
#[derive(Parser, Debug)]
#[command(name = "HiveTail", version, about)]
struct Cli {
    /// Node whose log to follow. Required with --headless.
    node: Option<String>,

    /// Controller root URL (overrides [server] base_url).
    #[arg(short = 'u', long = "base-url")]
    base_url: Option<String>,

    /// Cursor for the first request; negative means "last N lines".
    #[arg(short = 'p', long = "position", allow_negative_numbers = true)]
    position: Option<i64>,

    /// Poll interval in milliseconds (overrides [tail] poll_interval_ms).
    #[arg(short = 'i', long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Print the log to stdout instead of opening a window.
    #[arg(long = "headless")]
    headless: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Apply command-line overrides on top of the validated config.
///
/// Unlike config.toml problems, a bad CLI value is an error: the user typed
/// it just now and would not notice a silent fallback.
fn apply_cli_overrides(cli: &Cli, config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(ref url) = cli.base_url {
        if !platform::config::is_valid_base_url(url) {
            return Err(ConfigError::ValueOutOfRange {
                field: "--base-url".to_string(),
                value: url.clone(),
                expected: "an http:// or https:// URL".to_string(),
            });
        }
        config.base_url = url.clone();
    }
    if let Some(position) = cli.position {
        config.initial_position = position;
    }
    if let Some(ms) = cli.interval_ms {
        if !(constants::MIN_POLL_INTERVAL_MS..=constants::MAX_POLL_INTERVAL_MS).contains(&ms) {
            return Err(ConfigError::ValueOutOfRange {
                field: "--interval-ms".to_string(),
                value: ms.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_POLL_INTERVAL_MS,
                    constants::MAX_POLL_INTERVAL_MS
                ),
            });
        }
        config.poll_interval_ms = ms;
    }
    Ok(())
}

/// Apply CLI overrides and parse the optional node argument.
fn prepare_startup(cli: &Cli, config: &mut AppConfig) -> util::error::Result<Option<NodeId>> {
    apply_cli_overrides(cli, config)?;
    let node = cli.node.as_deref().map(NodeId::parse).transpose()?;
    Ok(node)
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (mut config, config_warnings) = platform::config::load_config(&config_path);

    // Initialise logging subsystem
    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "HiveTail starting"
    );

    // Config is read before tracing is up, so repeat its warnings here.
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let node = match prepare_startup(&cli, &mut config) {
        Ok(node) => node,
        Err(e) => {
            tracing::error!(error = %e, "Invalid command-line arguments");
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let source: Arc<dyn LogSource> = Arc::new(HiveClient::new(
        &config.base_url,
        Duration::from_millis(config.request_timeout_ms),
    ));

    if cli.headless {
        let Some(node) = node else {
            eprintln!("Error: a node name is required with --headless");
            std::process::exit(2);
        };
        tracing::info!(node = %node, base_url = %config.base_url, "Running headless");
        app::headless::run(node, source, TailConfig::from_app_config(&config));
        return;
    }

    let dark_mode = config.dark_mode;
    let font_size = config.font_size;

    let mut state = app::state::AppState::new(config, cli.debug);
    for warning in config_warnings {
        state.push_warning(warning);
    }
    // A node given on the command line is followed immediately.
    if let Some(node) = node {
        state.node_input = node.to_string();
        state.request_start_tail = true;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("{} v{}", constants::APP_NAME, constants::APP_VERSION))
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([600.0, 360.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, dark_mode, font_size);
            Ok(Box::new(gui::HiveTailApp::new(state, source)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch HiveTail GUI: {e}");
        std::process::exit(1);
    }
}
