// HiveTail - app/tail.rs
//
// Live tail of one node's log over HTTP.
//
// Architecture:
//   - `start_log` spawns a background thread running `run_poller` and returns
//     a `PollHandle` that lives with the caller (UI thread or headless loop).
//   - Each iteration of the loop is one `poll_cycle`: measure the surface,
//     fetch from the cursor, append, advance the cursor, maybe snap to bottom.
//   - Cycles run back to back on one thread, so only one request is ever in
//     flight and cursor writes happen in request order. The next cycle is
//     scheduled from the end of the previous one.
//   - An `Arc<AtomicBool>` cancel flag stops the loop; dropping the handle
//     sets it too. Progress is reported as `TailProgress` over an mpsc channel.
//
// Failure policy:
//   - A failed fetch is logged and reported; the cursor and surface are left
//     untouched so the next attempt asks for the same lines again.
//   - Consecutive failures back off via `RetryPolicy`; one success resets it.
//   - Failures never end the loop. Only cancellation does.
//   - The surface lock is never held across the network call.

use crate::app::client::LogSource;
use crate::core::backoff::RetryPolicy;
use crate::core::model::{NodeId, TailProgress};
use crate::core::scroll::ScrollPolicy;
use crate::core::surface::{lock_surface, DisplaySurface, SharedSurface};
use crate::platform::config::AppConfig;
use crate::util::constants::{
    DEBUG_MAX_LINE_PREVIEW, DEFAULT_INITIAL_DELAY_MS, DEFAULT_INITIAL_POSITION,
    DEFAULT_POLL_INTERVAL_MS, TAIL_CANCEL_CHECK_INTERVAL_MS,
};
use crate::util::error::FetchError;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Timing and heuristics for one poller.
#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    /// Cursor sent on the first request. Negative means "last N lines".
    pub initial_position: i64,
    /// Delay before the first request.
    pub initial_delay: Duration,
    /// Delay between the end of a successful cycle and the next request.
    pub poll_interval: Duration,
    pub scroll: ScrollPolicy,
    pub retry: RetryPolicy,
    /// Granularity of cancellation checks while sleeping.
    pub cancel_check_interval: Duration,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            initial_position: DEFAULT_INITIAL_POSITION,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            scroll: ScrollPolicy::default(),
            retry: RetryPolicy::default(),
            cancel_check_interval: Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS),
        }
    }
}

impl TailConfig {
    /// Build from the validated `[tail]` section of config.toml.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            initial_position: config.initial_position,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            scroll: ScrollPolicy {
                tolerance: config.scroll_tolerance_px,
                reflow_delay: Duration::from_millis(config.reflow_delay_ms),
            },
            retry: RetryPolicy {
                max_delay: Duration::from_millis(config.max_retry_delay_ms),
            },
            ..Self::default()
        }
    }
}

// =============================================================================
// PollHandle
// =============================================================================

/// Owner-side handle to a running poller.
///
/// Dropping the handle requests the poller to stop; it does not wait for the
/// thread, which may be blocked in a request for up to the HTTP timeout.
pub struct PollHandle {
    node: NodeId,
    progress_rx: mpsc::Receiver<TailProgress>,
    cancel_flag: Arc<AtomicBool>,
    cursor: Arc<AtomicI64>,
    worker: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// The cursor the next request will use.
    pub fn cursor(&self) -> i64 {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Request the background thread to stop.
    ///
    /// The thread exits within `cancel_check_interval` unless it is inside a
    /// request, and sends `TailProgress::Stopped` before terminating.
    pub fn stop(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Stop and block until the background thread has exited.
    pub fn stop_and_wait(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(node = %self.node, "Poll thread panicked");
            }
        }
    }

    /// Returns `true` while the background thread is running and has not
    /// been asked to stop.
    pub fn is_active(&self) -> bool {
        !self.cancel_flag.load(Ordering::SeqCst)
            && self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Drain up to `max` pending progress messages without blocking.
    pub fn poll_progress(&self, max: usize) -> Vec<TailProgress> {
        self.progress_rx.try_iter().take(max).collect()
    }

    /// Block for the next progress message, up to `timeout`.
    ///
    /// Returns `None` on timeout or once the poller has exited and every
    /// message has been received.
    pub fn wait_progress(&self, timeout: Duration) -> Option<TailProgress> {
        self.progress_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }
}

/// Start following `node`, appending new lines to `surface`.
///
/// The first request is made after `config.initial_delay` with the cursor set
/// to `config.initial_position`. The poller runs until the handle is stopped
/// or dropped.
pub fn start_log<S>(
    node: NodeId,
    surface: SharedSurface<S>,
    source: Arc<dyn LogSource>,
    config: TailConfig,
) -> PollHandle
where
    S: DisplaySurface + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let cursor = Arc::new(AtomicI64::new(config.initial_position));

    let worker = {
        let node = node.clone();
        let cancel = Arc::clone(&cancel);
        let cursor = Arc::clone(&cursor);
        std::thread::spawn(move || {
            run_poller(&node, &*surface, source.as_ref(), &config, &cursor, &tx, &cancel);
        })
    };

    tracing::info!(node = %node, "Live tail started");

    PollHandle {
        node,
        progress_rx: rx,
        cancel_flag: cancel,
        cursor,
        worker: Some(worker),
    }
}

// =============================================================================
// Poll cycle
// =============================================================================

/// Result of one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Cursor the request was made with.
    pub requested: i64,
    /// Cursor returned by the server, now stored.
    pub position: i64,
    /// Number of lines appended to the surface.
    pub appended: usize,
    /// Whether the view was at the bottom before the fetch and was snapped.
    pub snapped: bool,
}

/// Run one request/render/advance cycle.
///
/// The auto-scroll decision uses the scroll position measured before the
/// request, so a user who has scrolled up is left where they are even if the
/// new lines would change the layout. On error nothing is modified.
pub fn poll_cycle<S>(
    node: &NodeId,
    cursor: &AtomicI64,
    surface: &Mutex<S>,
    source: &dyn LogSource,
    scroll: &ScrollPolicy,
) -> Result<CycleReport, FetchError>
where
    S: DisplaySurface + ?Sized,
{
    let before = lock_surface(surface).metrics();
    let auto_scroll = before.is_at_bottom(scroll.tolerance);
    if !auto_scroll {
        tracing::trace!(
            node = %node,
            scroll_top = before.scroll_top,
            bottom = before.bottom_offset(),
            "Viewport not at bottom; leaving scroll position alone"
        );
    }

    let requested = cursor.load(Ordering::SeqCst);
    let chunk = source.fetch_log(node, requested)?;

    {
        let mut surface = lock_surface(surface);
        for line in &chunk.content {
            surface.append_line(strip_line_ending(line));
        }
    }
    cursor.store(chunk.position, Ordering::SeqCst);

    if let Some(last) = chunk.content.last() {
        tracing::debug!(
            node = %node,
            appended = chunk.content.len(),
            position = chunk.position,
            last = %preview(last),
            "Tail: new lines"
        );
    }

    if auto_scroll {
        if !scroll.reflow_delay.is_zero() && lock_surface(surface).needs_reflow() {
            std::thread::sleep(scroll.reflow_delay);
        }
        let mut surface = lock_surface(surface);
        let bottom = surface.metrics().bottom_offset();
        surface.set_scroll_top(bottom);
    }

    Ok(CycleReport {
        requested,
        position: chunk.position,
        appended: chunk.content.len(),
        snapped: auto_scroll,
    })
}

// =============================================================================
// Background poll loop
// =============================================================================

fn run_poller<S>(
    node: &NodeId,
    surface: &Mutex<S>,
    source: &dyn LogSource,
    config: &TailConfig,
    cursor: &AtomicI64,
    tx: &mpsc::Sender<TailProgress>,
    cancel: &AtomicBool,
) where
    S: DisplaySurface,
{
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // Handle dropped without stopping; nobody is listening.
                return;
            }
        };
    }

    send!(TailProgress::Started { node: node.clone() });

    if !sleep_unless_cancelled(config.initial_delay, config.cancel_check_interval, cancel) {
        send!(TailProgress::Stopped);
        return;
    }

    let mut consecutive_failures: u32 = 0;

    loop {
        let delay = match poll_cycle(node, cursor, surface, source, &config.scroll) {
            Ok(report) => {
                if consecutive_failures > 0 {
                    tracing::info!(
                        node = %node,
                        failures = consecutive_failures,
                        "Tail: recovered after failed polls"
                    );
                }
                consecutive_failures = 0;
                send!(TailProgress::Chunk {
                    requested: report.requested,
                    position: report.position,
                    appended: report.appended,
                    snapped: report.snapped,
                });
                if lock_surface(surface).is_closed() {
                    tracing::warn!(node = %node, "Tail: output closed; stopping");
                    send!(TailProgress::Stopped);
                    return;
                }
                config.poll_interval
            }
            Err(e) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                let retry_in = config
                    .retry
                    .delay_after(consecutive_failures, config.poll_interval);
                let requested = cursor.load(Ordering::SeqCst);
                tracing::warn!(
                    node = %node,
                    position = requested,
                    failures = consecutive_failures,
                    retry_in_ms = retry_in.as_millis() as u64,
                    error = %e,
                    "Tail: poll failed"
                );
                send!(TailProgress::PollFailed {
                    requested,
                    error: e.to_string(),
                    consecutive_failures,
                    retry_in,
                });
                retry_in
            }
        };

        if !sleep_unless_cancelled(delay, config.cancel_check_interval, cancel) {
            tracing::info!(node = %node, "Live tail stopped");
            send!(TailProgress::Stopped);
            return;
        }
    }
}

/// Sleep for `total` in slices of `slice`, checking `cancel` between slices.
///
/// Returns `false` if cancellation was observed.
fn sleep_unless_cancelled(total: Duration, slice: Duration, cancel: &AtomicBool) -> bool {
    let slice = slice.max(Duration::from_millis(1));
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    !cancel.load(Ordering::SeqCst)
}

/// Drop one trailing line break. The controller returns file lines with
/// their `\n` still attached.
fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Truncate a log line for debug output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
