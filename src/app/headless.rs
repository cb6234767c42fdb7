// HiveTail - app/headless.rs
//
// Follow a node without a window: new lines go to stdout, diagnostics to
// stderr via tracing. Runs until the process is terminated or stdout closes.

use crate::app::client::LogSource;
use crate::app::tail::{start_log, TailConfig};
use crate::core::model::{NodeId, TailProgress};
use crate::core::scroll::ScrollMetrics;
use crate::core::surface::DisplaySurface;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A surface that streams each line to a writer.
///
/// A stream has no viewport, so it always reports being at the bottom and
/// ignores scroll requests.
pub struct StreamSurface<W: Write + Send> {
    out: W,
    lines_written: u64,
    /// Set once a write fails so the error is logged once, not per line.
    broken: bool,
}

impl<W: Write + Send> StreamSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines_written: 0,
            broken: false,
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplaySurface for StreamSurface<W> {
    fn append_line(&mut self, line: &str) {
        if self.broken {
            return;
        }
        match writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            Ok(()) => self.lines_written += 1,
            Err(e) => {
                tracing::error!(error = %e, "Cannot write log line to output; further lines dropped");
                self.broken = true;
            }
        }
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 0.0,
            offset_height: 0.0,
        }
    }

    fn set_scroll_top(&mut self, _scroll_top: f32) {}

    fn needs_reflow(&self) -> bool {
        false
    }

    fn is_closed(&self) -> bool {
        self.broken
    }
}

/// Follow `node` and print its log to stdout. Blocks until the poller exits,
/// which happens once stdout can no longer be written (e.g. a closed pipe).
pub fn run(node: NodeId, source: Arc<dyn LogSource>, config: TailConfig) {
    let surface = Arc::new(Mutex::new(StreamSurface::new(std::io::stdout())));
    let handle = start_log(node, surface, source, config);

    loop {
        match handle.wait_progress(Duration::from_secs(1)) {
            Some(TailProgress::Started { node }) => {
                tracing::info!(node = %node, "Following node log");
            }
            Some(TailProgress::Chunk {
                appended, position, ..
            }) => {
                tracing::trace!(appended, position, "Chunk received");
            }
            // Already logged by the poller at warn level.
            Some(TailProgress::PollFailed { .. }) => {}
            Some(TailProgress::Stopped) => break,
            None if !handle.is_active() => break,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tail::poll_cycle;
    use crate::core::model::LogChunk;
    use crate::core::scroll::ScrollPolicy;
    use crate::util::error::FetchError;
    use std::sync::atomic::AtomicI64;
    use std::time::Instant;

    #[test]
    fn test_stream_surface_writes_one_line_each() {
        let mut surface = StreamSurface::new(Vec::new());
        surface.append_line("a");
        surface.append_line("b");
        assert_eq!(surface.lines_written(), 2);
        assert_eq!(surface.into_inner(), b"a\nb\n".to_vec());
    }

    #[test]
    fn test_stream_surface_always_at_bottom() {
        let surface = StreamSurface::new(Vec::new());
        assert!(surface.metrics().is_at_bottom(0.0));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_surface_stops_after_write_error() {
        let mut surface = StreamSurface::new(FailingWriter);
        surface.append_line("a");
        surface.append_line("b");
        assert_eq!(surface.lines_written(), 0);
        assert!(surface.is_closed());
    }

    #[test]
    fn test_line_breaks_from_server_are_not_doubled() {
        let source = Lines(vec!["first\n".to_string(), "second\r\n".to_string()]);
        let surface = Mutex::new(StreamSurface::new(Vec::new()));
        let cursor = AtomicI64::new(0);

        poll_cycle(&node(), &cursor, &surface, &source, &ScrollPolicy::default()).unwrap();

        let out = surface.into_inner().unwrap().into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_stream_skips_reflow_wait() {
        let source = Lines(vec!["x".to_string()]);
        let surface = Mutex::new(StreamSurface::new(Vec::new()));
        let cursor = AtomicI64::new(0);
        let scroll = ScrollPolicy {
            tolerance: 1.0,
            reflow_delay: Duration::from_secs(5),
        };

        let started = Instant::now();
        let report = poll_cycle(&node(), &cursor, &surface, &source, &scroll).unwrap();

        assert!(report.snapped);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_poller_stops_when_output_closes() {
        let source: Arc<dyn LogSource> = Arc::new(Lines(vec!["x".to_string()]));
        let surface = Arc::new(Mutex::new(StreamSurface::new(FailingWriter)));
        let config = TailConfig {
            initial_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(10),
            cancel_check_interval: Duration::from_millis(5),
            ..TailConfig::default()
        };

        let handle = start_log(node(), surface, source, config);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut stopped = false;
        while Instant::now() < deadline && !stopped {
            stopped = matches!(
                handle.wait_progress(Duration::from_millis(100)),
                Some(TailProgress::Stopped)
            );
        }
        assert!(stopped, "poller kept running after stdout closed");
        handle.stop_and_wait();
    }

    /// Answers every request with the same lines and advances by their count.
    struct Lines(Vec<String>);

    impl LogSource for Lines {
        fn fetch_log(&self, _node: &NodeId, position: i64) -> Result<LogChunk, FetchError> {
            Ok(LogChunk {
                content: self.0.clone(),
                position: position + self.0.len() as i64,
            })
        }
    }

    fn node() -> NodeId {
        NodeId::parse("worker").unwrap()
    }
}
