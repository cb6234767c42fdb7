// HiveTail - core/scroll.rs
//
// Scroll geometry and the "follow the tail" heuristic.
//
// Measurements use DOM naming: `scroll_top` is the offset of the viewport
// from the top of the content, `scroll_height` the full content height and
// `offset_height` the viewport height. The bottom-most scroll offset is
// therefore `scroll_height - offset_height`.

use crate::util::constants;
use std::time::Duration;

/// A snapshot of a surface's scroll state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub offset_height: f32,
}

impl ScrollMetrics {
    /// Scroll offset at which the last line sits at the bottom of the viewport.
    pub fn bottom_offset(&self) -> f32 {
        self.scroll_height - self.offset_height
    }

    /// True when `scroll_top` is within `tolerance` px of the bottom offset
    /// (inclusive on both sides).
    pub fn is_at_bottom(&self, tolerance: f32) -> bool {
        (self.scroll_top - self.bottom_offset()).abs() <= tolerance
    }
}

/// Tunables for the auto-scroll heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPolicy {
    /// How close to the bottom (px) the view must be to keep following.
    pub tolerance: f32,
    /// Wait between appending and snapping, so the surface has re-measured.
    pub reflow_delay: Duration,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            tolerance: constants::DEFAULT_SCROLL_TOLERANCE_PX,
            reflow_delay: Duration::from_millis(constants::DEFAULT_REFLOW_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: f32, scroll_height: f32, offset_height: f32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            offset_height,
        }
    }

    #[test]
    fn test_exactly_at_bottom() {
        assert!(metrics(400.0, 1000.0, 600.0).is_at_bottom(1.0));
    }

    #[test]
    fn test_within_one_pixel_either_side() {
        assert!(metrics(399.0, 1000.0, 600.0).is_at_bottom(1.0));
        assert!(metrics(401.0, 1000.0, 600.0).is_at_bottom(1.0));
    }

    #[test]
    fn test_more_than_tolerance_away_is_not_bottom() {
        assert!(!metrics(398.5, 1000.0, 600.0).is_at_bottom(1.0));
        assert!(!metrics(0.0, 1000.0, 600.0).is_at_bottom(1.0));
    }

    #[test]
    fn test_wider_tolerance() {
        assert!(metrics(380.0, 1000.0, 600.0).is_at_bottom(20.0));
    }

    #[test]
    fn test_content_shorter_than_viewport_counts_as_bottom() {
        // Surfaces report scroll_height >= offset_height, so a short log has
        // a bottom offset of zero.
        assert!(metrics(0.0, 600.0, 600.0).is_at_bottom(1.0));
    }

    #[test]
    fn test_default_policy_values() {
        let policy = ScrollPolicy::default();
        assert_eq!(policy.tolerance, 1.0);
        assert_eq!(policy.reflow_delay, Duration::from_millis(10));
    }
}
