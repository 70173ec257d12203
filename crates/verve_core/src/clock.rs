//! Frame clock bookkeeping
//!
//! Timestamps arrive from the embedder's display link, one per frame, in
//! milliseconds on a monotonic clock. `FrameClock` turns that raw stream into
//! the [`FrameInfo`] handed to every frame callback.

/// Milliseconds on the embedder's monotonic frame clock.
pub type Millis = f64;

/// Per-frame timing handed to frame callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    /// Timestamp of the current frame.
    pub timestamp: Millis,
    /// Elapsed time since the first frame this clock observed.
    pub since_first_frame: Millis,
    /// Elapsed time since the previous frame, `None` on the first frame.
    pub since_previous_frame: Option<Millis>,
}

/// Tracks first/previous frame timestamps across ticks.
#[derive(Debug, Default)]
pub struct FrameClock {
    first: Option<Millis>,
    previous: Option<Millis>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `timestamp` and produce the frame info for this tick.
    ///
    /// The clock source promises monotonic timestamps; a regression is a
    /// broken embedder and only checked in debug builds.
    pub fn frame(&mut self, timestamp: Millis) -> FrameInfo {
        if let Some(previous) = self.previous {
            debug_assert!(timestamp >= previous, "frame clock went backwards");
        }
        let first = *self.first.get_or_insert(timestamp);
        let info = FrameInfo {
            timestamp,
            since_first_frame: timestamp - first,
            since_previous_frame: self.previous.map(|p| timestamp - p),
        };
        self.previous = Some(timestamp);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_no_previous() {
        let mut clock = FrameClock::new();
        let info = clock.frame(1000.0);
        assert_eq!(info.timestamp, 1000.0);
        assert_eq!(info.since_first_frame, 0.0);
        assert_eq!(info.since_previous_frame, None);
    }

    #[test]
    fn test_deltas_accumulate() {
        let mut clock = FrameClock::new();
        clock.frame(1000.0);
        clock.frame(1016.0);
        let info = clock.frame(1032.0);
        assert_eq!(info.since_first_frame, 32.0);
        assert_eq!(info.since_previous_frame, Some(16.0));
    }
}
