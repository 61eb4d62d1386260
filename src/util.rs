//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

// ============================================================================
// Clock
// ============================================================================

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

// ============================================================================
// FPS Counter
// ============================================================================

/// Frame rate from a single interval; 0 when the interval is too short to measure
#[inline]
pub fn frame_rate(interval_ms: u64) -> f32 {
    if interval_ms > 0 {
        1000.0 / interval_ms as f32
    } else {
        0.0
    }
}

/// FPS counter with rolling average
pub struct FpsCounter {
    frame_times: VecDeque<u64>,
    last_frame: Option<u64>,
    sample_count: usize,
}

impl FpsCounter {
    /// Create a new FPS counter with specified sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: None,
            sample_count: sample_count.max(1),
        }
    }

    /// Record a frame finishing at `now_ms`.
    /// Returns (interval_ms, current_fps, average_fps); the first call only
    /// sets the reference point.
    pub fn tick(&mut self, now_ms: u64) -> (u64, f32, f32) {
        let Some(last) = self.last_frame.replace(now_ms) else {
            return (0, 0.0, 0.0);
        };
        let dt = now_ms.saturating_sub(last);

        // Add to rolling window
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        (dt, frame_rate(dt), self.avg_fps())
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.frame_times.iter().sum::<u64>() as f32 / self.frame_times.len().max(1) as f32
    }

    pub fn avg_fps(&self) -> f32 {
        let avg = self.avg_frame_time_ms();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        let (Some(&min_dt), Some(&max_dt)) =
            (self.frame_times.iter().min(), self.frame_times.iter().max())
        else {
            return (0.0, 0.0);
        };
        (frame_rate(max_dt), frame_rate(min_dt))
    }

    /// Number of intervals in the window
    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }
}
