//! Animation parameters mutated by input and read by the renderer

use crate::effects::ColorScheme;

/// Fastest speed multiplier; the next step wraps to 0 (paused)
pub const MAX_SPEED: u8 = 5;

/// Clock ticks are milliseconds
const TICKS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    elapsed: f32,
    speed: u8,
    scheme: ColorScheme,
}

impl AnimationState {
    /// Start with a given speed (wrapped into 0..=5) and scheme
    pub fn with_settings(speed: u8, scheme: ColorScheme) -> Self {
        Self {
            elapsed: 0.0,
            speed: speed % (MAX_SPEED + 1),
            scheme,
        }
    }

    /// Elapsed animation time in seconds
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn speed(&self) -> u8 {
        self.speed
    }

    #[inline]
    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.speed == 0
    }

    /// Derive elapsed time from milliseconds since start.
    ///
    /// Time is proportional to the raw tick count, so changing speed rescales
    /// the whole timeline. At speed 0 the last value is kept, which freezes
    /// the pattern instead of snapping it back to t = 0.
    pub fn advance_time(&mut self, raw_ticks: u64) -> f32 {
        if self.speed != 0 {
            self.elapsed = (raw_ticks as f64 * self.speed as f64 / TICKS_PER_SECOND) as f32;
        }
        self.elapsed
    }

    /// 0 -> 1 -> ... -> 5 -> 0
    pub fn cycle_speed(&mut self) -> u8 {
        self.speed = (self.speed + 1) % (MAX_SPEED + 1);
        self.speed
    }

    pub fn cycle_scheme(&mut self) -> ColorScheme {
        self.scheme = self.scheme.next();
        self.scheme
    }
}

/// t = 0, speed 1, first color scheme
impl Default for AnimationState {
    fn default() -> Self {
        Self::with_settings(1, ColorScheme::default())
    }
}
