use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use rayon::prelude::*;

use super::ColorScheme;
use crate::display::FrameBuffer;

/// Reference resolution the pattern is normalized against.
/// Larger buffers show more of the same field rather than a stretched one.
const REF_WIDTH: f32 = 320.0;
const REF_HEIGHT: f32 = 240.0;

/// Zoom applied to the centered coordinates
const SPAN: f32 = 1.5;

/// 8-bit intensities derived from the summed interference value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    /// 255 * (0.5 + 0.5 * cos(gv * pi/2))
    pub cos: u8,
    /// 255 * (0.5 + 0.5 * sin(gv * pi/3))
    pub sin: u8,
    /// 255 * (0.5 + 0.5 * sin(gv * 2pi))
    pub harmonic: u8,
}

/// The plasma kernel, fixed at one point in time.
///
/// Holds the trig terms that only depend on time so a frame computes them
/// once. `color` is pure in (x, y, scheme) for a given time.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    t: f32,
    orbit_u: f32,
    orbit_v: f32,
    skew_u: f32,
    skew_v: f32,
}

impl Kernel {
    #[inline]
    pub fn new(time: f32) -> Self {
        Self {
            t: time,
            orbit_u: 0.5 * (time / 5.0).sin(),
            orbit_v: 0.5 * (time / 9.0).cos(),
            skew_u: (time / 3.0).sin(),
            skew_v: (time / 7.0).cos(),
        }
    }

    /// Summed interference value at a pixel, within [-3, 3]
    #[inline]
    pub fn field(&self, x: u32, y: u32) -> f32 {
        let u = (x as f32 / REF_WIDTH - 0.5) * SPAN;
        let v = (y as f32 / REF_HEIGHT - 0.5) * SPAN;

        let cu = u + self.orbit_u;
        let cv = v + self.orbit_v;

        let v1 = (u * 10.0 + self.t).sin();
        let v2 = (25.0 * (u * self.skew_u + v * self.skew_v) + self.t).sin();
        // Radicand is >= 1, sqrt never sees a negative
        let v3 = ((200.0 * (cu * cu + cv * cv) + 1.0).sqrt() + self.t).sin();

        v1 + v2 + v3
    }

    /// Intensity channels at a pixel
    #[inline]
    pub fn channels(&self, x: u32, y: u32) -> Channels {
        channels_from_field(self.field(x, y))
    }

    /// Packed 0x00RRGGBB color for one pixel
    #[inline]
    pub fn color(&self, x: u32, y: u32, scheme: ColorScheme) -> u32 {
        scheme.pack(self.channels(x, y))
    }
}

/// Remap a trig value in [-1, 1] to a byte, truncating toward zero
#[inline]
fn to_byte(s: f32) -> u8 {
    (255.0 * (0.5 + 0.5 * s)) as u8
}

#[inline]
fn channels_from_field(gv: f32) -> Channels {
    Channels {
        cos: to_byte((gv * FRAC_PI_2).cos()),
        sin: to_byte((gv * FRAC_PI_3).sin()),
        harmonic: to_byte((gv * TAU).sin()),
    }
}

/// Fills a frame buffer with the plasma field
#[derive(Debug, Clone, Copy)]
pub struct Plasma {
    parallel: bool,
}

impl Plasma {
    pub fn with_parallel(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn render(&self, buffer: &mut FrameBuffer, time: f32, scheme: ColorScheme) {
        if self.parallel {
            Self::render_parallel(buffer, time, scheme);
        } else {
            Self::render_sequential(buffer, time, scheme);
        }
    }

    /// Rows are split across the rayon pool. Each task owns a disjoint row
    /// slice and `for_each` joins before returning.
    pub fn render_parallel(buffer: &mut FrameBuffer, time: f32, scheme: ColorScheme) {
        let kernel = Kernel::new(time);
        let width = buffer.width() as usize;
        if width == 0 {
            return;
        }
        buffer
            .pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(row, y as u32, &kernel, scheme));
    }

    pub fn render_sequential(buffer: &mut FrameBuffer, time: f32, scheme: ColorScheme) {
        let kernel = Kernel::new(time);
        let width = buffer.width() as usize;
        if width == 0 {
            return;
        }
        for (y, row) in buffer.pixels_mut().chunks_mut(width).enumerate() {
            fill_row(row, y as u32, &kernel, scheme);
        }
    }
}

impl Default for Plasma {
    fn default() -> Self {
        Self::with_parallel(true)
    }
}

#[inline]
fn fill_row(row: &mut [u32], y: u32, kernel: &Kernel, scheme: ColorScheme) {
    for (x, pixel) in row.iter_mut().enumerate() {
        *pixel = kernel.color(x as u32, y, scheme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center_golden_vector() {
        // u = v = 0 at the center, so only the radial term survives at t = 0
        let gv = Kernel::new(0.0).field(160, 120);
        assert!((gv - 51.0f32.sqrt().sin()).abs() < 1e-5);

        let ch = Kernel::new(0.0).channels(160, 120);
        assert_eq!(
            ch,
            Channels {
                cos: 175,
                sin: 218,
                harmonic: 0,
            }
        );

        assert_eq!(Kernel::new(0.0).color(160, 120, ColorScheme::Sunset), 0x00FF_AFDA);
        assert_eq!(Kernel::new(0.0).color(160, 120, ColorScheme::Ember), 0x00AF_DA00);
        assert_eq!(Kernel::new(0.0).color(160, 120, ColorScheme::Lagoon), 0x0000_DAAF);
        assert_eq!(Kernel::new(0.0).color(160, 120, ColorScheme::Pastel), 0x00AF_DAFF);
        assert_eq!(Kernel::new(0.0).color(160, 120, ColorScheme::Grayscale), 0x0000_0000);
    }

    #[test]
    fn test_corner_golden_vector() {
        let ch = Kernel::new(0.0).channels(0, 0);
        assert_eq!(
            ch,
            Channels {
                cos: 5,
                sin: 6,
                harmonic: 245,
            }
        );
        assert_eq!(Kernel::new(0.0).color(0, 0, ColorScheme::Grayscale), 0x00F5_F5F5);
    }

    #[test]
    fn test_channels_truncate_at_extremes() {
        // gv = 0: cos(0) = 1 -> 255, sin(0) = 0 -> 127.5 truncated to 127
        let ch = channels_from_field(0.0);
        assert_eq!(ch.cos, 255);
        assert_eq!(ch.sin, 127);
        assert_eq!(ch.harmonic, 127);

        // gv = +-3 are the nominal bounds of the sum
        for gv in [-3.0f32, 3.0, -2.999, 2.999] {
            let ch = channels_from_field(gv);
            // sin(3 * pi/3) and cos(3 * pi/2) are ~0, so both sit mid-scale
            assert!((126..=128).contains(&ch.cos), "cos at {}: {}", gv, ch.cos);
            assert!((126..=128).contains(&ch.sin), "sin at {}: {}", gv, ch.sin);
        }
    }

    #[test]
    fn test_kernel_reuse_matches_fresh_kernel() {
        // A kernel built once per frame gives the same colors as one built per pixel
        let kernel = Kernel::new(7.25);
        for (x, y) in [(0, 0), (160, 120), (319, 239), (511, 17)] {
            for s in 0..ColorScheme::COUNT {
                let scheme = ColorScheme::from_index(s);
                assert_eq!(kernel.color(x, y, scheme), Kernel::new(7.25).color(x, y, scheme));
            }
        }
    }

    #[test]
    fn test_large_and_negative_time() {
        for t in [-1.0e4f32, -123.456, 0.0, 9876.5, 1.0e4] {
            let gv = Kernel::new(t).field(17, 203);
            assert!(gv.is_finite());
            assert!(gv.abs() <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut a = FrameBuffer::with_size(97, 61).unwrap();
        let mut b = FrameBuffer::with_size(97, 61).unwrap();
        for (i, t) in [0.0f32, 1.25, 42.0].into_iter().enumerate() {
            let scheme = ColorScheme::from_index(i as u8 * 2);
            Plasma::render_parallel(&mut a, t, scheme);
            Plasma::render_sequential(&mut b, t, scheme);
            assert_eq!(a.pixels(), b.pixels());
        }
    }

    #[test]
    fn test_render_matches_kernel() {
        let mut buffer = FrameBuffer::with_size(40, 30).unwrap();
        Plasma::default().render(&mut buffer, 3.5, ColorScheme::Pastel);
        let kernel = Kernel::new(3.5);
        for y in 0..30 {
            for x in 0..40 {
                assert_eq!(
                    buffer.pixels()[(y * 40 + x) as usize],
                    kernel.color(x, y, ColorScheme::Pastel)
                );
            }
        }
    }

    #[test]
    fn test_render_beyond_reference_resolution() {
        let mut buffer = FrameBuffer::with_size(400, 3).unwrap();
        Plasma::with_parallel(false).render(&mut buffer, 0.0, ColorScheme::Sunset);
        assert_eq!(
            buffer.pixels()[2 * 400 + 399],
            Kernel::new(0.0).color(399, 2, ColorScheme::Sunset)
        );
    }

    proptest! {
        #[test]
        fn prop_kernel_is_deterministic(
            x in 0u32..320,
            y in 0u32..240,
            t in -10_000.0f32..10_000.0,
            s in 0u8..5,
        ) {
            let scheme = ColorScheme::from_index(s);
            prop_assert_eq!(Kernel::new(t).color(x, y, scheme), Kernel::new(t).color(x, y, scheme));
        }

        #[test]
        fn prop_field_is_finite_and_bounded(
            x in 0u32..320,
            y in 0u32..240,
            t in -10_000.0f32..10_000.0,
        ) {
            let gv = Kernel::new(t).field(x, y);
            prop_assert!(gv.is_finite());
            prop_assert!(gv.abs() <= 3.0 + 1e-4);
        }

        #[test]
        fn prop_channels_stay_in_byte_range(gv in -3.5f32..3.5) {
            // Mid-scale for sin(gv*pi/3) is 127; wraparound would produce a value
            // far from the float reference.
            let ch = channels_from_field(gv);
            let expected = 255.0 * (0.5 + 0.5 * (gv * FRAC_PI_3).sin());
            prop_assert!((ch.sin as f32 - expected).abs() <= 1.0);
            let expected = 255.0 * (0.5 + 0.5 * (gv * FRAC_PI_2).cos());
            prop_assert!((ch.cos as f32 - expected).abs() <= 1.0);
        }

        #[test]
        fn prop_lagoon_populates_low_16_bits_only(
            x in 0u32..320,
            y in 0u32..240,
            t in -100.0f32..100.0,
        ) {
            prop_assert_eq!(Kernel::new(t).color(x, y, ColorScheme::Lagoon) & 0xFFFF_0000, 0);
        }
    }
}
