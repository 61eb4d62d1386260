use super::MAX_DIMENSION;

// ============================================================================
// FrameBuffer
// ============================================================================

/// Packed 0x00RRGGBB pixel buffer, row-major.
/// Uploaded as-is to an XRGB8888 streaming texture.
pub struct FrameBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// Create a frame buffer cleared to black.
    /// Each side must be in 1..=MAX_DIMENSION.
    pub fn with_size(width: u32, height: u32) -> Result<Self, String> {
        if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
            return Err(format!(
                "frame buffer {}x{} out of range (1..={} per side)",
                width, height, MAX_DIMENSION
            ));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| format!("frame buffer {}x{} is too large", width, height))?;
        Ok(Self {
            pixels: vec![0; len],
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn pitch(&self) -> usize {
        self.width as usize * std::mem::size_of::<u32>()
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes in native endianness, the layout SDL expects for packed formats
    pub fn as_bytes(&self) -> &[u8] {
        let pixels = self.pixels();
        // Safety: u32 has no padding and a stricter alignment than u8, and the
        // byte length is exactly len * 4 of an initialized allocation.
        unsafe {
            std::slice::from_raw_parts(
                pixels.as_ptr() as *const u8,
                std::mem::size_of_val(pixels),
            )
        }
    }
}
