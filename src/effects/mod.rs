pub mod plasma;

pub use plasma::{Channels, Plasma};

/// The five fixed packings of the plasma intensity channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    /// Red saturated, cosine channel in green, sine channel in blue
    #[default]
    Sunset,
    /// Cosine in red, sine in green, no blue
    Ember,
    /// Sine in bits 8-15, cosine in bits 0-7; only 16 bits populated
    Lagoon,
    /// Cosine in red, sine in green, blue saturated
    Pastel,
    /// High harmonic channel on all three components
    Grayscale,
}

impl ColorScheme {
    pub const COUNT: u8 = 5;

    /// Scheme for an index, wrapping anything past the last scheme
    pub fn from_index(index: u8) -> Self {
        match index % Self::COUNT {
            0 => Self::Sunset,
            1 => Self::Ember,
            2 => Self::Lagoon,
            3 => Self::Pastel,
            _ => Self::Grayscale,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Next scheme, wrapping from the last back to the first
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sunset => "sunset",
            Self::Ember => "ember",
            Self::Lagoon => "lagoon",
            Self::Pastel => "pastel",
            Self::Grayscale => "grayscale",
        }
    }

    /// Pack intensity channels into a 0x00RRGGBB color
    #[inline]
    pub fn pack(self, ch: Channels) -> u32 {
        let ic = ch.cos as u32;
        let is = ch.sin as u32;
        match self {
            Self::Sunset => 0xFF << 16 | ic << 8 | is,
            Self::Ember => ic << 16 | is << 8,
            Self::Lagoon => is << 8 | ic,
            Self::Pastel => ic << 16 | is << 8 | 0xFF,
            Self::Grayscale => ch.harmonic as u32 * 0x01_01_01,
        }
    }
}
