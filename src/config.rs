//! Startup configuration: JSON file plus command line overrides

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::display::{window_size, DEFAULT_HEIGHT, DEFAULT_UPSCALE, DEFAULT_WIDTH, MAX_DIMENSION};
use crate::effects::ColorScheme;
use crate::state::{AnimationState, MAX_SPEED};

/// Read from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "plasma.json";

const DEFAULT_BENCHMARK_FRAMES: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub upscale: u32,
    pub vsync: bool,
    pub fullscreen: bool,
    pub speed: u8,
    pub scheme: u8,
    pub parallel: bool,
    pub benchmark_frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            upscale: DEFAULT_UPSCALE,
            vsync: true,
            fullscreen: false,
            speed: 1,
            scheme: 0,
            parallel: true,
            benchmark_frames: DEFAULT_BENCHMARK_FRAMES,
        }
    }
}

impl Config {
    /// Load config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Self::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str::<Self>(json)
            .map_err(|e| e.to_string())?
            .normalized()
    }

    /// Clamp sizes to at least one pixel and wrap speed/scheme into range.
    /// Sizes too large for a frame buffer or window are an error.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self.upscale = self.upscale.max(1);
        self.speed %= MAX_SPEED + 1;
        self.scheme %= ColorScheme::COUNT;
        self.benchmark_frames = self.benchmark_frames.max(1);

        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!(
                "resolution {}x{} exceeds {} per side",
                self.width, self.height, MAX_DIMENSION
            ));
        }
        window_size(self.width, self.height, self.upscale)?;
        Ok(self)
    }

    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::from_index(self.scheme)
    }

    pub fn initial_state(&self) -> AnimationState {
        AnimationState::with_settings(self.speed, self.color_scheme())
    }
}
