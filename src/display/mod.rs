mod frame_buffer;

pub use frame_buffer::FrameBuffer;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use sdl2::EventPump;
use tracing::{debug, info};

/// Render resolution of the classic effect
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;
/// Window is this many times larger than the render buffer
pub const DEFAULT_UPSCALE: u32 = 2;
/// Largest render buffer side; matches the common texture size limit
pub const MAX_DIMENSION: u32 = 16384;

/// Window size for a buffer scaled by `upscale`.
/// Fails instead of wrapping when the product does not fit an SDL window.
pub fn window_size(width: u32, height: u32, upscale: u32) -> Result<(u32, u32), String> {
    let scale = |side: u32| {
        side.checked_mul(upscale)
            .filter(|&scaled| scaled <= i32::MAX as u32)
            .ok_or_else(|| {
                format!(
                    "window {}x{} scaled by {} is too large",
                    width, height, upscale
                )
            })
    };
    Ok((scale(width)?, scale(height)?))
}

/// Logical keys the effect responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    F,
    S,
    C,
    T,
    P,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
}

/// Presentation collaborator the frame driver renders into
pub trait Surface {
    /// Upload the whole buffer to the surface
    fn update(&mut self, buffer: &FrameBuffer) -> Result<(), String>;

    /// Show the last uploaded buffer. May block for vsync.
    fn present(&mut self) -> Result<(), String>;

    /// Drain everything that arrived since the last call
    fn poll_events(&mut self) -> Vec<InputEvent>;

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String>;

    fn is_fullscreen(&self) -> bool;
}

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

impl Display {
    /// Create display for a `width`x`height` buffer shown in a window
    /// `upscale` times larger.
    /// vsync=true: present blocks until the monitor refresh
    /// vsync=false: uncapped framerate for performance testing
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        upscale: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let (window_width, window_height) = window_size(width, height, upscale.max(1))?;
        let window = video_subsystem
            .window(title, window_width, window_height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let mut canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        // Keeps the aspect ratio when the window is resized or goes fullscreen
        canvas
            .set_logical_size(width, height)
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        info!(
            width,
            height,
            window_width,
            window_height,
            vsync,
            "display created"
        );

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(&mut self, target: &RenderTarget) -> Result<(), String> {
        self.canvas.clear();
        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => events.push(InputEvent::KeyDown(map_keycode(k))),
                _ => {},
            }
        }

        events
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String> {
        let mode = if fullscreen {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.canvas.window_mut().set_fullscreen(mode)?;
        debug!(fullscreen, "fullscreen state changed");
        Ok(())
    }

    pub fn is_fullscreen(&self) -> bool {
        self.canvas.window().fullscreen_state() != FullscreenType::Off
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming XRGB8888 texture matching the frame buffer
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }

    pub fn update(&mut self, buffer: &FrameBuffer) -> Result<(), String> {
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(format!(
                "buffer is {}x{} but texture is {}x{}",
                buffer.width(),
                buffer.height(),
                self.width,
                self.height
            ));
        }
        self.texture
            .update(None, buffer.as_bytes(), buffer.pitch())
            .map_err(|e| e.to_string())
    }
}

/// SDL window plus the texture the frame buffer is streamed into
pub struct SdlSurface<'a> {
    display: Display,
    target: RenderTarget<'a>,
}

impl<'a> SdlSurface<'a> {
    pub fn new(
        display: Display,
        texture_creator: &'a TextureCreator<WindowContext>,
    ) -> Result<Self, String> {
        let target = RenderTarget::with_size(texture_creator, display.width(), display.height())?;
        Ok(Self { display, target })
    }
}

impl Surface for SdlSurface<'_> {
    fn update(&mut self, buffer: &FrameBuffer) -> Result<(), String> {
        self.target.update(buffer)
    }

    fn present(&mut self) -> Result<(), String> {
        self.display.present(&self.target)
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.display.poll_events()
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String> {
        self.display.set_fullscreen(fullscreen)
    }

    fn is_fullscreen(&self) -> bool {
        self.display.is_fullscreen()
    }
}

fn map_keycode(key: Keycode) -> Key {
    match key {
        Keycode::Escape => Key::Escape,
        Keycode::F => Key::F,
        Keycode::S => Key::S,
        Keycode::C => Key::C,
        Keycode::T => Key::T,
        Keycode::P => Key::P,
        _ => Key::Other,
    }
}
