//! Frame loop: advance time, render, present, apply input

use std::io::Write;
use std::ops::ControlFlow;

use tracing::{debug, info, trace};

use crate::display::{FrameBuffer, InputEvent, Key, Surface};
use crate::effects::Plasma;
use crate::state::AnimationState;
use crate::util::{frame_rate, Clock, FpsCounter};

/// Frames in the rolling FPS window
const FPS_WINDOW: usize = 60;

/// What an input event asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    CycleSpeed,
    CycleScheme,
    ToggleFullscreen,
    ReportFrameRate,
    Benchmark,
}

impl Action {
    /// Key bindings: Escape, S, C, F, T, P. Anything else is ignored.
    pub fn from_event(event: &InputEvent) -> Option<Self> {
        match event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => Some(Self::Quit),
            InputEvent::KeyDown(Key::S) => Some(Self::CycleSpeed),
            InputEvent::KeyDown(Key::C) => Some(Self::CycleScheme),
            InputEvent::KeyDown(Key::F) => Some(Self::ToggleFullscreen),
            InputEvent::KeyDown(Key::T) => Some(Self::ReportFrameRate),
            InputEvent::KeyDown(Key::P) => Some(Self::Benchmark),
            InputEvent::KeyDown(Key::Other) => None,
        }
    }
}

/// Average render cost measured by [`FrameDriver::benchmark`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkResult {
    pub frames: u32,
    pub parallel_ms: f32,
    pub sequential_ms: f32,
}

/// Owns the animation state and the frame buffer and runs the main loop.
///
/// Text diagnostics (frame rate, benchmark) are written to `out`.
pub struct FrameDriver<S, C, W> {
    surface: S,
    clock: C,
    out: W,
    state: AnimationState,
    plasma: Plasma,
    buffer: FrameBuffer,
    fps: FpsCounter,
    start_ms: u64,
    last_frame_ms: u64,
    frame_rate: f32,
    frames: u64,
    benchmark_frames: u32,
}

impl<S: Surface, C: Clock, W: Write> FrameDriver<S, C, W> {
    pub fn new(
        surface: S,
        clock: C,
        out: W,
        buffer: FrameBuffer,
        state: AnimationState,
        plasma: Plasma,
    ) -> Self {
        let start_ms = clock.now_ms();
        Self {
            surface,
            clock,
            out,
            state,
            plasma,
            buffer,
            fps: FpsCounter::new(FPS_WINDOW),
            start_ms,
            last_frame_ms: start_ms,
            frame_rate: 0.0,
            frames: 0,
            benchmark_frames: 100,
        }
    }

    /// Iterations rendered by the P benchmark
    pub fn with_benchmark_frames(mut self, frames: u32) -> Self {
        self.benchmark_frames = frames.max(1);
        self
    }

    /// Sample the clock once and derive this frame's animation time
    pub fn advance_time(&mut self) -> f32 {
        let raw_ticks = self.clock.now_ms().saturating_sub(self.start_ms);
        self.state.advance_time(raw_ticks)
    }

    pub fn render_frame(&mut self) {
        self.plasma
            .render(&mut self.buffer, self.state.elapsed(), self.state.scheme());
    }

    fn present(&mut self) -> Result<(), String> {
        self.surface.update(&self.buffer)?;
        self.surface.present()?;
        self.frames += 1;
        Ok(())
    }

    /// Apply one input action to the driver state
    pub fn apply_input(&mut self, action: Action) -> Result<ControlFlow<()>, String> {
        match action {
            Action::Quit => {
                info!(frames = self.frames, "quit requested");
                return Ok(ControlFlow::Break(()));
            },
            Action::CycleSpeed => {
                self.state.cycle_speed();
                info!(
                    speed = self.state.speed(),
                    paused = self.state.is_paused(),
                    "speed changed"
                );
            },
            Action::CycleScheme => {
                let scheme = self.state.cycle_scheme();
                info!(scheme = scheme.name(), index = scheme.index(), "color scheme changed");
            },
            Action::ToggleFullscreen => {
                let fullscreen = !self.surface.is_fullscreen();
                self.surface.set_fullscreen(fullscreen)?;
                info!(fullscreen, "toggled fullscreen");
            },
            Action::ReportFrameRate => self.report_frame_rate()?,
            Action::Benchmark => {
                let result = self.benchmark();
                writeln!(
                    self.out,
                    "benchmark: {} frames, {:.2} ms/frame parallel, {:.2} ms/frame sequential",
                    result.frames, result.parallel_ms, result.sequential_ms
                )
                .map_err(|e| e.to_string())?;
            },
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Drain pending events. Stops at the first quit.
    pub fn handle_events(&mut self) -> Result<ControlFlow<()>, String> {
        for event in self.surface.poll_events() {
            let Some(action) = Action::from_event(&event) else {
                continue;
            };
            if self.apply_input(action)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Render one frame, present it and process the input that arrived
    pub fn step(&mut self) -> Result<ControlFlow<()>, String> {
        let time = self.advance_time();
        self.render_frame();
        self.present()?;

        let flow = self.handle_events()?;

        let now = self.clock.now_ms();
        self.frame_rate = frame_rate(now.saturating_sub(self.last_frame_ms));
        self.last_frame_ms = now;
        self.fps.tick(now);
        trace!(frame = self.frames, time, fps = self.frame_rate, "frame");

        Ok(flow)
    }

    /// Run until quit. Returns the number of frames presented.
    pub fn run(&mut self) -> Result<u64, String> {
        info!(
            width = self.buffer.width(),
            height = self.buffer.height(),
            parallel = self.plasma.is_parallel(),
            "starting frame loop"
        );
        while self.step()?.is_continue() {}
        Ok(self.frames)
    }

    pub fn report_frame_rate(&mut self) -> Result<(), String> {
        let (min_fps, max_fps) = self.fps.min_max_fps();
        writeln!(
            self.out,
            "fps: {:.1} (avg {:.1}, min {:.1}, max {:.1}, {:.2} ms/frame over {} frames)",
            self.frame_rate,
            self.fps.avg_fps(),
            min_fps,
            max_fps,
            self.fps.avg_frame_time_ms(),
            self.fps.frame_count()
        )
        .map_err(|e| e.to_string())
    }

    /// Render a fixed number of frames with the current time and scheme,
    /// once on the rayon pool and once on this thread. State is untouched;
    /// the buffer is rewritten by the next frame anyway.
    pub fn benchmark(&mut self) -> BenchmarkResult {
        let frames = self.benchmark_frames;
        let time = self.state.elapsed();
        let scheme = self.state.scheme();

        let start = self.clock.now_ms();
        for _ in 0..frames {
            Plasma::render_parallel(&mut self.buffer, time, scheme);
        }
        let mid = self.clock.now_ms();
        for _ in 0..frames {
            Plasma::render_sequential(&mut self.buffer, time, scheme);
        }
        let end = self.clock.now_ms();

        let result = BenchmarkResult {
            frames,
            parallel_ms: mid.saturating_sub(start) as f32 / frames as f32,
            sequential_ms: end.saturating_sub(mid) as f32 / frames as f32,
        };
        debug!(?result, "benchmark finished");
        result
    }
}

#[cfg(test)]
impl<S, C, W> FrameDriver<S, C, W> {
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }
}
