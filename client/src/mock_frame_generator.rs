use crate::frame_source::FrameSource;
use clap::ValueEnum;
use common::{CaptureError, GrayFrame, InvalidDimensions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Test patterns for local development
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PatternType {
    /// Horizontal ramp drifting sideways
    #[default]
    Gradient,
    Checkerboard,
    MovingBar,
    /// Uniform random samples
    Noise,
}

/// Factory for "fake" frames, for running without a camera.
pub struct MockFrameGenerator {
    /// width of mock frame
    w: usize,
    /// height of mock frame
    h: usize,
    /// pattern to generate
    pattern_type: PatternType,
    /// end the stream after this many frames
    max_frames: Option<usize>,
    seed: u64,
}

/// Live state of an opened generator
pub struct MockStream {
    /// counter to determine how the frame should look temporally
    frame_counter: usize,
    rng: StdRng,
}

impl MockStream {
    pub fn frames_generated(&self) -> usize {
        self.frame_counter
    }
}

impl MockFrameGenerator {
    pub const DEFAULT_SEED: u64 = 0x5eed;

    pub fn new(
        w: usize,
        h: usize,
        pattern_type: PatternType,
        max_frames: Option<usize>,
    ) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 {
            return Err(InvalidDimensions { w, h });
        }

        Ok(MockFrameGenerator {
            w,
            h,
            pattern_type,
            max_frames,
            seed: Self::DEFAULT_SEED,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the frame for position `frame_counter` in the stream
    pub fn generate_frame(&self, stream: &mut MockStream) -> Result<GrayFrame, InvalidDimensions> {
        let t = stream.frame_counter;

        match self.pattern_type {
            PatternType::Gradient => self.generate_gradient(t),
            PatternType::Checkerboard => self.generate_checkerboard(t),
            PatternType::MovingBar => self.generate_moving_bar(t),
            PatternType::Noise => GrayFrame::from_fn(self.w, self.h, |_, _| stream.rng.random()),
        }
    }

    /// Create a ramp from black to white that scrolls by a few columns per
    /// frame
    fn generate_gradient(&self, t: usize) -> Result<GrayFrame, InvalidDimensions> {
        let w = self.w;
        GrayFrame::from_fn(self.w, self.h, |x, _| {
            let x = (x + t * 4) % w;
            (x * 255 / (w - 1).max(1)) as u8
        })
    }

    /// Create a checkerboard pattern that flips every 5 frames
    fn generate_checkerboard(&self, t: usize) -> Result<GrayFrame, InvalidDimensions> {
        let square = (self.w.min(self.h) / 8).max(1);
        let pattern_offset = (t / 5) % 2;

        GrayFrame::from_fn(self.w, self.h, |x, y| {
            let is_odd = (x / square + y / square) % 2;
            if (is_odd + pattern_offset) % 2 == 1 {
                255
            } else {
                0
            }
        })
    }

    /// Create a bright horizontal bar moving down the frame
    fn generate_moving_bar(&self, t: usize) -> Result<GrayFrame, InvalidDimensions> {
        let thickness = (self.h / 10).max(1);
        let bar_pos = (t * thickness / 2) % self.h;

        GrayFrame::from_fn(self.w, self.h, |_, y| {
            if y >= bar_pos && y < bar_pos + thickness {
                255
            } else {
                16
            }
        })
    }
}

impl FrameSource for MockFrameGenerator {
    type Handle = MockStream;

    fn open(&mut self) -> Result<MockStream, CaptureError> {
        Ok(MockStream {
            frame_counter: 0,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }

    fn read(&mut self, stream: &mut MockStream) -> Result<GrayFrame, CaptureError> {
        if self.max_frames.is_some_and(|max| stream.frame_counter >= max) {
            return Err(CaptureError::EndOfStream);
        }

        let frame = self.generate_frame(stream)?;
        stream.frame_counter += 1;

        Ok(frame)
    }

    fn close(&mut self, _stream: MockStream) {}
}
