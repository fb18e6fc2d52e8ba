use crate::error::InvalidDimensions;

/// One captured image reduced to 8-bit intensity samples, stored row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    /// The amount of columns in the frame
    pub w: usize,
    /// The amount of rows in the frame
    pub h: usize,
    /// intensity samples, `w * h` of them
    samples: Vec<u8>,
}

impl GrayFrame {
    pub fn new(w: usize, h: usize) -> Result<Self, InvalidDimensions> {
        Self::filled(w, h, 0)
    }

    pub fn filled(w: usize, h: usize, value: u8) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self {
            w,
            h,
            samples: vec![value; w * h],
        })
    }

    /// Wrap existing samples; their count must be exactly `w * h`
    pub fn from_samples(w: usize, h: usize, samples: Vec<u8>) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 || samples.len() != w * h {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self { w, h, samples })
    }

    /// Build a frame by evaluating `f(x, y)` for every cell
    pub fn from_fn(
        w: usize,
        h: usize,
        mut f: impl FnMut(usize, usize) -> u8,
    ) -> Result<Self, InvalidDimensions> {
        let mut frame = Self::new(w, h)?;
        for y in 0..h {
            for x in 0..w {
                frame.samples[y * w + x] = f(x, y);
            }
        }
        Ok(frame)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    /// Get a sample, with bounds checking
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.w || y >= self.h {
            return None;
        }
        self.samples.get(y * self.w + x).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) -> bool {
        if x >= self.w || y >= self.h {
            return false;
        }

        self.samples[y * self.w + x] = value;
        true
    }

    /// Sample lookup for callers that already clamped their coordinates
    pub(crate) fn at(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.w + x]
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Flip the frame left to right in place
    pub fn mirror(&mut self) {
        for row in self.samples.chunks_exact_mut(self.w) {
            row.reverse();
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.samples.chunks_exact(self.w)
    }

    /// Apply `f` to every sample, keeping the shape
    pub fn map(&self, f: impl Fn(u8) -> u8) -> GrayFrame {
        Self {
            w: self.w,
            h: self.h,
            samples: self.samples.iter().map(|&v| f(v)).collect(),
        }
    }
}
