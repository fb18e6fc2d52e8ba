//! Optional filters applied to a frame before it is resized and quantized.
//!
//! Every filter returns a frame of the same shape with samples still in
//! `0..=255`.

use crate::gray_frame::GrayFrame;

pub trait Enhance {
    fn apply(&self, frame: &GrayFrame) -> GrayFrame;
}

impl<F> Enhance for F
where
    F: Fn(&GrayFrame) -> GrayFrame,
{
    fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        self(frame)
    }
}

/// Linear contrast stretch around mid-gray followed by a brightness offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContrastBrightness {
    /// Adjustment factor for contrast.
    /// Values < 1.0 reduce contrast, values > 1.0 increase contrast
    pub contrast: f32,
    /// Adjustment factor for brightness, as a fraction of full scale.
    /// values > 0 increase brightness, values < 0 decrease it
    pub brightness: f32,
}

impl ContrastBrightness {
    pub const DEFAULT_CONTRAST: f32 = 1.0;
    pub const DEFAULT_BRIGHTNESS: f32 = 0.0;

    pub fn new(contrast: f32, brightness: f32) -> Self {
        Self {
            contrast,
            brightness,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.contrast == 1.0 && self.brightness == 0.0
    }

    /// Adjust a single sample
    pub fn adjust(&self, value: u8) -> u8 {
        // normalize (0-255) between 0.0 and 1.0
        let mut v = value as f32 / 255.0;
        v = (v - 0.5) * self.contrast + 0.5;
        v += self.brightness;
        // floor of 0.0 and ceiling of 1.0 (prevent overflow)
        v = v.clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    }
}

impl Default for ContrastBrightness {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONTRAST, Self::DEFAULT_BRIGHTNESS)
    }
}

impl Enhance for ContrastBrightness {
    fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        let mut lut = [0u8; 256];
        for (v, out) in lut.iter_mut().enumerate() {
            *out = self.adjust(v as u8);
        }
        frame.map(|v| lut[v as usize])
    }
}

/// Histogram equalization: spreads the occupied intensities over the full
/// range so a dim room still uses the whole palette
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EqualizeHistogram;

impl Enhance for EqualizeHistogram {
    fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        let mut hist = [0usize; 256];
        for &v in frame.samples() {
            hist[v as usize] += 1;
        }

        let total = frame.samples().len();
        let Some(lowest) = hist.iter().position(|&count| count > 0) else {
            return frame.clone();
        };

        // a single intensity has nothing to spread
        if hist[lowest] == total {
            return frame.clone();
        }

        let scale = 255.0 / (total - hist[lowest]) as f32;
        let mut lut = [0u8; 256];
        let mut cumulative = 0usize;

        for v in (lowest + 1)..256 {
            cumulative += hist[v];
            lut[v] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
        }

        frame.map(|v| lut[v as usize])
    }
}

/// Mean filter over a `(2 * radius + 1)` square window, clamped at the edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxBlur {
    pub radius: usize,
}

impl BoxBlur {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Enhance for BoxBlur {
    fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        if self.radius == 0 {
            return frame.clone();
        }

        let (w, h) = frame.dimensions();

        // summed-area table with a zero row and column in front
        let stride = w + 1;
        let mut table = vec![0u64; stride * (h + 1)];
        for (y, row) in frame.rows().enumerate() {
            let mut row_sum = 0u64;
            for (x, &v) in row.iter().enumerate() {
                row_sum += v as u64;
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }

        let r = self.radius;
        let mut out = frame.clone();

        for y in 0..h {
            let y0 = y.saturating_sub(r);
            let y1 = (y + r + 1).min(h);
            for x in 0..w {
                let x0 = x.saturating_sub(r);
                let x1 = (x + r + 1).min(w);

                let sum = table[y1 * stride + x1] + table[y0 * stride + x0]
                    - table[y0 * stride + x1]
                    - table[y1 * stride + x0];
                let count = ((x1 - x0) * (y1 - y0)) as u64;

                out.set(x, y, ((sum + count / 2) / count) as u8);
            }
        }

        out
    }
}

/// Filters applied one after another, in insertion order
#[derive(Default)]
pub struct Chain {
    filters: Vec<Box<dyn Enhance>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: impl Enhance + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Enhance for Chain {
    fn apply(&self, frame: &GrayFrame) -> GrayFrame {
        let mut iter = self.filters.iter();
        let Some(first) = iter.next() else {
            return frame.clone();
        };

        iter.fold(first.apply(frame), |acc, filter| filter.apply(&acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> GrayFrame {
        GrayFrame::from_fn(16, 16, |x, y| (x * 16 + y) as u8).unwrap()
    }

    #[test]
    fn neutral_contrast_is_identity() {
        let frame = ramp();
        assert_eq!(ContrastBrightness::default().apply(&frame), frame);
    }

    #[test]
    fn contrast_saturates_at_the_ends() {
        let filter = ContrastBrightness::new(3.0, 0.0);
        assert_eq!(filter.adjust(0), 0);
        assert_eq!(filter.adjust(30), 0);
        assert_eq!(filter.adjust(230), 255);
        assert_eq!(filter.adjust(255), 255);
        assert_eq!(ContrastBrightness::new(1.0, 0.5).adjust(200), 255);
    }

    #[test]
    fn equalize_spreads_a_narrow_band() {
        let frame = GrayFrame::from_fn(4, 4, |x, _| 100 + x as u8).unwrap();
        let out = EqualizeHistogram.apply(&frame);

        assert_eq!(out.get(0, 0), Some(0));
        assert_eq!(out.get(3, 0), Some(255));
        assert!(out.get(1, 0) < out.get(2, 0));
    }

    #[test]
    fn equalize_leaves_constant_frames_alone() {
        let frame = GrayFrame::filled(5, 3, 42).unwrap();
        assert_eq!(EqualizeHistogram.apply(&frame), frame);
    }

    #[test]
    fn blur_radius_zero_is_identity() {
        let frame = ramp();
        assert_eq!(BoxBlur::new(0).apply(&frame), frame);
    }

    #[test]
    fn blur_averages_neighbourhood() {
        let mut frame = GrayFrame::new(3, 3).unwrap();
        frame.set(1, 1, 90);

        let out = BoxBlur::new(1).apply(&frame);
        assert_eq!(out.get(1, 1), Some(10));
        // corner window is 2x2 and still contains the center
        assert_eq!(out.get(0, 0), Some(23));
    }

    #[test]
    fn filters_keep_the_shape() {
        let frame = GrayFrame::from_fn(7, 5, |x, y| (x * 30 + y * 11) as u8).unwrap();
        let mut chain = Chain::new();
        chain
            .push(ContrastBrightness::new(1.5, -0.03))
            .push(EqualizeHistogram)
            .push(BoxBlur::new(2))
            .push(|f: &GrayFrame| f.map(|v| 255 - v));

        assert_eq!(chain.len(), 4);
        assert_eq!(chain.apply(&frame).dimensions(), (7, 5));
    }
}
