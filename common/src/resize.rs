//! Scaling captured frames down (or up) to the terminal's cell grid.

use crate::ascii_frame::{DEFAULT_H, DEFAULT_W};
use crate::error::{InvalidDimensions, UnknownVariant};
use crate::gray_frame::GrayFrame;
use std::str::FromStr;

/// Terminal cells are roughly twice as tall as they are wide; output height
/// is multiplied by this so the picture keeps its proportions.
pub const DEFAULT_ASPECT_CORRECTION: f32 = 0.55;

/// Dimensions of the output grid, in character cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSize {
    pub w: usize,
    pub h: usize,
}

impl OutputSize {
    /// Used whenever the target cannot be derived (unknown terminal size,
    /// degenerate source)
    pub const FALLBACK: OutputSize = OutputSize {
        w: DEFAULT_W,
        h: DEFAULT_H,
    };

    pub fn new(w: usize, h: usize) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 {
            return Err(InvalidDimensions { w, h });
        }
        Ok(Self { w, h })
    }

    /// Fill the whole `cols` x `rows` area, ignoring the source's proportions
    pub fn stretch(cols: usize, rows: usize) -> Result<Self, InvalidDimensions> {
        Self::new(cols, rows)
    }

    /// Largest grid inside `cols` x `rows` that keeps the source's aspect
    /// ratio once glyph cell proportions (`aspect`) are accounted for.
    ///
    /// Width is taken from `cols`; if the derived height does not fit in
    /// `rows`, the width shrinks instead.
    pub fn fit(
        cols: usize,
        rows: usize,
        src_w: usize,
        src_h: usize,
        aspect: f32,
    ) -> Result<Self, InvalidDimensions> {
        if cols == 0 || rows == 0 || src_w == 0 || src_h == 0 {
            return Err(InvalidDimensions { w: cols, h: rows });
        }
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(InvalidDimensions { w: cols, h: rows });
        }

        // rows of output per column of output
        let ratio = src_h as f32 / src_w as f32 * aspect;
        let h = (cols as f32 * ratio) as usize;

        if h <= rows {
            return Self::new(cols, h.max(1));
        }

        let w = ((rows as f32 / ratio) as usize).clamp(1, cols);
        Self::new(w, rows)
    }
}

/// Sampling strategy used by [`resize`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// `Area` when shrinking in both directions, `Bilinear` otherwise
    #[default]
    Auto,
    /// Average of every source sample under the target cell's footprint
    Area,
    /// Weighted blend of the four source samples around the cell center
    Bilinear,
    /// Single source sample at the scaled cell origin
    Nearest,
}

impl FromStr for Interpolation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Interpolation::Auto),
            "area" => Ok(Interpolation::Area),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "nearest" => Ok(Interpolation::Nearest),
            _ => Err(UnknownVariant {
                kind: "interpolation",
                value: s.to_string(),
                expected: "auto, area, bilinear, nearest",
            }),
        }
    }
}

/// Resize `src` to exactly `w` x `h` samples
pub fn resize(
    src: &GrayFrame,
    w: usize,
    h: usize,
    interpolation: Interpolation,
) -> Result<GrayFrame, InvalidDimensions> {
    if w == 0 || h == 0 {
        return Err(InvalidDimensions { w, h });
    }
    if (w, h) == src.dimensions() {
        return Ok(src.clone());
    }

    let interpolation = match interpolation {
        Interpolation::Auto if w <= src.w && h <= src.h => Interpolation::Area,
        Interpolation::Auto => Interpolation::Bilinear,
        other => other,
    };

    match interpolation {
        Interpolation::Area => resize_area(src, w, h),
        Interpolation::Bilinear => resize_bilinear(src, w, h),
        _ => resize_nearest(src, w, h),
    }
}

/// Resize to a previously validated output size
pub fn resize_to(src: &GrayFrame, size: OutputSize, interpolation: Interpolation) -> GrayFrame {
    match resize(src, size.w, size.h, interpolation) {
        Ok(frame) => frame,
        // OutputSize never holds a zero dimension
        Err(_) => src.clone(),
    }
}

fn resize_nearest(src: &GrayFrame, w: usize, h: usize) -> Result<GrayFrame, InvalidDimensions> {
    // scaling factors to map the target's dimensions to the source's
    let scale_x = src.w as f32 / w as f32;
    let scale_y = src.h as f32 / h as f32;

    GrayFrame::from_fn(w, h, |x, y| {
        let s_x = ((x as f32 * scale_x) as usize).min(src.w - 1);
        let s_y = ((y as f32 * scale_y) as usize).min(src.h - 1);
        src.at(s_x, s_y)
    })
}

fn resize_bilinear(src: &GrayFrame, w: usize, h: usize) -> Result<GrayFrame, InvalidDimensions> {
    let xs = linear_taps(src.w, w);
    let ys = linear_taps(src.h, h);

    GrayFrame::from_fn(w, h, |x, y| {
        let (x0, x1, fx) = xs[x];
        let (y0, y1, fy) = ys[y];

        let top = src.at(x0, y0) as f32 * (1.0 - fx) + src.at(x1, y0) as f32 * fx;
        let bottom = src.at(x0, y1) as f32 * (1.0 - fx) + src.at(x1, y1) as f32 * fx;
        let v = top * (1.0 - fy) + bottom * fy;

        v.round().clamp(0.0, 255.0) as u8
    })
}

/// For each target index: the two neighbouring source indices and the
/// weight of the second one. Sample centers are aligned, not corners.
fn linear_taps(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len - 1;

    (0..dst_len)
        .map(|i| {
            let s = ((i as f32 + 0.5) * scale - 0.5).clamp(0.0, last as f32);
            let s0 = s.floor() as usize;
            let s1 = (s0 + 1).min(last);
            (s0, s1, s - s0 as f32)
        })
        .collect()
}

fn resize_area(src: &GrayFrame, w: usize, h: usize) -> Result<GrayFrame, InvalidDimensions> {
    let xs = area_spans(src.w, w);
    let ys = area_spans(src.h, h);

    GrayFrame::from_fn(w, h, |x, y| {
        let mut sum = 0.0f32;
        let mut total = 0.0f32;

        for &(s_y, w_y) in &ys[y] {
            for &(s_x, w_x) in &xs[x] {
                let weight = w_x * w_y;
                sum += src.at(s_x, s_y) as f32 * weight;
                total += weight;
            }
        }

        if total <= 0.0 {
            return 0;
        }
        (sum / total).round().clamp(0.0, 255.0) as u8
    })
}

/// For each target index: the source indices it covers and how much of each
/// one falls inside its footprint
fn area_spans(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f32 / dst_len as f32;

    (0..dst_len)
        .map(|i| {
            let start = i as f32 * scale;
            let end = ((i + 1) as f32 * scale).min(src_len as f32);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).clamp(first + 1, src_len);

            (first..last)
                .filter_map(|s| {
                    let overlap = end.min((s + 1) as f32) - start.max(s as f32);
                    (overlap > 0.0).then_some((s, overlap))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize) -> GrayFrame {
        GrayFrame::from_fn(w, h, |x, y| ((x * 7 + y * 3) % 256) as u8).unwrap()
    }

    #[test]
    fn output_matches_requested_dimensions() {
        let src = gradient(640, 480);
        for interpolation in [
            Interpolation::Auto,
            Interpolation::Area,
            Interpolation::Bilinear,
            Interpolation::Nearest,
        ] {
            for (w, h) in [(80, 24), (1, 1), (639, 479), (1000, 700), (3, 900)] {
                let out = resize(&src, w, h, interpolation).unwrap();
                assert_eq!(out.dimensions(), (w, h), "{interpolation:?}");
                assert_eq!(out.samples().len(), w * h);
            }
        }
    }

    #[test]
    fn zero_target_is_invalid() {
        let src = gradient(4, 4);
        assert_eq!(
            resize(&src, 0, 3, Interpolation::Area),
            Err(InvalidDimensions { w: 0, h: 3 })
        );
    }

    #[test]
    fn constant_frames_stay_constant() {
        let src = GrayFrame::filled(37, 23, 173).unwrap();
        for interpolation in [Interpolation::Area, Interpolation::Bilinear, Interpolation::Nearest] {
            for (w, h) in [(10, 5), (80, 40)] {
                let out = resize(&src, w, h, interpolation).unwrap();
                assert!(out.samples().iter().all(|&v| v == 173), "{interpolation:?}");
            }
        }
    }

    #[test]
    fn area_averages_blocks() {
        let src = GrayFrame::from_samples(4, 2, vec![0, 100, 200, 200, 100, 0, 200, 200]).unwrap();
        let out = resize(&src, 2, 1, Interpolation::Area).unwrap();
        assert_eq!(out.samples(), &[50, 200]);
    }

    #[test]
    fn bilinear_blends_between_neighbours() {
        let src = GrayFrame::from_samples(2, 1, vec![0, 200]).unwrap();
        let out = resize(&src, 4, 1, Interpolation::Bilinear).unwrap();
        assert_eq!(out.samples(), &[0, 50, 150, 200]);
    }

    #[test]
    fn fit_keeps_proportions_within_the_terminal() {
        // 640x480 at 0.55 wants 33 rows for 80 columns; only 24 exist
        let size = OutputSize::fit(80, 24, 640, 480, DEFAULT_ASPECT_CORRECTION).unwrap();
        assert_eq!(size, OutputSize { w: 58, h: 24 });

        let size = OutputSize::fit(100, 60, 640, 480, DEFAULT_ASPECT_CORRECTION).unwrap();
        assert_eq!(size, OutputSize { w: 100, h: 41 });
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        assert!(OutputSize::fit(0, 24, 640, 480, 0.55).is_err());
        assert!(OutputSize::fit(80, 24, 0, 480, 0.55).is_err());
        assert!(OutputSize::fit(80, 24, 640, 480, 0.0).is_err());
        assert!(OutputSize::fit(80, 24, 640, 480, f32::NAN).is_err());
    }

    #[test]
    fn fit_never_returns_zero_height() {
        let size = OutputSize::fit(3, 24, 1000, 1, 0.55).unwrap();
        assert_eq!(size.h, 1);
    }
}
