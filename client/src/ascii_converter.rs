use crate::pipeline::LoopState;
use crate::video_config::VideoConfig;
use common::ascii_frame::{DEFAULT_H, DEFAULT_W};
use common::enhance::{BoxBlur, Chain, Enhance, EqualizeHistogram};
use common::resize::{OutputSize, resize_to};
use common::{AsciiFrame, GrayFrame, Interpolation, QuantizeOptions, Quantizer};
use tracing::debug;

/// Intermediary translator to transform a captured `GrayFrame` into an
/// `AsciiFrame` sized for the display
pub struct AsciiConverter {
    quantizer: Quantizer,
    /// Filters applied at capture resolution, before resizing
    enhance: Chain,
    interpolation: Interpolation,
    /// Height multiplier for glyph cell proportions
    aspect_correction: f32,
    /// Fill the display instead of keeping the source's proportions
    stretch: bool,
    /// Overrides for the display size
    fixed_w: Option<usize>,
    fixed_h: Option<usize>,
    /// Leave room for the source preview to the right of the grid
    show_source: bool,
}

impl AsciiConverter {
    pub fn new(config: &VideoConfig) -> Self {
        let mut enhance = Chain::new();

        let contrast_brightness = config.contrast_brightness();
        if !contrast_brightness.is_identity() {
            enhance.push(contrast_brightness);
        }
        if config.equalize {
            enhance.push(EqualizeHistogram);
        }
        if config.blur_radius > 0 {
            enhance.push(BoxBlur::new(config.blur_radius));
        }

        debug!(
            glyphs = config.palette.len(),
            filters = enhance.len(),
            "converter ready"
        );

        Self {
            quantizer: Quantizer::new(config.palette.clone(), config.scale),
            enhance,
            interpolation: config.interpolation,
            aspect_correction: config.aspect_correction,
            stretch: config.stretch,
            fixed_w: config.ascii_width,
            fixed_h: config.ascii_height,
            show_source: config.show_source_frames,
        }
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Grid size for a `src_w` x `src_h` frame on a display of `display`
    /// cells (80x24 when unknown). Falls back to 80x24 when no sensible
    /// size can be derived.
    pub fn target_size(
        &self,
        display: Option<(usize, usize)>,
        src_w: usize,
        src_h: usize,
    ) -> OutputSize {
        let (display_w, display_h) = display.unwrap_or((DEFAULT_W, DEFAULT_H));
        let mut cols = self.fixed_w.unwrap_or(display_w);
        let rows = self.fixed_h.unwrap_or(display_h);

        if self.show_source {
            // grid, one column gap, preview of the same width
            cols = cols.saturating_sub(1) / 2;
        }

        let size = if self.stretch {
            OutputSize::stretch(cols, rows)
        } else {
            OutputSize::fit(cols, rows, src_w, src_h, self.aspect_correction)
        };

        size.unwrap_or_else(|e| {
            debug!("{}, using {:?}", e, OutputSize::FALLBACK);
            OutputSize::FALLBACK
        })
    }

    /// Enhance, resize to `size`, then quantize into `grid`, reusing its
    /// storage while the size stays the same.
    ///
    /// Returns the resized frame, facing the same way as the grid.
    pub fn convert(
        &self,
        frame: &GrayFrame,
        size: OutputSize,
        state: &LoopState,
        grid: &mut AsciiFrame,
    ) -> GrayFrame {
        let mut resized = if self.enhance.is_empty() {
            resize_to(frame, size, self.interpolation)
        } else {
            resize_to(&self.enhance.apply(frame), size, self.interpolation)
        };

        let opts = QuantizeOptions {
            invert: state.invert,
            mirror: state.mirror,
        };
        if self.quantizer.quantize(&resized, grid, opts).is_err() {
            debug!(w = resized.w, h = resized.h, "grid resized");
            *grid = self.quantizer.to_ascii(&resized, opts);
        }

        if state.mirror {
            resized.mirror();
        }
        resized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Palette;

    fn converter(config: VideoConfig) -> AsciiConverter {
        AsciiConverter::new(&config)
    }

    #[test]
    fn unknown_display_uses_default_area() {
        let c = converter(VideoConfig::default());
        assert_eq!(c.target_size(None, 640, 480), OutputSize { w: 58, h: 24 });
    }

    #[test]
    fn stretch_fills_the_display() {
        let c = converter(VideoConfig {
            stretch: true,
            ..Default::default()
        });
        assert_eq!(c.target_size(Some((120, 40)), 640, 480), OutputSize { w: 120, h: 40 });
    }

    #[test]
    fn fixed_size_overrides_display() {
        let c = converter(VideoConfig {
            stretch: true,
            ascii_width: Some(80),
            ascii_height: Some(24),
            ..Default::default()
        });
        assert_eq!(c.target_size(Some((200, 60)), 640, 480), OutputSize::FALLBACK);
    }

    #[test]
    fn degenerate_source_falls_back() {
        let c = converter(VideoConfig::default());
        assert_eq!(c.target_size(Some((100, 40)), 0, 480), OutputSize::FALLBACK);
    }

    #[test]
    fn preview_halves_the_width() {
        let c = converter(VideoConfig {
            stretch: true,
            show_source_frames: true,
            ..Default::default()
        });
        assert_eq!(c.target_size(Some((81, 20)), 640, 480), OutputSize { w: 40, h: 20 });
    }

    #[test]
    fn convert_produces_target_shape() {
        let c = converter(VideoConfig {
            palette: Palette::try_from(" #").unwrap(),
            ..Default::default()
        });
        let frame = GrayFrame::from_fn(640, 480, |x, _| if x < 320 { 0 } else { 255 }).unwrap();

        let mut grid = AsciiFrame::default();
        let resized = c.convert(&frame, OutputSize { w: 8, h: 3 }, &LoopState::default(), &mut grid);

        assert_eq!((grid.w, grid.h), (8, 3));
        assert_eq!(resized.dimensions(), (8, 3));
        assert_eq!(grid.line(0).as_deref(), Some("    ####"));
    }

    #[test]
    fn same_size_frames_reuse_the_grid() {
        let c = converter(VideoConfig {
            palette: Palette::try_from(" #").unwrap(),
            ..Default::default()
        });
        let dark = GrayFrame::filled(4, 2, 0).unwrap();
        let bright = GrayFrame::filled(4, 2, 255).unwrap();
        let size = OutputSize { w: 4, h: 2 };
        let mut grid = AsciiFrame::default();

        c.convert(&dark, size, &LoopState::default(), &mut grid);
        assert_eq!(grid.to_text(), "    \n    ");

        let storage = grid.chars().as_ptr();
        c.convert(&bright, size, &LoopState::default(), &mut grid);
        assert_eq!(grid.to_text(), "####\n####");
        assert_eq!(grid.chars().as_ptr(), storage);
    }

    #[test]
    fn loop_state_toggles_reach_the_quantizer() {
        let c = converter(VideoConfig {
            palette: Palette::try_from(" #").unwrap(),
            ..Default::default()
        });
        let frame = GrayFrame::from_fn(4, 1, |x, _| if x == 0 { 255 } else { 0 }).unwrap();
        let state = LoopState {
            invert: true,
            mirror: true,
            ..Default::default()
        };

        let mut grid = AsciiFrame::default();
        c.convert(&frame, OutputSize { w: 4, h: 1 }, &state, &mut grid);
        assert_eq!(grid.to_text(), "### ");
    }

    #[test]
    fn mirrored_preview_matches_the_grid() {
        let c = converter(VideoConfig {
            palette: Palette::try_from(" #").unwrap(),
            ..Default::default()
        });
        let frame = GrayFrame::from_samples(3, 1, vec![255, 0, 0]).unwrap();
        let state = LoopState {
            mirror: true,
            ..Default::default()
        };

        let mut grid = AsciiFrame::default();
        let resized = c.convert(&frame, OutputSize { w: 3, h: 1 }, &state, &mut grid);

        assert_eq!(grid.to_text(), "  #");
        assert_eq!(resized.samples(), &[0, 0, 255]);
    }

    #[test]
    fn filters_are_only_added_when_enabled() {
        assert!(converter(VideoConfig::default()).enhance.is_empty());

        let c = converter(VideoConfig {
            contrast: 1.5,
            equalize: true,
            blur_radius: 1,
            ..Default::default()
        });
        assert_eq!(c.enhance.len(), 3);
    }
}
