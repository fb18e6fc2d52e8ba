//! Rasterize an output grid to a PNG.
//!
//! No font is involved: each cell becomes a solid block whose gray level is
//! the glyph's position in the palette, which is the intensity the glyph was
//! chosen for.

use crate::ascii_frame::AsciiFrame;
use crate::error::{ExportError, InvalidDimensions};
use crate::palette::Palette;
use image::{GrayImage, ImageFormat, Luma};
use std::path::Path;
use tracing::debug;

/// Pixel size of one character cell in the exported image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub w: u32,
    pub h: u32,
}

impl Default for CellSize {
    /// Same 1:2 proportions as a typical terminal cell
    fn default() -> Self {
        Self { w: 6, h: 12 }
    }
}

/// Gray level for a glyph; glyphs outside the palette render black
pub fn glyph_level(palette: &Palette, c: char) -> u8 {
    let n = palette.len();
    match palette.position(c) {
        Some(_) if n == 1 => 255,
        Some(i) => (i * 255 / (n - 1)) as u8,
        None => 0,
    }
}

pub fn render_image(
    frame: &AsciiFrame,
    palette: &Palette,
    cell: CellSize,
) -> Result<GrayImage, ExportError> {
    if cell.w == 0 || cell.h == 0 {
        return Err(InvalidDimensions {
            w: cell.w as usize,
            h: cell.h as usize,
        }
        .into());
    }

    let levels: Vec<u8> = frame.chars().iter().map(|&c| glyph_level(palette, c)).collect();
    let img_w = frame.w as u32 * cell.w;
    let img_h = frame.h as u32 * cell.h;

    Ok(GrayImage::from_fn(img_w, img_h, |px, py| {
        let x = (px / cell.w) as usize;
        let y = (py / cell.h) as usize;
        Luma([levels[y * frame.w + x]])
    }))
}

pub fn save_png(
    frame: &AsciiFrame,
    palette: &Palette,
    cell: CellSize,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let img = render_image(frame, palette, cell)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    img.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), w = img.width(), h = img.height(), "exported frame");

    Ok(())
}
