//! Grayscale preview of the source frame, drawn with half-block glyphs.
//!
//! Each character cell shows two vertically stacked samples: the upper one
//! as the foreground of `▀`, the lower one as the background.

use common::GrayFrame;
use crossterm::style::{Color, Stylize};

const UPPER_HALF_BLOCK: char = '▀';

fn gray(v: u8) -> Color {
    Color::Rgb { r: v, g: v, b: v }
}

/// One string per pair of frame rows (the last row pairs with black when the
/// height is odd). Lines contain color escape sequences.
pub fn half_block_lines(frame: &GrayFrame) -> Vec<String> {
    let rows: Vec<&[u8]> = frame.rows().collect();

    rows.chunks(2)
        .map(|pair| {
            let top = pair[0];
            let bottom = pair.get(1).copied();

            top.iter()
                .enumerate()
                .map(|(x, &upper)| {
                    let lower = bottom.map_or(0, |row| row[x]);
                    UPPER_HALF_BLOCK
                        .with(gray(upper))
                        .on(gray(lower))
                        .to_string()
                })
                .collect()
        })
        .collect()
}
