use crate::error::InvalidDimensions;
use std::fmt;

/// Fallback output grid width when the terminal size is unknown
pub const DEFAULT_W: usize = 80;
/// Fallback output grid height when the terminal size is unknown
pub const DEFAULT_H: usize = 24;

/// ASCII representation of a `GrayFrame` after resizing and quantization
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiFrame {
    /// The amount of columns in the frame
    pub w: usize,
    /// The amount of rows in the frame
    pub h: usize,
    /// quantized samples, interpreted as characters
    chars: Vec<char>,
}

impl AsciiFrame {
    pub fn new(w: usize, h: usize, default_char: char) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self {
            w,
            h,
            chars: vec![default_char; w * h],
        })
    }

    /// Shape must already be validated by the caller (`chars.len() == w * h`)
    pub(crate) fn from_parts(w: usize, h: usize, chars: Vec<char>) -> Self {
        debug_assert_eq!(chars.len(), w * h);
        Self { w, h, chars }
    }

    /// Parse a block of text into a grid; every line must have the same width
    pub fn from_text(text: &str) -> Result<Self, InvalidDimensions> {
        let lines: Vec<Vec<char>> = text.split('\n').map(|l| l.chars().collect()).collect();
        let h = lines.len();
        let w = lines.first().map_or(0, Vec::len);

        if w == 0 || lines.iter().any(|l| l.len() != w) {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self {
            w,
            h,
            chars: lines.into_iter().flatten().collect(),
        })
    }

    pub fn set_char(&mut self, x: usize, y: usize, c: char) -> bool {
        if x >= self.w || y >= self.h {
            return false;
        }

        let i = y * self.w + x;
        if i < self.chars.len() {
            self.chars[i] = c;
            true
        } else {
            false
        }
    }

    pub fn get_char(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.w || y >= self.h {
            return None;
        }
        self.chars.get(y * self.w + x).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn chars_mut(&mut self) -> &mut [char] {
        &mut self.chars
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.chars.chunks_exact(self.w)
    }

    /// One row of the grid as a string, exactly `w` glyphs long
    pub fn line(&self, y: usize) -> Option<String> {
        self.rows().nth(y).map(|row| row.iter().collect())
    }

    /// The whole grid as text: rows joined with `\n`, no trailing separator
    /// and no padding past the grid's width
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity((self.w + 1) * self.h);

        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                text.push('\n');
            }
            text.extend(row.iter());
        }

        text
    }
}

impl Default for AsciiFrame {
    /// A blank grid of the fallback size
    fn default() -> Self {
        Self::from_parts(DEFAULT_W, DEFAULT_H, vec![' '; DEFAULT_W * DEFAULT_H])
    }
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_has_one_line_per_row_and_no_trailing_newline() {
        let mut frame = AsciiFrame::new(3, 2, '.').unwrap();
        frame.set_char(1, 1, '#');

        assert_eq!(frame.to_text(), "...\n.#.");
        assert_eq!(frame.line(1).as_deref(), Some(".#."));
        assert_eq!(frame.line(2), None);
    }

    #[test]
    fn out_of_bounds_writes_are_refused() {
        let mut frame = AsciiFrame::new(2, 2, ' ').unwrap();
        assert!(!frame.set_char(2, 0, '#'));
        assert!(!frame.set_char(0, 2, '#'));
        assert_eq!(frame.to_text(), "  \n  ");
    }

    #[test]
    fn from_text_rejects_ragged_rows() {
        assert!(AsciiFrame::from_text("ab\nc").is_err());
        assert!(AsciiFrame::from_text("").is_err());

        let frame = AsciiFrame::from_text("ab\ncd").unwrap();
        assert_eq!((frame.w, frame.h), (2, 2));
        assert_eq!(frame.get_char(1, 1), Some('d'));
    }
}
