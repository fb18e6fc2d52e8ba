//! Intensity to glyph quantization.
//!
//! Palettes list their glyphs starting with the one standing for the lowest
//! intensity. On a dark terminal that is the glyph with the least ink, so a
//! black pixel becomes a blank cell. Rendering on a light background is a
//! matter of inverting the lookup, not of reordering the palette.

use crate::ascii_frame::AsciiFrame;
use crate::error::{InvalidDimensions, PaletteError, UnknownVariant};
use crate::gray_frame::GrayFrame;
use std::str::FromStr;

/// 17 levels, the classic webcam ramp
pub const STANDARD_GLYPHS: &str = " .',:;clxokXdO0KN";
/// 70 levels for wide terminals
pub const EXTENDED_GLYPHS: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";
pub const COMPACT_GLYPHS: &str = " .:-=+*#%@";
pub const BLOCK_GLYPHS: &str = " .:coPO?@■";

/// How an intensity in `0..=255` is spread over `N` palette entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    /// `floor(v * N / 256)`: every glyph covers an equal share of the range
    #[default]
    Binned,
    /// `floor(v * (N - 1) / 255)`: the first and last glyph are only reached
    /// by 0 and 255 respectively
    Stretched,
}

impl Scale {
    /// Palette index for `v`, always in `[0, n - 1]` (0 for an empty palette)
    pub fn index(self, v: u8, n: usize) -> usize {
        if n == 0 {
            return 0;
        }

        let v = v as usize;
        let i = match self {
            Scale::Binned => v * n / 256,
            Scale::Stretched => v * (n - 1) / 255,
        };

        i.min(n - 1)
    }
}

impl FromStr for Scale {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binned" => Ok(Scale::Binned),
            "stretched" => Ok(Scale::Stretched),
            _ => Err(UnknownVariant {
                kind: "scale",
                value: s.to_string(),
                expected: "binned, stretched",
            }),
        }
    }
}

/// Ordered, immutable glyph sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    pub fn new(glyphs: impl IntoIterator<Item = char>) -> Result<Self, PaletteError> {
        let glyphs: Vec<char> = glyphs.into_iter().collect();
        if glyphs.is_empty() {
            return Err(PaletteError::Empty);
        }

        Ok(Self { glyphs })
    }

    pub fn standard() -> Self {
        Self::from_const(STANDARD_GLYPHS)
    }

    pub fn extended() -> Self {
        Self::from_const(EXTENDED_GLYPHS)
    }

    pub fn compact() -> Self {
        Self::from_const(COMPACT_GLYPHS)
    }

    pub fn blocks() -> Self {
        Self::from_const(BLOCK_GLYPHS)
    }

    fn from_const(glyphs: &'static str) -> Self {
        Self {
            glyphs: glyphs.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    pub fn index_of(&self, v: u8, scale: Scale) -> usize {
        scale.index(v, self.glyphs.len())
    }

    pub fn glyph(&self, v: u8, scale: Scale, invert: bool) -> char {
        let i = self.index_of(v, scale);
        let i = if invert { self.glyphs.len() - 1 - i } else { i };
        self.glyphs[i]
    }

    /// Where `c` sits in the palette, if it belongs to it
    pub fn position(&self, c: char) -> Option<usize> {
        self.glyphs.iter().position(|&g| g == c)
    }
}

impl TryFrom<&str> for Palette {
    type Error = PaletteError;

    fn try_from(glyphs: &str) -> Result<Self, Self::Error> {
        Self::new(glyphs.chars())
    }
}

/// Per-frame toggles that change how a frame is quantized
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuantizeOptions {
    /// map high intensities to the start of the palette instead of the end
    pub invert: bool,
    /// flip each row horizontally, like looking into a mirror
    pub mirror: bool,
}

/// Maps whole frames onto a palette through precomputed lookup tables
#[derive(Clone, Debug)]
pub struct Quantizer {
    palette: Palette,
    lut: [char; 256],
    lut_inverted: [char; 256],
}

impl Quantizer {
    pub fn new(palette: Palette, scale: Scale) -> Self {
        let mut lut = [' '; 256];
        let mut lut_inverted = [' '; 256];

        for v in 0..=255u8 {
            lut[v as usize] = palette.glyph(v, scale, false);
            lut_inverted[v as usize] = palette.glyph(v, scale, true);
        }

        Self {
            palette,
            lut,
            lut_inverted,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn glyph(&self, v: u8, invert: bool) -> char {
        self.lut(invert)[v as usize]
    }

    fn lut(&self, invert: bool) -> &[char; 256] {
        if invert {
            &self.lut_inverted
        } else {
            &self.lut
        }
    }

    /// Quantize `frame` into `out` without allocating; `out` must already have
    /// the frame's shape
    pub fn quantize(
        &self,
        frame: &GrayFrame,
        out: &mut AsciiFrame,
        opts: QuantizeOptions,
    ) -> Result<(), InvalidDimensions> {
        if frame.w != out.w || frame.h != out.h {
            return Err(InvalidDimensions { w: out.w, h: out.h });
        }

        let lut = self.lut(opts.invert);
        let w = frame.w;

        for (src, dst) in frame.rows().zip(out.chars_mut().chunks_exact_mut(w)) {
            for (x, &v) in src.iter().enumerate() {
                let x = if opts.mirror { w - 1 - x } else { x };
                dst[x] = lut[v as usize];
            }
        }

        Ok(())
    }

    /// Quantize `frame` into a freshly allocated grid of the same shape
    pub fn to_ascii(&self, frame: &GrayFrame, opts: QuantizeOptions) -> AsciiFrame {
        let lut = self.lut(opts.invert);
        let mut chars = Vec::with_capacity(frame.w * frame.h);

        for row in frame.rows() {
            if opts.mirror {
                chars.extend(row.iter().rev().map(|&v| lut[v as usize]));
            } else {
                chars.extend(row.iter().map(|&v| lut[v as usize]));
            }
        }

        AsciiFrame::from_parts(frame.w, frame.h, chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::<char>::new()), Err(PaletteError::Empty));
        assert_eq!(Palette::try_from(""), Err(PaletteError::Empty));
    }

    #[test]
    fn built_in_palette_lengths() {
        assert_eq!(Palette::standard().len(), 17);
        assert_eq!(Palette::extended().len(), 70);
        assert_eq!(Palette::compact().len(), 10);
        assert_eq!(Palette::blocks().len(), 10);
    }

    #[test]
    fn index_stays_in_range_for_every_intensity() {
        for n in 1..=80 {
            for v in 0..=255u8 {
                assert!(Scale::Binned.index(v, n) < n, "binned v={v} n={n}");
                assert!(Scale::Stretched.index(v, n) < n, "stretched v={v} n={n}");
            }
        }
    }

    #[test]
    fn index_is_monotonic() {
        for n in [1, 2, 3, 10, 17, 70, 256, 300] {
            for scale in [Scale::Binned, Scale::Stretched] {
                let mut prev = 0;
                for v in 0..=255u8 {
                    let i = scale.index(v, n);
                    assert!(i >= prev, "{scale:?} n={n} v={v}");
                    prev = i;
                }
            }
        }
    }

    #[test]
    fn two_glyph_palette_splits_at_the_midpoint() {
        let palette = Palette::try_from(" #").unwrap();

        assert_eq!(palette.glyph(0, Scale::Binned, false), ' ');
        assert_eq!(palette.glyph(127, Scale::Binned, false), ' ');
        assert_eq!(palette.glyph(128, Scale::Binned, false), '#');
        assert_eq!(palette.glyph(255, Scale::Binned, false), '#');
    }

    #[test]
    fn stretched_scale_reserves_last_glyph_for_full_intensity() {
        let palette = Palette::standard();

        assert_eq!(palette.glyph(0, Scale::Stretched, false), ' ');
        assert_eq!(palette.glyph(254, Scale::Stretched, false), 'K');
        assert_eq!(palette.glyph(255, Scale::Stretched, false), 'N');
        // binned reaches the last glyph earlier
        assert_eq!(palette.glyph(254, Scale::Binned, false), 'N');
    }

    #[test]
    fn invert_reverses_the_lookup() {
        let palette = Palette::compact();
        assert_eq!(palette.glyph(0, Scale::Binned, true), '@');
        assert_eq!(palette.glyph(255, Scale::Binned, true), ' ');
    }

    #[test]
    fn scale_parses_case_insensitively() {
        assert_eq!("Stretched".parse::<Scale>(), Ok(Scale::Stretched));
        assert!("log".parse::<Scale>().is_err());
    }

    #[test]
    fn quantize_mirrors_rows() {
        let quantizer = Quantizer::new(Palette::try_from(" #").unwrap(), Scale::Binned);
        let frame = GrayFrame::from_samples(3, 1, vec![255, 0, 0]).unwrap();

        let plain = quantizer.to_ascii(&frame, QuantizeOptions::default());
        let mirrored = quantizer.to_ascii(
            &frame,
            QuantizeOptions {
                mirror: true,
                ..Default::default()
            },
        );

        assert_eq!(plain.to_text(), "#  ");
        assert_eq!(mirrored.to_text(), "  #");
    }

    #[test]
    fn quantize_refuses_mismatched_output() {
        let quantizer = Quantizer::new(Palette::standard(), Scale::Binned);
        let frame = GrayFrame::new(4, 4).unwrap();
        let mut out = AsciiFrame::new(4, 3, ' ').unwrap();

        assert!(quantizer
            .quantize(&frame, &mut out, QuantizeOptions::default())
            .is_err());
    }
}
