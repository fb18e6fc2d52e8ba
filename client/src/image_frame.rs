use common::{GrayFrame, InvalidDimensions};

/// Luma weights from Rec. ITU-R BT.601-7: how much each channel
/// contributes to perceived brightness.
pub const R_LUMINANCE: f32 = 0.2989;
pub const G_LUMINANCE: f32 = 0.5870;
pub const B_LUMINANCE: f32 = 0.1140;

pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Raw color frame as delivered by the camera
pub struct ImageFrame {
    /// width of image
    pub w: usize,
    /// height of image
    pub h: usize,
    /// usually 3 (RGB)
    pub bytes_per_pixel: usize,
    /// frame data
    pub buffer: Vec<u8>,
}

impl ImageFrame {
    pub fn new(w: usize, h: usize, bytes_per_pixel: usize) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 || bytes_per_pixel < RGB_BYTES_PER_PIXEL {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self {
            w,
            h,
            bytes_per_pixel,
            buffer: vec![0; w * h * bytes_per_pixel],
        })
    }

    /// Wrap an already filled RGB buffer
    pub fn from_rgb(w: usize, h: usize, buffer: Vec<u8>) -> Result<Self, InvalidDimensions> {
        if w == 0 || h == 0 || buffer.len() != w * h * RGB_BYTES_PER_PIXEL {
            return Err(InvalidDimensions { w, h });
        }

        Ok(Self {
            w,
            h,
            bytes_per_pixel: RGB_BYTES_PER_PIXEL,
            buffer,
        })
    }

    /// Return raw image data
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Return raw, mutable image data
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Get pixel RGB values, with bounds checking
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        if x >= self.w || y >= self.h {
            return None;
        }

        let i = (y * self.w + x) * self.bytes_per_pixel;
        if i + 2 >= self.buffer.len() {
            return None;
        }

        Some((self.buffer[i], self.buffer[i + 1], self.buffer[i + 2]))
    }

    /// Calculate the grayscale intensity value (relative luminance)
    /// of a given pixel
    pub fn calculate_intensity((r, g, b): (u8, u8, u8)) -> f32 {
        R_LUMINANCE * r as f32 + G_LUMINANCE * g as f32 + B_LUMINANCE * b as f32
    }

    /// Calculate the grayscale intensity value (relative luminance)
    /// of a given pixel and cast as a `u8`
    pub fn calculate_intensity_u8((r, g, b): (u8, u8, u8)) -> u8 {
        ImageFrame::calculate_intensity((r, g, b)).round().clamp(0.0, 255.0) as u8
    }

    /// Collapse the color channels into a grayscale frame
    pub fn to_gray(&self) -> Result<GrayFrame, InvalidDimensions> {
        let samples = self
            .buffer
            .chunks_exact(self.bytes_per_pixel)
            .take(self.w * self.h)
            .map(|px| Self::calculate_intensity_u8((px[0], px[1], px[2])))
            .collect();

        GrayFrame::from_samples(self.w, self.h, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_weights_green_highest() {
        assert_eq!(ImageFrame::calculate_intensity_u8((0, 0, 0)), 0);
        assert_eq!(ImageFrame::calculate_intensity_u8((255, 255, 255)), 255);
        assert!(
            ImageFrame::calculate_intensity_u8((0, 255, 0))
                > ImageFrame::calculate_intensity_u8((255, 0, 0))
        );
    }

    #[test]
    fn to_gray_keeps_dimensions() {
        let frame = ImageFrame::from_rgb(2, 1, vec![255, 255, 255, 0, 0, 0]).unwrap();
        let gray = frame.to_gray().unwrap();

        assert_eq!(gray.dimensions(), (2, 1));
        assert_eq!(gray.samples(), &[255, 0]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(ImageFrame::from_rgb(2, 2, vec![0; 11]).is_err());
        assert!(ImageFrame::new(0, 2, 3).is_err());
    }
}
