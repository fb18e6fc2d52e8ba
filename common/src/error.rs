use thiserror::Error;

/// Failures while acquiring frames from a video source
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The source could not be opened (no camera, no ffmpeg, bad device path)
    #[error("video device unavailable: {0}")]
    DeviceUnavailable(String),
    /// The source has no more frames to give
    #[error("end of video stream")]
    EndOfStream,
    #[error(transparent)]
    Dimensions(#[from] InvalidDimensions),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A grid or resize target with a zero (or otherwise unusable) dimension
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid dimensions: {w}x{h}")]
pub struct InvalidDimensions {
    pub w: usize,
    pub h: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette must contain at least one glyph")]
    Empty,
}

/// Unrecognized name for one of the enumerated settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Dimensions(#[from] InvalidDimensions),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
