use crate::ffmpeg::FfmpegOptions;
use crate::mock_frame_generator::PatternType;
use clap::ValueEnum;
use common::enhance::ContrastBrightness;
use common::resize::DEFAULT_ASPECT_CORRECTION;
use common::{Interpolation, Palette, Scale};
use std::path::PathBuf;
use std::time::Duration;

/// Where frames come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Webcam through an `ffmpeg` child process
    #[default]
    Ffmpeg,
    /// Webcam through the native capture API (needs the `nokhwa` feature)
    Nokhwa,
    /// Synthetic test pattern, no camera needed
    Pattern,
}

/// Every tunable of the capture loop
#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub source: SourceKind,
    /// ffmpeg device path / name, or camera index for nokhwa
    pub device: Option<String>,
    pub camera_width: usize,
    pub camera_height: usize,
    pub pattern: PatternType,
    /// stop after this many frames
    pub max_frames: Option<usize>,
    pub fps: u32,
    /// fixed output grid width instead of the terminal's
    pub ascii_width: Option<usize>,
    /// fixed output grid height instead of the terminal's
    pub ascii_height: Option<usize>,
    pub aspect_correction: f32,
    /// fill the output area instead of keeping the source's proportions
    pub stretch: bool,
    pub interpolation: Interpolation,
    pub palette: Palette,
    pub scale: Scale,
    pub invert: bool,
    pub mirror: bool,
    pub show_source_frames: bool,
    pub contrast: f32,
    pub brightness: f32,
    pub equalize: bool,
    pub blur_radius: usize,
    /// escape-sequence clears on the normal screen instead of the
    /// alternate screen
    pub plain: bool,
    pub snapshot_dir: PathBuf,
}

impl VideoConfig {
    pub const DEFAULT_CAMERA_WIDTH: usize = 640;
    pub const DEFAULT_CAMERA_HEIGHT: usize = 480;
    pub const DEFAULT_FPS: u32 = 20;

    pub fn ffmpeg_options(&self) -> FfmpegOptions {
        FfmpegOptions {
            device: self.device.clone(),
            w: self.camera_width,
            h: self.camera_height,
            fps: self.fps.max(1),
        }
    }

    /// Minimum time between the starts of two loop iterations
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }

    pub fn contrast_brightness(&self) -> ContrastBrightness {
        ContrastBrightness::new(self.contrast, self.brightness)
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Ffmpeg,
            device: None,
            camera_width: Self::DEFAULT_CAMERA_WIDTH,
            camera_height: Self::DEFAULT_CAMERA_HEIGHT,
            pattern: PatternType::default(),
            max_frames: None,
            fps: Self::DEFAULT_FPS,
            ascii_width: None,
            ascii_height: None,
            aspect_correction: DEFAULT_ASPECT_CORRECTION,
            stretch: false,
            interpolation: Interpolation::Auto,
            palette: Palette::standard(),
            scale: Scale::Binned,
            invert: false,
            mirror: false,
            show_source_frames: false,
            contrast: ContrastBrightness::DEFAULT_CONTRAST,
            brightness: ContrastBrightness::DEFAULT_BRIGHTNESS,
            equalize: false,
            blur_radius: 0,
            plain: false,
            snapshot_dir: PathBuf::from("."),
        }
    }
}
