use crate::mock_frame_generator::PatternType;
use crate::video_config::{SourceKind, VideoConfig};
use clap::{ArgAction, Parser, ValueEnum};
use common::logger::{LogLevel, LoggerConfig};
use common::resize::DEFAULT_ASPECT_CORRECTION;
use common::{Interpolation, Palette, PaletteError, Scale};
use std::path::PathBuf;

/// Built-in glyph ramps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PaletteChoice {
    /// 17 glyphs, " .',:;clxokXdO0KN"
    #[default]
    Standard,
    /// 70 glyphs for wide terminals
    Extended,
    /// 10 glyphs, " .:-=+*#%@"
    Compact,
    /// 10 glyphs ending in a solid block
    Blocks,
}

impl PaletteChoice {
    pub fn palette(self) -> Palette {
        match self {
            PaletteChoice::Standard => Palette::standard(),
            PaletteChoice::Extended => Palette::extended(),
            PaletteChoice::Compact => Palette::compact(),
            PaletteChoice::Blocks => Palette::blocks(),
        }
    }
}

fn positive_f32(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("{} is not a positive number", s))
    }
}

/// Live webcam video rendered as ASCII art in the terminal
///
/// Keys while running: q / Esc / Ctrl+C quit, i inverts brightness,
/// m mirrors the picture, s saves a PNG snapshot.
///
/// To try it without a camera:
///
/// ```bash
/// cargo run --bin asciicam -- --source pattern --pattern checkerboard
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Where frames come from
    #[arg(long, value_enum, default_value_t = SourceKind::Ffmpeg)]
    pub source: SourceKind,

    /// Capture device (ffmpeg input name/path, or camera index for nokhwa)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Requested camera width
    #[arg(long, default_value_t = VideoConfig::DEFAULT_CAMERA_WIDTH)]
    pub camera_width: usize,

    /// Requested camera height
    #[arg(long, default_value_t = VideoConfig::DEFAULT_CAMERA_HEIGHT)]
    pub camera_height: usize,

    /// Test pattern for `--source pattern`
    #[arg(long, value_enum, default_value_t = PatternType::Gradient)]
    pub pattern: PatternType,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Frames per second to aim for
    #[arg(long, default_value_t = VideoConfig::DEFAULT_FPS,
          value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: u32,

    /// Output width in characters (defaults to the terminal width)
    #[arg(long)]
    pub width: Option<usize>,

    /// Output height in characters (defaults to the terminal height)
    #[arg(long)]
    pub height: Option<usize>,

    /// Height multiplier compensating for tall character cells
    #[arg(short, long, default_value_t = DEFAULT_ASPECT_CORRECTION, value_parser = positive_f32)]
    pub aspect: f32,

    /// Fill the whole output area instead of keeping proportions
    #[arg(long, action = ArgAction::SetTrue)]
    pub stretch: bool,

    /// Resampling method: auto, area, bilinear or nearest
    #[arg(long, default_value = "auto")]
    pub interpolation: Interpolation,

    /// Glyph ramp
    #[arg(short, long, value_enum, default_value_t = PaletteChoice::Standard)]
    pub palette: PaletteChoice,

    /// Shortcut for `--palette extended`
    #[arg(short = 'x', long, action = ArgAction::SetTrue)]
    pub extended_palette: bool,

    /// Custom glyph ramp, lowest intensity first
    #[arg(long, conflicts_with_all = ["palette", "extended_palette"])]
    pub glyphs: Option<String>,

    /// Intensity to glyph mapping: binned or stretched
    #[arg(long, default_value = "binned")]
    pub scale: Scale,

    /// Start with inverted brightness (for light terminal backgrounds)
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub invert: bool,

    /// Start mirrored, like a selfie camera
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub mirror: bool,

    /// Show the grayscale source frames next to the ASCII output
    #[arg(long, action = ArgAction::SetTrue)]
    pub show_source_frames: bool,

    /// Contrast factor (1.0 leaves the picture unchanged)
    #[arg(long, default_value_t = 1.0, value_parser = positive_f32)]
    pub contrast: f32,

    /// Brightness offset, -1.0 to 1.0
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub brightness: f32,

    /// Equalize the histogram of every frame
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub equalize: bool,

    /// Box blur radius applied before resizing (0 disables)
    #[arg(long, default_value_t = 0)]
    pub blur: usize,

    /// Clear the normal screen with escape codes instead of using the
    /// alternate screen
    #[arg(long, action = ArgAction::SetTrue)]
    pub plain: bool,

    /// Directory for PNG snapshots
    #[arg(long, default_value = ".")]
    pub snapshot_dir: PathBuf,

    /// Log file path
    #[arg(short, long, default_value = "asciicam.log")]
    pub log_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Args {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            log_file: self.log_file.clone(),
            min_level: if self.verbose {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
        }
    }

    pub fn into_config(self) -> Result<VideoConfig, PaletteError> {
        let palette = match &self.glyphs {
            Some(glyphs) => Palette::try_from(glyphs.as_str())?,
            None if self.extended_palette => Palette::extended(),
            None => self.palette.palette(),
        };

        Ok(VideoConfig {
            source: self.source,
            device: self.device,
            camera_width: self.camera_width,
            camera_height: self.camera_height,
            pattern: self.pattern,
            max_frames: self.max_frames,
            fps: self.fps,
            ascii_width: self.width.filter(|&w| w > 0),
            ascii_height: self.height.filter(|&h| h > 0),
            aspect_correction: self.aspect,
            stretch: self.stretch,
            interpolation: self.interpolation,
            palette,
            scale: self.scale,
            invert: self.invert,
            mirror: self.mirror,
            show_source_frames: self.show_source_frames,
            contrast: self.contrast,
            brightness: self.brightness.clamp(-1.0, 1.0),
            equalize: self.equalize,
            blur_radius: self.blur,
            plain: self.plain,
            snapshot_dir: self.snapshot_dir,
        })
    }
}
