//! Shared pieces of the ASCII video pipeline: frames, palettes, resizing,
//! output grids, enhancement filters, PNG export and logging.

pub mod ascii_frame;
pub mod enhance;
pub mod error;
pub mod export;
pub mod gray_frame;
pub mod logger;
pub mod palette;
pub mod resize;

pub use ascii_frame::AsciiFrame;
pub use error::{CaptureError, InvalidDimensions, PaletteError};
pub use gray_frame::GrayFrame;
pub use palette::{Palette, QuantizeOptions, Quantizer, Scale};
pub use resize::{Interpolation, OutputSize};
