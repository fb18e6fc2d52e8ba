use crate::display::DisplaySurface;
use crate::preview::half_block_lines;
use common::{AsciiFrame, GrayFrame};
use std::io;
use std::time::{Duration, Instant};

/// Gap between the ASCII grid and the source preview
const PREVIEW_GAP: &str = " ";

/// Outputs ASCII frames to a display surface
pub struct AsciiRenderer<S: DisplaySurface> {
    surface: S,
    frames_rendered: u64,
    /// how long the latest frame took to write out
    last_render: Duration,
}

impl<S: DisplaySurface> AsciiRenderer<S> {
    pub fn new(surface: S) -> Self {
        AsciiRenderer {
            surface,
            frames_rendered: 0,
            last_render: Duration::ZERO,
        }
    }

    /// Replace the displayed frame with `frame`, optionally with the
    /// grayscale source shown to its right
    pub fn render(&mut self, frame: &AsciiFrame, preview: Option<&GrayFrame>) -> io::Result<()> {
        let start = Instant::now();

        let text = compose(frame, preview);
        self.surface.clear_and_write(&text)?;

        self.frames_rendered += 1;
        self.last_render = start.elapsed();
        Ok(())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_render(&self) -> Duration {
        self.last_render
    }
}

/// Lay out the text for one frame. Without a preview this is exactly the
/// grid's text.
pub fn compose(frame: &AsciiFrame, preview: Option<&GrayFrame>) -> String {
    let Some(preview) = preview else {
        return frame.to_text();
    };

    let side = half_block_lines(preview);
    let mut text = String::with_capacity(frame.w * frame.h * 2);

    for (y, row) in frame.rows().enumerate() {
        if y > 0 {
            text.push('\n');
        }
        text.extend(row.iter());

        if let Some(line) = side.get(y) {
            text.push_str(PREVIEW_GAP);
            text.push_str(line);
        }
    }

    text
}
