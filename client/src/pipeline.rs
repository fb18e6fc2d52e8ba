//! The capture loop: poll controls, read a frame, convert, render, pace.

use crate::ascii_converter::AsciiConverter;
use crate::ascii_renderer::AsciiRenderer;
use crate::controls::{ControlSource, Controls};
use crate::display::DisplaySurface;
use crate::frame_source::FrameSource;
use crate::video_config::VideoConfig;
use common::export::{self, CellSize};
use common::{AsciiFrame, CaptureError};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Toggles and counters carried from one iteration to the next
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopState {
    pub invert: bool,
    pub mirror: bool,
    /// frames rendered so far
    pub frames: u64,
    /// snapshots written so far
    pub snapshots: u32,
}

impl LoopState {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            invert: config.invert,
            mirror: config.mirror,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, controls: &Controls) {
        if controls.toggle_invert {
            self.invert = !self.invert;
            debug!(invert = self.invert, "toggled inversion");
        }
        if controls.toggle_mirror {
            self.mirror = !self.mirror;
            debug!(mirror = self.mirror, "toggled mirroring");
        }
    }
}

/// Why the loop ended without an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// stop key, Esc or Ctrl+C
    Quit,
    /// the source ran out of frames or the frame limit was reached
    EndOfStream,
}

/// Open `source`, run the capture loop until stopped, and close the source.
///
/// The source is closed exactly once whenever `open` succeeded, whatever the
/// loop returns.
pub fn run<S, D, C>(
    source: &mut S,
    renderer: &mut AsciiRenderer<D>,
    controls: &mut C,
    converter: &AsciiConverter,
    config: &VideoConfig,
) -> Result<ExitReason, CaptureError>
where
    S: FrameSource,
    D: DisplaySurface,
    C: ControlSource + ?Sized,
{
    let mut handle = source.open()?;
    info!("video source opened");

    let result = capture_loop(source, &mut handle, renderer, controls, converter, config);

    source.close(handle);
    info!(frames = renderer.frames_rendered(), "video source closed");

    result
}

fn capture_loop<S, D, C>(
    source: &mut S,
    handle: &mut S::Handle,
    renderer: &mut AsciiRenderer<D>,
    controls: &mut C,
    converter: &AsciiConverter,
    config: &VideoConfig,
) -> Result<ExitReason, CaptureError>
where
    S: FrameSource,
    D: DisplaySurface,
    C: ControlSource + ?Sized,
{
    let frame_delay = config.frame_delay();
    let mut state = LoopState::new(config);
    let mut grid = AsciiFrame::default();

    loop {
        let start = Instant::now();

        let input = controls.poll()?;
        if input.is_stop_requested() {
            info!(frames = state.frames, "stop requested");
            return Ok(ExitReason::Quit);
        }
        state.apply(&input);

        if config
            .max_frames
            .is_some_and(|max| state.frames >= max as u64)
        {
            info!(frames = state.frames, "frame limit reached");
            return Ok(ExitReason::EndOfStream);
        }

        let frame = match source.read(handle) {
            Ok(frame) => frame,
            Err(CaptureError::EndOfStream) => {
                info!(frames = state.frames, "end of stream");
                return Ok(ExitReason::EndOfStream);
            }
            // a source that fails after opening is treated as gone
            Err(e) => {
                warn!(frames = state.frames, "frame source failed: {}", e);
                return Ok(ExitReason::EndOfStream);
            }
        };

        let size = converter.target_size(renderer.surface().size(), frame.w, frame.h);
        let resized = converter.convert(&frame, size, &state, &mut grid);
        let preview = config.show_source_frames.then_some(&resized);

        match renderer.render(&grid, preview) {
            Ok(()) => state.frames += 1,
            // output closed underneath us, e.g. `asciicam --plain | head`
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                info!(frames = state.frames, "output closed");
                return Ok(ExitReason::Quit);
            }
            Err(e) => return Err(e.into()),
        }

        if input.snapshot {
            snapshot(&grid, converter, &config.snapshot_dir, &mut state);
        }

        if let Some(remaining) = frame_delay.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

/// `asciicam-<local time>-<n>.png` inside `dir`
pub fn snapshot_path(dir: &Path, seq: u32) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("asciicam-{}-{}.png", stamp, seq))
}

/// Export the current grid; failures are logged, never fatal
fn snapshot(frame: &AsciiFrame, converter: &AsciiConverter, dir: &Path, state: &mut LoopState) {
    let path = snapshot_path(dir, state.snapshots);
    let palette = converter.quantizer().palette();

    match export::save_png(frame, palette, CellSize::default(), &path) {
        Ok(()) => {
            state.snapshots += 1;
            info!(path = %path.display(), "snapshot saved");
        }
        Err(e) => warn!(path = %path.display(), "snapshot failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_state() {
        let mut state = LoopState::new(&VideoConfig {
            invert: true,
            ..Default::default()
        });

        state.apply(&Controls {
            toggle_invert: true,
            toggle_mirror: true,
            ..Default::default()
        });
        assert!(!state.invert);
        assert!(state.mirror);

        state.apply(&Controls::default());
        assert!(!state.invert);
        assert!(state.mirror);
    }

    #[test]
    fn snapshot_names_are_numbered_pngs() {
        let path = snapshot_path(Path::new("shots"), 3);
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(path.starts_with("shots"));
        assert!(name.starts_with("asciicam-"));
        assert!(name.ends_with("-3.png"));
    }
}
