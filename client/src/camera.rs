use crate::ffmpeg::{self, FfmpegOptions};
use crate::frame_source::FrameSource;
use crate::image_frame::{ImageFrame, RGB_BYTES_PER_PIXEL};
use common::{CaptureError, GrayFrame};
use std::io::{self, BufReader, Read};
use std::process::{Child, ChildStdout};
use tracing::{info, warn};

pub struct Camera {
    /// Requested image width
    w: usize,
    /// Requested image height
    h: usize,
    /// FFmpeg child process, this component actually feeds the images
    /// to the program
    ffmpeg_proc: Child,
    /// Reader, reads output frames from the FFmpeg child process
    frame_reader: BufReader<ChildStdout>,
    /// Most recent frame read from the pipe
    frame: ImageFrame,
    /// `frame` holds the probe frame read while opening and has not been
    /// handed out yet
    primed: bool,
}

impl Camera {
    /// Start ffmpeg and wait for its first frame.
    ///
    /// ffmpeg exits right away when the device cannot be opened, so an empty
    /// pipe at this point means the camera is unavailable.
    pub fn open(opts: &FfmpegOptions) -> Result<Self, CaptureError> {
        let (w, h) = (opts.w, opts.h);
        if w == 0 || h == 0 {
            return Err(CaptureError::DeviceUnavailable(format!(
                "capture dimensions must be greater than zero (got {}x{})",
                w, h
            )));
        }

        let mut ffmpeg_proc = ffmpeg::spawn(opts)?;

        let stdout = match ffmpeg_proc.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = ffmpeg_proc.kill();
                return Err(CaptureError::DeviceUnavailable(
                    "failed to get ffmpeg stdout".into(),
                ));
            }
        };

        let buffer_size = w * h * RGB_BYTES_PER_PIXEL;

        let mut camera = Camera {
            w,
            h,
            ffmpeg_proc,
            frame_reader: BufReader::with_capacity(buffer_size, stdout),
            frame: ImageFrame::new(w, h, RGB_BYTES_PER_PIXEL)?,
            primed: false,
        };

        if let Err(e) = camera.fill_frame() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "camera produced no frames: {}",
                e
            )));
        }
        camera.primed = true;

        info!(w, h, "camera stream opened");
        Ok(camera)
    }

    fn fill_frame(&mut self) -> io::Result<()> {
        self.frame_reader.read_exact(self.frame.buffer_mut())
    }

    /// Reads the next frame provided by the camera
    pub fn capture_frame(&mut self) -> Result<&ImageFrame, CaptureError> {
        if self.primed {
            self.primed = false;
            return Ok(&self.frame);
        }

        match self.fill_frame() {
            Ok(()) => Ok(&self.frame),
            Err(e) => Err(stream_lost(e)),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }
}

/// Any failure reading the pipe mid-stream means ffmpeg is gone
fn stream_lost(e: io::Error) -> CaptureError {
    // a clean EOF is ffmpeg closing its end of the pipe
    if e.kind() != io::ErrorKind::UnexpectedEof {
        warn!("ffmpeg stopped delivering frames: {}", e);
    }
    CaptureError::EndOfStream
}

impl Drop for Camera {
    fn drop(&mut self) {
        // kill ffmpeg when Camera is dropped
        if let Err(e) = self.ffmpeg_proc.kill() {
            warn!("failed to kill ffmpeg: {}", e);
        }
        let _ = self.ffmpeg_proc.wait();
    }
}

/// Webcam frames piped through an `ffmpeg` child process
pub struct FfmpegSource {
    opts: FfmpegOptions,
}

impl FfmpegSource {
    pub fn new(opts: FfmpegOptions) -> Self {
        Self { opts }
    }
}

impl FrameSource for FfmpegSource {
    type Handle = Camera;

    fn open(&mut self) -> Result<Camera, CaptureError> {
        Camera::open(&self.opts)
    }

    fn read(&mut self, camera: &mut Camera) -> Result<GrayFrame, CaptureError> {
        Ok(camera.capture_frame()?.to_gray()?)
    }

    fn close(&mut self, camera: Camera) {
        let (w, h) = camera.dimensions();
        drop(camera);
        info!(w, h, "camera stream closed");
    }
}

#[cfg(feature = "nokhwa")]
pub use native::NokhwaSource;

#[cfg(feature = "nokhwa")]
mod native {
    use crate::frame_source::FrameSource;
    use crate::image_frame::ImageFrame;
    use common::{CaptureError, GrayFrame};
    use nokhwa::Camera;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
    use std::io;
    use tracing::{info, warn};

    /// Camera opened through the platform's native capture API
    pub struct NokhwaSource {
        index: u32,
    }

    impl NokhwaSource {
        pub fn new(index: u32) -> Self {
            Self { index }
        }
    }

    impl FrameSource for NokhwaSource {
        type Handle = Camera;

        fn open(&mut self) -> Result<Camera, CaptureError> {
            let index = CameraIndex::Index(self.index);
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

            let mut camera = Camera::new(index, requested)
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
            camera
                .open_stream()
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

            info!(index = self.index, "native camera stream opened");
            Ok(camera)
        }

        fn read(&mut self, camera: &mut Camera) -> Result<GrayFrame, CaptureError> {
            let frame = camera.frame().map_err(|e| {
                warn!("camera stopped delivering frames: {}", e);
                CaptureError::EndOfStream
            })?;
            let rgb = frame
                .decode_image::<RgbFormat>()
                .map_err(|e| CaptureError::Io(io::Error::other(e.to_string())))?;

            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            Ok(ImageFrame::from_rgb(w, h, rgb.into_raw())?.to_gray()?)
        }

        fn close(&mut self, mut camera: Camera) {
            if let Err(e) = camera.stop_stream() {
                warn!("failed to stop camera stream: {}", e);
            }
        }
    }
}
