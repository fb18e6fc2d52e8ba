use common::{CaptureError, GrayFrame};

/// Anything that can hand the capture loop grayscale frames.
///
/// Opening yields a handle that owns the live stream; `close` consumes it so
/// a stream is released exactly once.
pub trait FrameSource {
    type Handle;

    /// Fails with `CaptureError::DeviceUnavailable` when nothing can be opened
    fn open(&mut self) -> Result<Self::Handle, CaptureError>;

    /// Fails with `CaptureError::EndOfStream` once no more frames will come
    fn read(&mut self, handle: &mut Self::Handle) -> Result<GrayFrame, CaptureError>;

    fn close(&mut self, handle: Self::Handle);
}
