use common::CaptureError;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info};

/// What to ask `ffmpeg` for when opening the camera
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegOptions {
    /// Capture device; `None` picks the platform's first camera
    pub device: Option<String>,
    /// Requested image width
    pub w: usize,
    /// Requested image height
    pub h: usize,
    pub fps: u32,
}

impl Default for FfmpegOptions {
    fn default() -> Self {
        Self {
            device: None,
            w: 640,
            h: 480,
            fps: 30,
        }
    }
}

/// Determines if `ffmpeg` has been installed and spawns a daemon that feeds
/// raw `rgb24` frames to the program through its stdout
pub fn spawn(opts: &FfmpegOptions) -> Result<Child, CaptureError> {
    match Command::new("ffmpeg").arg("-version").output() {
        Ok(output) => {
            info!(
                "ffmpeg found: {}",
                String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or_default()
            )
        }
        Err(e) => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "ffmpeg not found or not accessible: {}",
                e
            )));
        }
    }

    let args = capture_args(opts, std::env::consts::OS)?;
    debug!(?args, "spawning ffmpeg");

    let mut cmd = Command::new("ffmpeg");
    cmd.args(&args);

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            CaptureError::DeviceUnavailable(format!("failed to spawn ffmpeg process: {}", e))
        })
}

/// Structures the `ffmpeg` CLI for the given OS (`std::env::consts::OS`
/// naming): low-latency demuxer flags, platform input, raw RGB output on stdout
pub fn capture_args(opts: &FfmpegOptions, os: &str) -> Result<Vec<String>, CaptureError> {
    let video_size = format!("{}x{}", opts.w, opts.h);
    let framerate = opts.fps.to_string();

    let (demuxer, device): (Vec<String>, String) = match os {
        "macos" => (
            vec![
                "-f".into(),
                "avfoundation".into(),
                "-framerate".into(),
                framerate,
                "-video_size".into(),
                video_size,
                "-pixel_format".into(),
                "rgb24".into(),
            ],
            opts.device.clone().unwrap_or_else(|| "0:none".to_string()),
        ),
        "linux" => (
            vec![
                "-f".into(),
                "v4l2".into(),
                "-framerate".into(),
                framerate,
                "-video_size".into(),
                video_size,
            ],
            opts.device.clone().unwrap_or_else(|| "/dev/video0".to_string()),
        ),
        "windows" => (
            vec![
                "-f".into(),
                "dshow".into(),
                "-framerate".into(),
                framerate,
                "-video_size".into(),
                video_size,
                "-vcodec".into(),
                "mjpeg".into(),
            ],
            opts.device
                .clone()
                .unwrap_or_else(|| "video=USB2.0 HD UVC WebCam".to_string()),
        ),
        other => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "camera capture through ffmpeg is not supported on '{}'",
                other
            )));
        }
    };

    // input options only take effect before the `-i` they belong to
    let latency = [
        "-probesize",
        "32",
        "-analyzeduration",
        "0",
        "-fflags",
        "nobuffer",
        "-flags",
        "low_delay",
    ];

    // scale whatever the camera delivered to the size we read
    let scale = format!("scale={}:{}", opts.w, opts.h);
    let output = [
        "-vf",
        scale.as_str(),
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        // pipe to stdout
        "pipe:1",
    ];

    let mut args: Vec<String> = vec!["-loglevel".into(), "error".into()];
    args.extend(latency.iter().map(|s| s.to_string()));
    args.extend(demuxer);
    args.push("-i".into());
    args.push(device);
    args.extend(output.iter().map(|s| s.to_string()));

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_reads_v4l2_and_writes_raw_rgb() {
        let args = capture_args(&FfmpegOptions::default(), "linux").unwrap();
        let joined = args.join(" ");

        assert!(joined.contains("-f v4l2 -framerate 30"));
        assert!(joined.contains("-video_size 640x480"));
        assert!(joined.contains("-i /dev/video0"));
        assert!(joined.contains("-pix_fmt rgb24"));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn device_override_is_used() {
        let opts = FfmpegOptions {
            device: Some("/dev/video2".into()),
            w: 320,
            h: 240,
            fps: 15,
        };
        let joined = capture_args(&opts, "linux").unwrap().join(" ");

        assert!(joined.contains("-i /dev/video2"));
        assert!(joined.contains("-framerate 15"));
        assert!(joined.contains("scale=320:240"));
    }

    #[test]
    fn unknown_os_is_unavailable() {
        let result = capture_args(&FfmpegOptions::default(), "plan9");
        assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
    }

    #[test]
    fn latency_flags_precede_the_input() {
        for os in ["linux", "macos", "windows"] {
            let args = capture_args(&FfmpegOptions::default(), os).unwrap();
            let at = |flag: &str| args.iter().position(|a| a == flag).unwrap();

            let input = at("-i");
            for flag in ["-probesize", "-analyzeduration", "-fflags", "-f"] {
                assert!(at(flag) < input, "{os}: {flag} after -i");
            }
            assert!(at("-vf") > input, "{os}");
            assert!(at("-pix_fmt") > input, "{os}");
        }
    }
}
