use asciicam::ascii_converter::AsciiConverter;
use asciicam::ascii_renderer::AsciiRenderer;
use asciicam::camera::FfmpegSource;
use asciicam::cli::Args;
use asciicam::controls::{
    ControlSource, InterruptControls, KeyboardControls, ScriptedControls, termination_flag,
};
use asciicam::display::{AnsiSurface, DisplaySurface, TerminalSurface};
use asciicam::frame_source::FrameSource;
use asciicam::mock_frame_generator::MockFrameGenerator;
use asciicam::pipeline::{self, ExitReason};
use asciicam::video_config::{SourceKind, VideoConfig};
use clap::Parser;
use common::{CaptureError, logger};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// The frame source could not be opened, or the terminal could not be driven
const EXIT_FAILURE: u8 = 1;
/// Rejected command line
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logger::init(&args.logger_config()) {
        eprintln!("logging disabled: {}", e);
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    info!(source = ?config.source, palette = config.palette.len(), "starting");

    let outcome = start(&config);
    match &outcome {
        Ok(reason) => info!(?reason, "exiting"),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
        }
    }

    ExitCode::from(exit_status(&outcome))
}

/// Process exit status for the outcome of a run
fn exit_status(outcome: &Result<ExitReason, CaptureError>) -> u8 {
    match outcome {
        Ok(_) | Err(CaptureError::EndOfStream) => 0,
        Err(CaptureError::DeviceUnavailable(_))
        | Err(CaptureError::Dimensions(_))
        | Err(CaptureError::Io(_)) => EXIT_FAILURE,
    }
}

fn start(config: &VideoConfig) -> Result<ExitReason, CaptureError> {
    match config.source {
        SourceKind::Ffmpeg => stream(FfmpegSource::new(config.ffmpeg_options()), config),
        SourceKind::Pattern => {
            let source = MockFrameGenerator::new(
                config.camera_width,
                config.camera_height,
                config.pattern,
                config.max_frames,
            )
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
            stream(source, config)
        }
        SourceKind::Nokhwa => stream_native(config),
    }
}

#[cfg(feature = "nokhwa")]
fn stream_native(config: &VideoConfig) -> Result<ExitReason, CaptureError> {
    use asciicam::camera::NokhwaSource;

    let index = match config.device.as_deref() {
        None => 0,
        Some(device) => device.parse::<u32>().map_err(|_| {
            CaptureError::DeviceUnavailable(format!("'{}' is not a camera index", device))
        })?,
    };

    stream(NokhwaSource::new(index), config)
}

#[cfg(not(feature = "nokhwa"))]
fn stream_native(_config: &VideoConfig) -> Result<ExitReason, CaptureError> {
    Err(CaptureError::DeviceUnavailable(
        "native capture needs the `nokhwa` feature; try --source ffmpeg".to_string(),
    ))
}

fn stream<S: FrameSource>(mut source: S, config: &VideoConfig) -> Result<ExitReason, CaptureError> {
    let converter = AsciiConverter::new(config);

    let surface: Box<dyn DisplaySurface> = if config.plain {
        Box::new(AnsiSurface::stdout())
    } else {
        Box::new(TerminalSurface::enter()?)
    };

    let keys: Box<dyn ControlSource> = if io::stdin().is_terminal() {
        Box::new(KeyboardControls::new()?)
    } else {
        Box::new(ScriptedControls::default())
    };
    // SIGINT or SIGTERM ends the loop like the quit key
    let interrupted = termination_flag().unwrap_or_else(|e| {
        warn!("signals keep their default action: {}", e);
        Default::default()
    });
    let mut controls = InterruptControls::new(keys, interrupted);

    let mut renderer = AsciiRenderer::new(surface);
    let result = pipeline::run(&mut source, &mut renderer, &mut controls, &converter, config);

    // restore the terminal before anything else is printed
    drop(controls);
    drop(renderer);
    if config.plain {
        println!();
    }

    result
}
