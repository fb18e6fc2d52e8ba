pub mod ascii_converter;
pub mod ascii_renderer;
pub mod camera;
pub mod cli;
pub mod controls;
pub mod display;
pub mod ffmpeg;
pub mod frame_source;
pub mod image_frame;
pub mod mock_frame_generator;
pub mod pipeline;
pub mod preview;
pub mod video_config;
