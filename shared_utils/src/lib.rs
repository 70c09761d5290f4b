//! Shared Utilities for the giffy_drop tools
//!
//! - FFmpeg process wrapper (stderr streaming, progress parsing, error extraction)
//! - Error type shared by library and CLI
//! - Logging (rolling log file + optional console)
//! - External tool detection
//! - Type-safe file sizes and the upload size limit
//! - Progress bars, colours and batch summaries for the terminal front end

pub mod batch;
pub mod colors;
pub mod errors;
pub mod ffmpeg_process;
pub mod logging;
pub mod progress;
pub mod report;
pub mod tools;
pub mod types;

pub use batch::{collect_files, expand_inputs, BatchResult, VIDEO_EXTENSIONS};
pub use errors::{GifDropError, Result};
pub use ffmpeg_process::{
    format_command, format_ffmpeg_error, get_error_suggestion, is_progress_line, FfmpegProcess,
    FfmpegProgressParser,
};
pub use progress::{create_pass_bar, create_spinner, format_bytes, format_duration};
pub use report::print_summary_report;
pub use tools::{is_tool_available, locate_tool, tool_version, FFMPEG, FFMPEG_DOWNLOAD_URL};
pub use types::{FileSize, DISCORD_SIZE_LIMIT};
