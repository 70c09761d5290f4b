use crate::tools::FFMPEG_DOWNLOAD_URL;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifDropError {
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed{}: {message}", .exit_code.map(|c| format!(" (exit code {})", c)).unwrap_or_default())]
    FfmpegFailed {
        stage: String,
        exit_code: Option<i32>,
        message: String,
        suggestion: Option<String>,
    },

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file was not produced: {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("Output {} was already written by an earlier input in this run", .0.display())]
    DuplicateOutput(PathBuf),

    #[error("A conversion is already in progress")]
    Busy,

    #[error("Conversion worker panicked")]
    WorkerPanicked,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GifDropError {
    /// Multi-line message for the status log, with a hint where one exists.
    pub fn user_message(&self) -> String {
        match self {
            GifDropError::ToolNotFound { tool } => format!(
                "❌ {} not found in PATH\n💡 Please install FFmpeg and add it to your system PATH.\n   Download: {}",
                tool, FFMPEG_DOWNLOAD_URL
            ),
            GifDropError::FfmpegFailed { suggestion, .. } => {
                let mut msg = format!("❌ Error: {}", self);
                if let Some(hint) = suggestion {
                    msg.push_str(&format!("\n💡 Suggestion: {}", hint));
                }
                msg
            }
            GifDropError::DuplicateOutput(_) => format!(
                "❌ Error: {}\n💡 Suggestion: Rename one of the inputs or drop --output-dir to keep results beside each input.",
                self
            ),
            GifDropError::Busy => {
                "⏳ Please wait for the current conversion to finish.".to_string()
            }
            other => format!("❌ Error: {}", other),
        }
    }

    pub fn is_tool_missing(&self) -> bool {
        matches!(self, GifDropError::ToolNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, GifDropError>;
