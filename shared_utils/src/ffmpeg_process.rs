//! FFmpeg process management
//!
//! ffmpeg writes everything interesting (stream info, progress, errors) to
//! stderr, and rewrites its status line with carriage returns instead of
//! newlines. [`FfmpegProcess`] drains stderr on a dedicated thread, splits it
//! on both `\r` and `\n`, and hands every line to the caller over a channel.
//! The pipe is always drained, so a chatty ffmpeg can never block on a full
//! stderr buffer.
//!
//! ```ignore
//! use shared_utils::ffmpeg_process::FfmpegProcess;
//! use std::process::Command;
//!
//! let mut cmd = Command::new("ffmpeg");
//! cmd.args(["-i", "input.mp4", "-vf", "palettegen", "-y", "palette.png"]);
//!
//! let process = FfmpegProcess::spawn(&mut cmd)?;
//! for line in process.lines() {
//!     println!("{}", line);
//! }
//! let (status, tail) = process.wait_with_output()?;
//! ```

use crate::errors::{GifDropError, Result};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Lines of stderr kept for error reporting after the process exits.
pub const MAX_TAIL_LINES: usize = 64;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ═══════════════════════════════════════════════════════════════
// FfmpegProcess
// ═══════════════════════════════════════════════════════════════

pub struct FfmpegProcess {
    child: Child,
    lines: Receiver<String>,
    reader_thread: Option<JoinHandle<String>>,
    started: Instant,
}

impl FfmpegProcess {
    /// Starts the configured command with stderr captured.
    ///
    /// # Errors
    /// - [`GifDropError::ToolNotFound`] when the program does not exist
    /// - [`GifDropError::Spawn`] for any other spawn failure
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        let command_line = format_command(cmd);
        let tool = cmd.get_program().to_string_lossy().into_owned();
        info!(command = %command_line, "Executing FFmpeg command");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => GifDropError::ToolNotFound { tool: tool.clone() },
            _ => GifDropError::Spawn {
                tool: tool.clone(),
                source: e,
            },
        })?;

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                return Err(abandon(
                    &mut child,
                    tool,
                    std::io::Error::other("failed to capture stderr"),
                ));
            }
        };

        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("ffmpeg-stderr".to_string())
            .spawn(move || {
                let mut tail: VecDeque<String> = VecDeque::with_capacity(MAX_TAIL_LINES);
                read_output_lines(stderr, |line| {
                    if tail.len() == MAX_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());
                    // Receiver may be gone if the caller stopped listening.
                    let _ = tx.send(line);
                });
                tail.into_iter().collect::<Vec<_>>().join("\n")
            });
        let reader_thread = match spawned {
            Ok(handle) => handle,
            Err(e) => return Err(abandon(&mut child, tool, e)),
        };

        Ok(Self {
            child,
            lines: rx,
            reader_thread: Some(reader_thread),
            started: Instant::now(),
        })
    }

    /// Output lines as they arrive; ends when ffmpeg closes stderr.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.lines.iter()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Waits for exit and returns the status with the captured stderr tail.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String)> {
        let status = self.child.wait()?;
        let tail = self
            .reader_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        if status.success() {
            info!(
                exit_code = status.code(),
                duration_secs = self.started.elapsed().as_secs_f64(),
                "FFmpeg process completed successfully"
            );
            debug!(stderr_output = %tail, "FFmpeg stderr output");
        } else {
            error!(
                exit_code = status.code(),
                stderr_output = %tail,
                "FFmpeg process failed"
            );
        }

        Ok((status, tail))
    }
}

/// Stops and reaps a child whose stderr nobody will drain.
fn abandon(child: &mut Child, tool: String, source: std::io::Error) -> GifDropError {
    let _ = child.kill();
    let _ = child.wait();
    GifDropError::Spawn { tool, source }
}

/// Renders a command the way a user would type it.
pub fn format_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| {
            let part = part.to_string_lossy();
            if part.is_empty() || part.contains(char::is_whitespace) {
                format!("\"{}\"", part)
            } else {
                part.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a byte stream on `\r` and `\n`, calling `on_line` for every
/// non-blank line. Invalid UTF-8 is replaced lossily.
pub fn read_output_lines<R: Read>(mut reader: R, mut on_line: impl FnMut(String)) {
    let mut buf = [0u8; 8192];
    let mut pending: Vec<u8> = Vec::new();

    fn flush(pending: &mut Vec<u8>, on_line: &mut dyn FnMut(String)) {
        if !pending.is_empty() {
            let line = String::from_utf8_lossy(pending).trim_end().to_string();
            pending.clear();
            if !line.trim().is_empty() {
                on_line(line);
            }
        }
    }

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        };
        for &byte in &buf[..n] {
            if byte == b'\n' || byte == b'\r' {
                flush(&mut pending, &mut on_line);
            } else {
                pending.push(byte);
            }
        }
    }
    flush(&mut pending, &mut on_line);
}

// ═══════════════════════════════════════════════════════════════
// FfmpegProgressParser
// ═══════════════════════════════════════════════════════════════

/// Tracks ffmpeg's stderr to estimate how far a run has got.
///
/// The total duration comes from the first `Duration: HH:MM:SS.ss` header
/// (later inputs, such as the palette image, are ignored). Status lines look
/// like `frame=  123 fps= 45 q=-0.0 size=  1024kB time=00:00:04.00 speed=1.5x`,
/// with values padded after `=`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProgressParser {
    total_duration: Option<f64>,
    current_time: f64,
}

impl FfmpegProgressParser {
    /// Feeds one line. Returns the progress fraction (0.0 - 1.0) when the
    /// line is a status line and a total is known.
    pub fn parse_line(&mut self, line: &str) -> Option<f64> {
        let trimmed = line.trim();

        if self.total_duration.is_none() {
            if let Some(rest) = trimmed.strip_prefix("Duration:") {
                if let Some(value) = rest.split(',').next() {
                    self.total_duration = Self::parse_time(value.trim());
                }
                return None;
            }
        }

        if !is_progress_line(trimmed) {
            return None;
        }

        let mut normalized = trimmed.to_string();
        while normalized.contains("= ") {
            normalized = normalized.replace("= ", "=");
        }

        for token in normalized.split_whitespace() {
            if let Some(time) = token.strip_prefix("time=").and_then(Self::parse_time) {
                self.current_time = time;
            }
        }

        self.calculate_progress()
    }

    /// Parses `HH:MM:SS.ms`.
    fn parse_time(time_str: &str) -> Option<f64> {
        let parts: Vec<&str> = time_str.split(':').collect();
        if parts.len() != 3 {
            return None;
        }

        let hours: f64 = parts[0].parse().ok()?;
        let minutes: f64 = parts[1].parse().ok()?;
        let seconds: f64 = parts[2].parse().ok()?;

        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    }

    fn calculate_progress(&self) -> Option<f64> {
        match self.total_duration {
            Some(total) if total > 0.0 && self.current_time > 0.0 => {
                Some((self.current_time / total).min(1.0))
            }
            _ => None,
        }
    }
}

/// True for ffmpeg's periodic `frame=... time=...` status lines.
pub fn is_progress_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("frame=") || (line.starts_with("size=") && line.contains("time="))
}

// ═══════════════════════════════════════════════════════════════
// Error extraction
// ═══════════════════════════════════════════════════════════════

/// Picks the most meaningful line out of ffmpeg's stderr.
///
/// 1. The last line mentioning "Error"/"error"
/// 2. Otherwise the last non-blank, non-progress line
/// 3. Otherwise "Unknown FFmpeg error"
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

pub fn get_error_suggestion(stderr: &str) -> Option<String> {
    let patterns = [
        ("No such file or directory", "Check that the input file path is correct"),
        (
            "Invalid data found",
            "The input file may be corrupted or is not a video",
        ),
        (
            "moov atom not found",
            "The MP4 file is incomplete; re-export it from your editor",
        ),
        ("Permission denied", "Check read/write permissions on the input and output folder"),
        ("No space left on device", "Free up disk space and try again"),
        (
            "does not contain any stream",
            "The input has no video stream to convert",
        ),
        ("Output file is empty", "Encoding produced nothing; try a lower FPS or width"),
    ];

    patterns
        .iter()
        .find(|(pattern, _)| stderr.contains(pattern))
        .map(|(_, suggestion)| suggestion.to_string())
}
