//! External tool detection

use crate::errors::{GifDropError, Result};
use crate::logging::log_external_tool;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

pub const FFMPEG: &str = "ffmpeg";

pub const FFMPEG_DOWNLOAD_URL: &str = "https://ffmpeg.org/download.html";

pub fn is_tool_available<S: AsRef<OsStr>>(program: S) -> bool {
    which::which(program).is_ok()
}

/// Resolves a bare name through `PATH`, or checks an explicit path is executable.
pub fn locate_tool<S: AsRef<OsStr>>(program: S) -> Result<PathBuf> {
    let program = program.as_ref();
    which::which(program).map_err(|_| GifDropError::ToolNotFound {
        tool: program.to_string_lossy().into_owned(),
    })
}

/// First line of `<program> -version`, e.g. `ffmpeg version 6.1.1 Copyright ...`.
pub fn tool_version<S: AsRef<OsStr>>(program: S) -> Option<String> {
    let program = program.as_ref();
    let start = Instant::now();
    let output = Command::new(program).arg("-version").output().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    log_external_tool(
        &program.to_string_lossy(),
        &format!("{} -version", program.to_string_lossy()),
        &stdout,
        output.status.code(),
        start.elapsed(),
    );

    if !output.status.success() {
        return None;
    }
    stdout
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}
