//! Two-pass GIF conversion
//!
//! Runs ffmpeg twice in sequence: `palettegen` derives a palette from the
//! filtered input, then `paletteuse` encodes the GIF through it. The output
//! size is then compared against the upload limit.
//! - Output goes to `<input dir>/output/<stem>_optimized.gif` unless another
//!   directory is configured
//! - The palette lives in a uniquely named temporary file next to the output
//!   and is removed whether the run succeeds or not
//! - Exceeding the limit is reported as a [`SizeVerdict`], not as an error

use crate::ffmpeg_args::{encode_args, palette_args, scale_filter};
use crate::profile::{FrameRate, Profile, Resolution};
use crate::status::{Pass, StatusEvent, StatusSink};
use serde::{Serialize, Serializer};
use shared_utils::logging::{log_external_tool, log_operation_end};
use shared_utils::{
    format_command, format_ffmpeg_error, get_error_suggestion, FfmpegProcess,
    FfmpegProgressParser, FileSize, GifDropError, Result, DISCORD_SIZE_LIMIT, FFMPEG,
};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tracing::{info, warn};

/// Name of the folder created next to the input when no output directory is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

const OUTPUT_SUFFIX: &str = "_optimized.gif";

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub input: PathBuf,
    pub profile: Profile,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    pub output_dir: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub size_limit: FileSize,
}

impl ConversionConfig {
    /// Profile defaults: the profile's width and frame rate, `ffmpeg` from
    /// `PATH`, and the Discord size limit.
    pub fn new(input: impl Into<PathBuf>, profile: Profile) -> Self {
        Self {
            input: input.into(),
            profile,
            resolution: profile.resolution(),
            frame_rate: profile.default_frame_rate(),
            output_dir: None,
            ffmpeg: PathBuf::from(FFMPEG),
            size_limit: DISCORD_SIZE_LIMIT,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }

    pub fn with_size_limit(mut self, limit: FileSize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Configured output directory, or `output/` beside the input.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => {
                let parent = match self.input.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p,
                    _ => Path::new("."),
                };
                parent.join(DEFAULT_OUTPUT_DIR)
            }
        }
    }

    /// `<output dir>/<input stem>_optimized.gif`
    pub fn output_path(&self) -> PathBuf {
        let mut file_name = self
            .input
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| OsString::from("output"));
        file_name.push(OUTPUT_SUFFIX);
        self.resolved_output_dir().join(file_name)
    }

    /// `Profile avatar • 320 × Auto • 20 fps (Balanced)`
    pub fn settings_label(&self) -> String {
        format!(
            "{} • {} • {}",
            self.profile,
            self.resolution.label(),
            self.frame_rate.label()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeVerdict {
    WithinLimit,
    ExceedsLimit,
}

impl SizeVerdict {
    /// Strictly larger than the limit exceeds it; exactly the limit is fine.
    pub fn of(size: FileSize, limit: FileSize) -> Self {
        if size.exceeds(limit) {
            SizeVerdict::ExceedsLimit
        } else {
            SizeVerdict::WithinLimit
        }
    }

    pub fn is_within_limit(&self) -> bool {
        matches!(self, SizeVerdict::WithinLimit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output_path: PathBuf,
    pub size: FileSize,
    pub limit: FileSize,
    pub verdict: SizeVerdict,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

pub struct GifConverter {
    config: ConversionConfig,
    output_dir: PathBuf,
    output_path: PathBuf,
}

impl GifConverter {
    /// Validates the input and creates the output directory.
    ///
    /// # Errors
    /// - [`GifDropError::InputNotFound`] if the input does not exist
    /// - [`GifDropError::InvalidInput`] if it is not a regular file
    /// - [`GifDropError::OutputDirectory`] if the output directory cannot be created
    pub fn new(config: ConversionConfig) -> Result<Self> {
        let input = &config.input;
        if !input.exists() {
            return Err(GifDropError::InputNotFound(input.clone()));
        }
        if !input.is_file() {
            return Err(GifDropError::InvalidInput {
                path: input.clone(),
                reason: "not a regular file".to_string(),
            });
        }

        let output_dir = config.resolved_output_dir();
        std::fs::create_dir_all(&output_dir).map_err(|source| GifDropError::OutputDirectory {
            path: output_dir.clone(),
            source,
        })?;

        let output_path = config.output_path();

        Ok(Self {
            config,
            output_dir,
            output_path,
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn filter(&self) -> String {
        scale_filter(self.config.resolution, self.config.frame_rate)
    }

    /// Reserves a uniquely named palette file in the output directory.
    /// Dropping or closing the returned path removes it.
    pub fn create_palette(&self) -> Result<TempPath> {
        let file = tempfile::Builder::new()
            .prefix(".palette_")
            .suffix(".png")
            .tempfile_in(&self.output_dir)?;
        Ok(file.into_temp_path())
    }

    /// Pass 1.
    pub fn generate_palette(&self, palette: &Path, sink: &dyn StatusSink) -> Result<()> {
        let args = palette_args(&self.config.input, palette, &self.filter());
        self.run_pass(Pass::Palette, &args, sink)
    }

    /// Pass 2.
    pub fn generate_gif(&self, palette: &Path, sink: &dyn StatusSink) -> Result<()> {
        let args = encode_args(&self.config.input, palette, &self.output_path, &self.filter());
        self.run_pass(Pass::Encode, &args, sink)
    }

    pub fn check_file_size(&self, sink: &dyn StatusSink) -> Result<(FileSize, SizeVerdict)> {
        let metadata = match std::fs::metadata(&self.output_path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GifDropError::OutputMissing(self.output_path.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        let size = FileSize::new(metadata.len());
        let limit = self.config.size_limit;
        let verdict = SizeVerdict::of(size, limit);
        match verdict {
            SizeVerdict::WithinLimit => info!(
                output = %self.output_path.display(),
                size = %size,
                limit = %limit,
                "Output within size limit"
            ),
            SizeVerdict::ExceedsLimit => warn!(
                output = %self.output_path.display(),
                size = %size,
                limit = %limit,
                over_by = %size.saturating_sub(limit),
                "Output exceeds size limit"
            ),
        }

        sink.emit(StatusEvent::SizeChecked {
            size,
            limit,
            verdict,
        });
        Ok((size, verdict))
    }

    /// Full run: both passes, size check, palette cleanup.
    pub fn convert(&self, sink: &dyn StatusSink) -> Result<ConversionOutcome> {
        let started = Instant::now();
        info!(
            input = %self.config.input.display(),
            output = %self.output_path.display(),
            settings = %self.config.settings_label(),
            "Starting GIF conversion"
        );
        sink.emit(StatusEvent::Started {
            input: self.config.input.clone(),
            output: self.output_path.clone(),
            settings: self.config.settings_label(),
        });

        let palette = self.create_palette()?;
        let result = self
            .generate_palette(&palette, sink)
            .and_then(|()| self.generate_gif(&palette, sink))
            .and_then(|()| self.check_file_size(sink));

        match palette.close() {
            Ok(()) => sink.emit(StatusEvent::CleanedUp),
            Err(e) if e.kind() == ErrorKind::NotFound => sink.emit(StatusEvent::CleanedUp),
            Err(e) => {
                warn!(error = %e, "Could not remove temporary palette");
                sink.emit(StatusEvent::CleanupFailed {
                    reason: e.to_string(),
                });
            }
        }

        let elapsed = started.elapsed();
        let (size, verdict) = match result {
            Ok(checked) => checked,
            Err(e) => {
                log_operation_end("gif conversion", elapsed, false);
                return Err(e);
            }
        };
        log_operation_end("gif conversion", elapsed, true);

        sink.emit(StatusEvent::Completed {
            output: self.output_path.clone(),
        });

        Ok(ConversionOutcome {
            input: self.config.input.clone(),
            output_path: self.output_path.clone(),
            size,
            limit: self.config.size_limit,
            verdict,
            elapsed,
        })
    }

    fn run_pass(&self, pass: Pass, args: &[OsString], sink: &dyn StatusSink) -> Result<()> {
        let mut cmd = Command::new(&self.config.ffmpeg);
        cmd.args(args);
        let command_line = format_command(&cmd);
        sink.emit(StatusEvent::PassStarted {
            pass,
            command: command_line.clone(),
        });

        let process = FfmpegProcess::spawn(&mut cmd)?;
        let mut parser = FfmpegProgressParser::default();
        for line in process.lines() {
            if let Some(fraction) = parser.parse_line(&line) {
                sink.emit(StatusEvent::Progress { pass, fraction });
            }
            sink.emit(StatusEvent::ToolOutput { pass, line });
        }

        let elapsed = process.elapsed();
        let (status, tail) = process.wait_with_output()?;
        log_external_tool(FFMPEG, &command_line, &tail, status.code(), elapsed);
        if !status.success() {
            return Err(GifDropError::FfmpegFailed {
                stage: pass.label().to_string(),
                exit_code: status.code(),
                message: format_ffmpeg_error(&tail),
                suggestion: get_error_suggestion(&tail),
            });
        }

        sink.emit(StatusEvent::PassFinished { pass, elapsed });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusLog;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    #[test]
    fn test_config_defaults_follow_profile() {
        let config = ConversionConfig::new("clip.mp4", Profile::Banner);
        assert_eq!(config.resolution, Resolution::Width(600));
        assert_eq!(config.frame_rate, FrameRate::COMPACT);
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.size_limit, DISCORD_SIZE_LIMIT);
        assert_eq!(
            config.settings_label(),
            "Profile banner • 600 × Auto • 15 fps (Compact)"
        );
    }

    #[test]
    fn test_resolved_output_dir() {
        let config = ConversionConfig::new("/videos/clip.mp4", Profile::Avatar);
        assert_eq!(config.resolved_output_dir(), PathBuf::from("/videos/output"));

        let bare = ConversionConfig::new("clip.mp4", Profile::Avatar);
        assert_eq!(bare.resolved_output_dir(), PathBuf::from("./output"));

        let custom = bare.with_output_dir("/tmp/gifs");
        assert_eq!(custom.resolved_output_dir(), PathBuf::from("/tmp/gifs"));
    }

    #[test]
    fn test_shared_output_dir_maps_same_stem_to_same_path() {
        let a = ConversionConfig::new("/videos/a/clip.mp4", Profile::Avatar).with_output_dir("gifs");
        let b = ConversionConfig::new("/videos/b/clip.mov", Profile::Avatar).with_output_dir("gifs");
        assert_eq!(a.output_path(), PathBuf::from("gifs/clip_optimized.gif"));
        assert_eq!(a.output_path(), b.output_path());

        let beside = ConversionConfig::new("/videos/b/clip.mov", Profile::Avatar);
        assert_eq!(
            beside.output_path(),
            PathBuf::from("/videos/b/output/clip_optimized.gif")
        );
    }

    #[test]
    fn test_size_verdict_boundary() {
        let limit = FileSize::from_mb(10);
        assert_eq!(SizeVerdict::of(limit, limit), SizeVerdict::WithinLimit);
        assert_eq!(
            SizeVerdict::of(FileSize::new(limit.bytes() + 1), limit),
            SizeVerdict::ExceedsLimit
        );
        assert!(SizeVerdict::of(FileSize::ZERO, limit).is_within_limit());
    }

    #[test]
    fn test_new_rejects_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfig::new(dir.path().join("missing.mp4"), Profile::Avatar);
        assert!(matches!(
            GifConverter::new(config),
            Err(GifDropError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_new_rejects_directory_input() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfig::new(dir.path(), Profile::Avatar);
        assert!(matches!(
            GifConverter::new(config),
            Err(GifDropError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_new_creates_output_dir_and_names_output() {
        let dir = TempDir::new().unwrap();
        let input = touch(dir.path(), "my clip.mp4");
        let converter = GifConverter::new(ConversionConfig::new(&input, Profile::Avatar)).unwrap();

        assert!(dir.path().join("output").is_dir());
        assert_eq!(
            converter.output_path(),
            dir.path().join("output").join("my clip_optimized.gif")
        );
        assert_eq!(converter.filter(), "fps=20,scale=320:-1:flags=lanczos");
    }

    #[test]
    fn test_palettes_are_unique_and_removed() {
        let dir = TempDir::new().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        let converter = GifConverter::new(ConversionConfig::new(&input, Profile::Avatar)).unwrap();

        let first = converter.create_palette().unwrap();
        let second = converter.create_palette().unwrap();
        assert_ne!(first.to_path_buf(), second.to_path_buf());
        assert!(first.starts_with(converter.output_dir()));

        let path = first.to_path_buf();
        first.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_check_file_size_without_output() {
        let dir = TempDir::new().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        let converter = GifConverter::new(ConversionConfig::new(&input, Profile::Avatar)).unwrap();
        let log = StatusLog::new();

        assert!(matches!(
            converter.check_file_size(&log),
            Err(GifDropError::OutputMissing(_))
        ));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_check_file_size_reports_verdict() {
        let dir = TempDir::new().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        let config = ConversionConfig::new(&input, Profile::Avatar)
            .with_size_limit(FileSize::new(100));
        let converter = GifConverter::new(config).unwrap();
        std::fs::write(converter.output_path(), vec![0u8; 101]).unwrap();

        let log = StatusLog::new();
        let (size, verdict) = converter.check_file_size(&log).unwrap();
        assert_eq!(size.bytes(), 101);
        assert_eq!(verdict, SizeVerdict::ExceedsLimit);
        assert!(log.text().contains("exceeds Discord limit"));
    }

    #[test]
    fn test_missing_ffmpeg_is_tool_not_found() {
        let dir = TempDir::new().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        let config = ConversionConfig::new(&input, Profile::Avatar)
            .with_ffmpeg("definitely-not-a-real-ffmpeg-binary-12345");
        let converter = GifConverter::new(config).unwrap();
        let log = StatusLog::new();

        let err = converter.convert(&log).unwrap_err();
        assert!(err.is_tool_missing());
        assert!(log.events().contains(&StatusEvent::CleanedUp));

        let leftovers: Vec<_> = std::fs::read_dir(converter.output_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_outcome_serializes_elapsed_as_seconds() {
        let outcome = ConversionOutcome {
            input: PathBuf::from("clip.mp4"),
            output_path: PathBuf::from("output/clip_optimized.gif"),
            size: FileSize::new(2048),
            limit: DISCORD_SIZE_LIMIT,
            verdict: SizeVerdict::WithinLimit,
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["verdict"], "within_limit");
        assert_eq!(json["size"], 2048);
        assert_eq!(json["elapsed_secs"], 1.5);
    }
}
