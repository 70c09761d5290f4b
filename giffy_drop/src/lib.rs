//! giffy-drop - Two-pass palette GIF conversion for Discord uploads
//!
//! Drives ffmpeg through palette generation and palette-based encoding, then
//! checks the result against the 10 MB upload limit:
//! - Avatar profile: 320 px wide, 20 fps by default
//! - Banner profile: 600 px wide, 15 fps by default
//!
//! ## Blocking
//! ```rust,ignore
//! use giffy_drop::{ConversionConfig, GifConverter, Profile, StatusLog};
//!
//! let converter = GifConverter::new(ConversionConfig::new("clip.mp4", Profile::Avatar))?;
//! let log = StatusLog::new();
//! let outcome = converter.convert(&log)?;
//! println!("{}\n{}", log.text(), outcome.size);
//! ```
//!
//! ## Background worker
//! ```rust,ignore
//! let handle = ConversionWorker::new().start(config)?;
//! for event in &handle.events {
//!     if let Some(text) = event.render() {
//!         println!("{}", text);
//!     }
//! }
//! let outcome = handle.wait()?;
//! ```

pub mod conversion_api;
pub mod ffmpeg_args;
pub mod profile;
pub mod status;
pub mod worker;

pub use conversion_api::{
    ConversionConfig, ConversionOutcome, GifConverter, SizeVerdict, DEFAULT_OUTPUT_DIR,
};
pub use ffmpeg_args::{encode_args, palette_args, scale_filter};
pub use profile::{FrameRate, Profile, Resolution, MAX_FPS};
pub use status::{Pass, Severity, StatusEvent, StatusLog, StatusSink};
pub use worker::{ConversionHandle, ConversionWorker};

pub use shared_utils::errors::{GifDropError, Result};
pub use shared_utils::types::{FileSize, DISCORD_SIZE_LIMIT};
