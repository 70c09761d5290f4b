//! Resolution profiles and frame rates

use serde::Serialize;
use shared_utils::{GifDropError, Result};
use std::fmt;
use std::str::FromStr;

/// Highest rate a GIF can express: frame delays are in hundredths of a second.
pub const MAX_FPS: u32 = 50;

/// Target resolution; height always follows the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Width(u32),
    Original,
}

impl Resolution {
    pub fn width(width: u32) -> Result<Self> {
        if width == 0 {
            return Err(GifDropError::InvalidParameter(format!(
                "width must be a positive number of pixels, got {}",
                width
            )));
        }
        Ok(Resolution::Width(width))
    }

    pub fn label(&self) -> String {
        match self {
            Resolution::Width(w) => format!("{} × Auto", w),
            Resolution::Original => "Original".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// 320 px wide, for profile pictures
    #[default]
    Avatar,
    /// 600 px wide, for profile banners
    Banner,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Avatar, Profile::Banner];

    pub fn width(&self) -> u32 {
        match self {
            Profile::Avatar => 320,
            Profile::Banner => 600,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::Width(self.width())
    }

    pub fn default_frame_rate(&self) -> FrameRate {
        match self {
            Profile::Avatar => FrameRate::BALANCED,
            Profile::Banner => FrameRate::COMPACT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Profile::Avatar => "Profile avatar",
            Profile::Banner => "Profile banner",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Profile::Avatar => "Optimized for Discord profile pictures",
            Profile::Banner => "Optimized for Discord profile banners",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output frame rate in frames per second, `1..=MAX_FPS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    pub const FLUID: FrameRate = FrameRate(30);
    pub const CINEMA: FrameRate = FrameRate(24);
    pub const BALANCED: FrameRate = FrameRate(20);
    pub const COMPACT: FrameRate = FrameRate(15);
    pub const LOW_WEIGHT: FrameRate = FrameRate(10);

    pub const PRESETS: [FrameRate; 5] = [
        FrameRate::FLUID,
        FrameRate::CINEMA,
        FrameRate::BALANCED,
        FrameRate::COMPACT,
        FrameRate::LOW_WEIGHT,
    ];

    pub fn new(fps: u32) -> Result<Self> {
        if fps == 0 || fps > MAX_FPS {
            return Err(GifDropError::InvalidParameter(format!(
                "frame rate must be between 1 and {} fps, got {}",
                MAX_FPS, fps
            )));
        }
        Ok(FrameRate(fps))
    }

    pub fn fps(&self) -> u32 {
        self.0
    }

    pub fn preset_name(&self) -> Option<&'static str> {
        match self.0 {
            30 => Some("Fluid"),
            24 => Some("Cinema"),
            20 => Some("Balanced"),
            15 => Some("Compact"),
            10 => Some("Low weight"),
            _ => None,
        }
    }

    /// `"20 fps (Balanced)"` for presets, `"12 fps"` otherwise.
    pub fn label(&self) -> String {
        match self.preset_name() {
            Some(name) => format!("{} fps ({})", self.0, name),
            None => format!("{} fps", self.0),
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = GifDropError;

    fn try_from(fps: u32) -> Result<Self> {
        FrameRate::new(fps)
    }
}

/// Accepts `"20"`, `"20fps"` and labels such as `"20 fps (Balanced)"`.
impl FromStr for FrameRate {
    type Err = GifDropError;

    fn from_str(s: &str) -> Result<Self> {
        let first = s.split_whitespace().next().unwrap_or("");
        let digits = first.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let fps = digits.parse::<u32>().map_err(|_| {
            GifDropError::InvalidParameter(format!("not a frame rate: {:?}", s))
        })?;
        FrameRate::new(fps)
    }
}
