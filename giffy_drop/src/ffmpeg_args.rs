//! Argument lists for the two ffmpeg passes

use crate::profile::{FrameRate, Resolution};
use std::ffi::OsString;
use std::path::Path;

/// `fps=N`, plus a Lanczos downscale to the target width when one is set.
pub fn scale_filter(resolution: Resolution, frame_rate: FrameRate) -> String {
    match resolution {
        Resolution::Original => format!("fps={}", frame_rate.fps()),
        Resolution::Width(width) => format!(
            "fps={},scale={}:-1:flags=lanczos",
            frame_rate.fps(),
            width
        ),
    }
}

/// Pass 1: derive an optimised palette from the filtered input.
pub fn palette_args(input: &Path, palette: &Path, filter: &str) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-vf".into(),
        format!("{},palettegen", filter).into(),
        "-y".into(),
        palette.as_os_str().to_owned(),
    ]
}

/// Pass 2: encode the filtered input through the palette from pass 1.
pub fn encode_args(input: &Path, palette: &Path, output: &Path, filter: &str) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-i".into(),
        palette.as_os_str().to_owned(),
        "-lavfi".into(),
        format!("{} [x]; [x][1:v] paletteuse", filter).into(),
        "-y".into(),
        output.as_os_str().to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_scale_filter_for_profiles() {
        assert_eq!(
            scale_filter(Profile::Avatar.resolution(), FrameRate::BALANCED),
            "fps=20,scale=320:-1:flags=lanczos"
        );
        assert_eq!(
            scale_filter(Profile::Banner.resolution(), FrameRate::COMPACT),
            "fps=15,scale=600:-1:flags=lanczos"
        );
    }

    #[test]
    fn test_scale_filter_original_size() {
        assert_eq!(scale_filter(Resolution::Original, FrameRate::FLUID), "fps=30");
    }

    #[test]
    fn test_palette_args() {
        let args = palette_args(
            Path::new("/videos/clip.mp4"),
            Path::new("/videos/output/.palette_x.png"),
            "fps=20,scale=320:-1:flags=lanczos",
        );
        assert_eq!(
            strings(&args),
            vec![
                "-i",
                "/videos/clip.mp4",
                "-vf",
                "fps=20,scale=320:-1:flags=lanczos,palettegen",
                "-y",
                "/videos/output/.palette_x.png",
            ]
        );
    }

    #[test]
    fn test_encode_args() {
        let args = encode_args(
            Path::new("my clip.mp4"),
            Path::new("output/palette.png"),
            Path::new("output/my clip_optimized.gif"),
            "fps=15,scale=600:-1:flags=lanczos",
        );
        assert_eq!(
            strings(&args),
            vec![
                "-i",
                "my clip.mp4",
                "-i",
                "output/palette.png",
                "-lavfi",
                "fps=15,scale=600:-1:flags=lanczos [x]; [x][1:v] paletteuse",
                "-y",
                "output/my clip_optimized.gif",
            ]
        );
    }
}
