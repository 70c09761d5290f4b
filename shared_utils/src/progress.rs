//! Terminal progress indicators for ffmpeg passes

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Resolution of [`create_pass_bar`]; positions are per-mille of the pass.
pub const PASS_BAR_LENGTH: u64 = 1000;

pub mod progress_style {
    /// indicatif needs 3 characters: (filled, current, empty)
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    pub const PASS_TEMPLATE: &str =
        "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {percent:>3}% • ⏱️ {elapsed_precise} • {msg}";

    pub const SPINNER_TEMPLATE: &str =
        "{spinner:.green} {prefix:.cyan.bold} • ⏱️ {elapsed_precise} • {msg}";
}

/// Bar for one ffmpeg pass. Falls back to a spinner look until the first
/// progress fraction arrives (ffmpeg has not printed the duration yet).
pub fn create_pass_bar(prefix: &str, hidden: bool) -> ProgressBar {
    let pb = ProgressBar::new(PASS_BAR_LENGTH);

    if hidden {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        if let Ok(style) = ProgressStyle::default_spinner().template(progress_style::SPINNER_TEMPLATE)
        {
            pb.set_style(style.tick_chars(progress_style::SPINNER_CHARS));
        }
        pb.set_prefix(prefix.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

/// Switches a pass bar to the determinate style and moves it to `fraction`.
pub fn set_pass_fraction(pb: &ProgressBar, fraction: f64) {
    if pb.is_hidden() {
        return;
    }
    if pb.position() == 0 {
        if let Ok(style) = ProgressStyle::default_bar().template(progress_style::PASS_TEMPLATE) {
            pb.set_style(
                style
                    .progress_chars(progress_style::PROGRESS_CHARS)
                    .tick_chars(progress_style::SPINNER_CHARS),
            );
        }
    }
    let position = (fraction.clamp(0.0, 1.0) * PASS_BAR_LENGTH as f64).round() as u64;
    pb.set_position(position.max(1));
}

pub fn create_spinner(message: &str, hidden: bool) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();

    if hidden {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_chars(progress_style::SPINNER_CHARS));
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
    }
    spinner
}

pub fn format_bytes(bytes: u64) -> String {
    crate::types::FileSize::new(bytes).display()
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
