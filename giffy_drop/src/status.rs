//! Status events flowing from the converter to the front end
//!
//! The converter never prints. It emits [`StatusEvent`]s into a
//! [`StatusSink`]; the CLI renders them, tests collect them.

use crate::conversion_api::SizeVerdict;
use serde::Serialize;
use shared_utils::FileSize;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Palette,
    Encode,
}

impl Pass {
    pub const TOTAL: u8 = 2;

    pub fn number(&self) -> u8 {
        match self {
            Pass::Palette => 1,
            Pass::Encode => 2,
        }
    }

    /// Stage name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Pass::Palette => "Palette generation",
            Pass::Encode => "GIF conversion",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Pass::Palette => "Generating color palette...",
            Pass::Encode => "Converting to GIF...",
        }
    }

    pub fn done_message(&self) -> &'static str {
        match self {
            Pass::Palette => "Palette generated successfully",
            Pass::Encode => "GIF generated successfully",
        }
    }

    /// `[Pass 1/2]`
    pub fn tag(&self) -> String {
        format!("[Pass {}/{}]", self.number(), Self::TOTAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    /// Raw tool output.
    Detail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Started {
        input: PathBuf,
        output: PathBuf,
        settings: String,
    },
    PassStarted {
        pass: Pass,
        command: String,
    },
    ToolOutput {
        pass: Pass,
        line: String,
    },
    Progress {
        pass: Pass,
        fraction: f64,
    },
    PassFinished {
        pass: Pass,
        elapsed: Duration,
    },
    SizeChecked {
        size: FileSize,
        limit: FileSize,
        verdict: SizeVerdict,
    },
    CleanedUp,
    CleanupFailed {
        reason: String,
    },
    Completed {
        output: PathBuf,
    },
}

impl StatusEvent {
    pub fn severity(&self) -> Severity {
        match self {
            StatusEvent::ToolOutput { .. } | StatusEvent::Progress { .. } => Severity::Detail,
            StatusEvent::PassFinished { .. }
            | StatusEvent::CleanedUp
            | StatusEvent::Completed { .. } => Severity::Success,
            StatusEvent::SizeChecked { verdict, .. } => match verdict {
                SizeVerdict::WithinLimit => Severity::Success,
                SizeVerdict::ExceedsLimit => Severity::Warning,
            },
            StatusEvent::CleanupFailed { .. } => Severity::Warning,
            StatusEvent::Started { .. } | StatusEvent::PassStarted { .. } => Severity::Info,
        }
    }

    /// Status-log text; `None` for events that only drive progress display.
    pub fn render(&self) -> Option<String> {
        let text = match self {
            StatusEvent::Started {
                input,
                output,
                settings,
            } => format!(
                "Starting conversion process...\nInput: {}\nOutput: {}\nSettings: {}",
                input.display(),
                output.display(),
                settings
            ),
            StatusEvent::PassStarted { pass, command } => {
                format!("{} {}\nCommand: {}", pass.tag(), pass.action(), command)
            }
            StatusEvent::ToolOutput { line, .. } => line.clone(),
            StatusEvent::Progress { .. } => return None,
            StatusEvent::PassFinished { pass, elapsed } => {
                format!("✓ {} ({:.1}s)", pass.done_message(), elapsed.as_secs_f64())
            }
            StatusEvent::SizeChecked {
                size,
                limit,
                verdict,
            } => match verdict {
                SizeVerdict::WithinLimit => format!(
                    "📊 Final size: {:.2} MB\n✓ File size is within Discord limits!",
                    size.as_mb()
                ),
                SizeVerdict::ExceedsLimit => format!(
                    "📊 Final size: {:.2} MB\n⚠ WARNING: File exceeds Discord limit ({}).\n   Try lowering FPS or Width for a smaller file.",
                    size.as_mb(),
                    limit_label(*limit)
                ),
            },
            StatusEvent::CleanedUp => "✓ Temporary files cleaned up".to_string(),
            StatusEvent::CleanupFailed { reason } => {
                format!("⚠ Warning: Could not remove temporary files: {}", reason)
            }
            StatusEvent::Completed { output } => {
                format!("✓ Conversion complete!\nOutput: {}", output.display())
            }
        };
        Some(text)
    }
}

/// `10MB` for whole mebibytes, the precise size otherwise.
fn limit_label(limit: FileSize) -> String {
    if !limit.is_zero() && limit.bytes() % FileSize::MB == 0 {
        format!("{}MB", limit.bytes() / FileSize::MB)
    } else {
        limit.display()
    }
}

pub trait StatusSink {
    fn emit(&self, event: StatusEvent);
}

impl StatusSink for Sender<StatusEvent> {
    fn emit(&self, event: StatusEvent) {
        // The front end may have stopped listening; the conversion still finishes.
        let _ = self.send(event);
    }
}

/// In-memory sink, for callers that read the log after the run.
#[derive(Debug, Default)]
pub struct StatusLog {
    events: Mutex<Vec<StatusEvent>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rendered text of every event, one block per line.
    pub fn text(&self) -> String {
        self.events()
            .iter()
            .filter_map(StatusEvent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StatusSink for StatusLog {
    fn emit(&self, event: StatusEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_pass_tags() {
        assert_eq!(Pass::Palette.tag(), "[Pass 1/2]");
        assert_eq!(Pass::Encode.tag(), "[Pass 2/2]");
    }

    #[test]
    fn test_render_pass_started() {
        let event = StatusEvent::PassStarted {
            pass: Pass::Palette,
            command: "ffmpeg -i a.mp4".to_string(),
        };
        assert_eq!(
            event.render().unwrap(),
            "[Pass 1/2] Generating color palette...\nCommand: ffmpeg -i a.mp4"
        );
        assert_eq!(event.severity(), Severity::Info);
    }

    #[test]
    fn test_render_size_within_limit() {
        let event = StatusEvent::SizeChecked {
            size: FileSize::new(3 * 1024 * 1024),
            limit: FileSize::from_mb(10),
            verdict: SizeVerdict::WithinLimit,
        };
        let text = event.render().unwrap();
        assert!(text.contains("📊 Final size: 3.00 MB"));
        assert!(text.contains("within Discord limits"));
        assert_eq!(event.severity(), Severity::Success);
    }

    #[test]
    fn test_render_size_exceeds_limit() {
        let event = StatusEvent::SizeChecked {
            size: FileSize::new(12 * 1024 * 1024),
            limit: FileSize::from_mb(10),
            verdict: SizeVerdict::ExceedsLimit,
        };
        let text = event.render().unwrap();
        assert!(text.contains("⚠ WARNING: File exceeds Discord limit (10MB)."));
        assert!(text.contains("Try lowering FPS or Width"));
        assert_eq!(event.severity(), Severity::Warning);
    }

    #[test]
    fn test_progress_has_no_text() {
        let event = StatusEvent::Progress {
            pass: Pass::Encode,
            fraction: 0.4,
        };
        assert!(event.render().is_none());
    }

    #[test]
    fn test_limit_label() {
        assert_eq!(limit_label(FileSize::from_mb(10)), "10MB");
        assert_eq!(limit_label(FileSize::new(1500)), "1.46 KB");
    }

    #[test]
    fn test_status_log_collects_in_order() {
        let log = StatusLog::new();
        log.emit(StatusEvent::CleanedUp);
        log.emit(StatusEvent::Completed {
            output: PathBuf::from("out.gif"),
        });
        assert_eq!(log.events().len(), 2);
        assert_eq!(
            log.text(),
            "✓ Temporary files cleaned up\n✓ Conversion complete!\nOutput: out.gif"
        );
    }

    #[test]
    fn test_sender_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        tx.emit(StatusEvent::CleanedUp);
    }
}
