//! Terminal colours for the status log

use console::{style, Style};

pub fn success() -> Style {
    Style::new().green().bold()
}

pub fn error() -> Style {
    Style::new().red().bold()
}

pub fn warning() -> Style {
    Style::new().yellow()
}

pub fn info() -> Style {
    Style::new().cyan()
}

pub fn highlight() -> Style {
    Style::new().magenta().bold()
}

pub fn dim() -> Style {
    Style::new().dim()
}

pub fn fmt_fps(fps: u32) -> String {
    format!("{}", style(format!("{} fps", fps)).cyan().bold())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_fps() {
        assert_eq!(console::strip_ansi_codes(&fmt_fps(20)), "20 fps");
    }
}
