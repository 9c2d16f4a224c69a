use clap::ValueEnum;
use indicatif::ProgressBar;
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

/// Collapse whitespace and cut to `max_width` display columns, ending in `…`
/// when something was dropped.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::new();
    let mut width = 0;

    for (i, c) in flat.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            let rest_fits = flat[i..]
                .chars()
                .map(|c| c.width().unwrap_or(0))
                .sum::<usize>()
                + width
                <= max_width;
            if rest_fits {
                out.push_str(&flat[i..]);
            } else {
                out.push('…');
            }
            return out;
        }
        out.push(c);
        width += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("a much longer answer", 8), "a much …");
        assert_eq!(truncate_text("line\none\n\ntwo", 20), "line one two");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character takes two columns
        assert_eq!(truncate_text("常见问题解答", 7), "常见问…");
    }
}
