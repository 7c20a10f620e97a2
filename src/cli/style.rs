//! Terminal styling helpers
//!
//! Colors are only emitted when stdout supports them; hyperlinks only when
//! the terminal understands OSC 8.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;
use terminal_link::Link;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Semantic styles for anything printable
pub trait Stylize: Display {
    /// Bold
    fn emphasis(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.bold()).to_string()
    }

    /// Highlighted value (branch names, counts)
    fn accent(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.cyan()).to_string()
    }

    /// Secondary text
    fn muted(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.dimmed()).to_string()
    }

    /// Something went well
    fn success(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    }

    /// Needs attention
    fn warn(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
    }

    /// Failed
    fn failure(&self) -> String {
        let s = self.to_string();
        s.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Muted bullet arrow for list items
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner used while waiting on git or GitHub
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// `#N`, hyperlinked to `url` when the terminal supports it
pub fn pr_link(number: u64, url: &str) -> String {
    let text = format!("#{number}");
    if url.is_empty() || !supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        return text;
    }
    Link::new(&text, url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_link_without_url_is_plain() {
        assert_eq!(pr_link(7, ""), "#7");
    }

    #[test]
    fn test_styles_keep_text() {
        assert!("main".accent().contains("main"));
        assert!(3.emphasis().contains('3'));
    }
}
