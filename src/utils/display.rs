//! Terminal rendering for quotes.

use owo_colors::{AnsiColors, OwoColorize};
use std::io::{self, IsTerminal};

use crate::models::Quote;

/// Default width when the quote is wrapped for a terminal.
pub const DEFAULT_WIDTH: usize = 72;

/// Accent colours cycled on each refresh, one per palette slot.
const PALETTE: [AnsiColors; 4] = [
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
    AnsiColors::BrightWhite,
];

/// Number of palette slots.
pub const PALETTE_SIZE: usize = PALETTE.len();

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Greedy word wrap. Words longer than `width` are kept whole.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Render a quote as plain text: passage, then author and source lines.
pub fn render_plain(quote: &Quote, width: usize) -> String {
    let text = wrap_text(&quote.text, width);
    if quote.is_placeholder() {
        return text;
    }
    format!("{}\n\n— {}\n{}", text, quote.author, quote.source)
}

/// Render a quote with colour; `palette_index` picks the accent.
pub fn render_styled(quote: &Quote, palette_index: usize, width: usize) -> String {
    let accent = PALETTE[palette_index % PALETTE_SIZE];
    let text = wrap_text(&quote.text, width);
    if quote.is_placeholder() {
        return text.dimmed().to_string();
    }
    format!(
        "{}\n\n{}\n{}",
        text.color(accent),
        format!("— {}", quote.author).bold(),
        quote.source.italic().dimmed()
    )
}

/// Render a quote as pretty-printed JSON.
pub fn render_json(quote: &Quote) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quote)
}
