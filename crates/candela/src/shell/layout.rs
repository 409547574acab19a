#![forbid(unsafe_code)]

//! Screen geometry for the header block and help panel.
//!
//! The header sits at the top-left. The help panel goes to its right,
//! `header_right_margin` columns past the header's widest line. Both are drawn
//! only when the surface leaves room around the header; a small terminal
//! shows output and the input line alone.

use candela_text::display_width;

use crate::config::ShellConfig;

/// Measured size of the header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderMetrics {
    /// Widest header line, in cells.
    pub width: u16,
    /// Number of header lines.
    pub height: u16,
}

impl HeaderMetrics {
    pub fn measure(header: &str) -> Self {
        let lines: Vec<&str> = header.split('\n').collect();
        let width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
        Self {
            width: clamp_u16(width),
            height: clamp_u16(lines.len()),
        }
    }

    /// Whether header and help fit on a `rows` x `cols` surface.
    pub fn fits(&self, rows: u16, cols: u16, config: &ShellConfig) -> bool {
        u32::from(cols) >= u32::from(self.width) + u32::from(config.help_min_extra_cols)
            && u32::from(rows) >= u32::from(self.height) + u32::from(config.help_min_extra_rows)
    }
}

/// Lines of the help panel, each prefixed with one space: two blanks, the
/// title, a rule, then the menu options.
pub fn help_lines(title: &str, options: &str, rule_width: usize) -> Vec<String> {
    let text = format!("\n\n{title}\n{}\n{options}", "-".repeat(rule_width));
    text.split('\n').map(|line| format!(" {line}")).collect()
}

/// Column of the help panel's left edge, shifted left when its widest line
/// would overflow.
pub fn help_column(lines: &[String], header: HeaderMetrics, cols: u16, config: &ShellConfig) -> u16 {
    let longest = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
    let preferred = usize::from(header.width) + usize::from(config.header_right_margin);
    let col = if preferred + longest > usize::from(cols) {
        usize::from(cols).saturating_sub(longest + 1)
    } else {
        preferred
    };
    clamp_u16(col)
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
