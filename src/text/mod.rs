//! # Text Layout
//!
//! Greedy line breaking for table cells, using UAX#14 break opportunities
//! and the Helvetica metrics from the [`FontContext`].

use crate::font::{FontContext, StandardFont};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text of the line, trailing spaces removed.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Each entry is the break opportunity *before* that character. Index 0 is
/// always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    // linebreaks() yields the byte offset where the next segment starts.
    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width`.
    ///
    /// Lines end at the last break opportunity that fits; a word wider than
    /// the whole line is split at the character that overflows. Empty text
    /// yields one empty line.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font: StandardFont,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        if text.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
                width: 0.0,
            }];
        }

        let chars: Vec<char> = text.chars().collect();
        let widths: Vec<f64> = chars
            .iter()
            .map(|&c| {
                if is_newline(c) {
                    0.0
                } else {
                    font_context.char_width(c, font, font_size)
                }
            })
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        lines.push(self.make_line(&chars[line_start..i], &widths[line_start..i]));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => last_break_point = Some(i - 1),
                    None => {}
                }
            }

            if is_newline(ch) {
                continue;
            }

            let char_width = widths[i];
            if line_width + char_width > max_width && line_start < i && ch != ' ' {
                if let Some(bp) = last_break_point.filter(|bp| *bp >= line_start) {
                    let break_at = bp + 1;
                    lines.push(self.make_line(&chars[line_start..break_at], &widths[line_start..break_at]));
                    line_start = break_at;
                    line_width = widths[line_start..=i].iter().sum();
                    last_break_point = None;
                    continue;
                }

                // No break point on this line: split the word here.
                lines.push(self.make_line(&chars[line_start..i], &widths[line_start..i]));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            lines.push(self.make_line(&chars[line_start..], &widths[line_start..]));
        }

        lines
    }

    /// Build a line, dropping newlines and trailing spaces.
    fn make_line(&self, chars: &[char], widths: &[f64]) -> BrokenLine {
        let mut end = chars.len();
        while end > 0 && (chars[end - 1] == ' ' || is_newline(chars[end - 1])) {
            end -= 1;
        }
        let text: String = chars[..end].iter().filter(|c| !is_newline(**c)).collect();
        let width = widths[..end].iter().sum();
        BrokenLine { text, width }
    }

    /// Width of the text on a single line.
    pub fn measure_width(&self, font_context: &FontContext, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font_context.measure_string(text, font, font_size)
    }
}
