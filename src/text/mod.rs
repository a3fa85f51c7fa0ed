//! # Text Metrics
//!
//! Character width measurement and word wrapping for device text.
//!
//! The layout engine consumes metrics through the [`TextMetrics`] trait so a
//! host can supply exact tables for its device. [`FixedPitchMetrics`] is the
//! built-in provider: fixed-pitch widths derived from the CPI setting, a
//! small deterministic table for proportional mode, and greedy word wrap over
//! UAX#14 break opportunities.

use crate::model::DOTS_PER_INCH;
use crate::style::Pitch;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Width measurement and word-wrap services for the layout engine.
///
/// Implementations must be side-effect-free: the engine may call them from
/// concurrent layout computations over shared trees.
pub trait TextMetrics {
    /// Width of one character in device dots under the given pitch.
    fn char_width(&self, ch: char, pitch: &Pitch) -> u32;

    /// Greedy word wrap of `text` into lines of at most `max_width` dots.
    /// Single words wider than `max_width` are broken at character level.
    /// `letter_spacing` is the extra dots between adjacent characters.
    fn wrap(&self, text: &str, max_width: u32, pitch: &Pitch, letter_spacing: u32) -> Vec<String> {
        greedy_wrap(self, text, max_width, pitch, letter_spacing)
    }

    /// Total width of a string: character widths plus letter spacing between
    /// characters (not after the last one).
    fn text_width(&self, text: &str, pitch: &Pitch, letter_spacing: u32) -> u32 {
        let mut width = 0u32;
        let mut count = 0u32;
        for ch in text.chars() {
            width += self.char_width(ch, pitch);
            count += 1;
        }
        if count > 1 {
            width += (count - 1) * letter_spacing;
        }
        width
    }
}

/// Built-in metrics for fixed-pitch dot-matrix character generators.
///
/// Fixed pitch: one character cell is `round(360 / cpi)` dots, scaled ×0.6
/// when condensed and ×2 when double-wide. Proportional mode assigns narrow
/// and wide glyph classes fractions of the cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPitchMetrics;

impl FixedPitchMetrics {
    fn cell_width(pitch: &Pitch) -> f64 {
        let mut cell = DOTS_PER_INCH as f64 / pitch.cpi;
        if pitch.condensed {
            cell *= 0.6;
        }
        cell
    }
}

impl TextMetrics for FixedPitchMetrics {
    fn char_width(&self, ch: char, pitch: &Pitch) -> u32 {
        let cell = Self::cell_width(pitch);
        let fraction = if pitch.proportional {
            proportional_fraction(ch)
        } else {
            1.0
        };
        let mut width = (cell * fraction).round() as u32;
        if pitch.double_width {
            width *= 2;
        }
        width
    }
}

/// Glyph width class for proportional mode, as a fraction of the cell.
fn proportional_fraction(ch: char) -> f64 {
    match ch {
        ' ' => 0.5,
        'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.4,
        'f' | 'r' | 't' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.6,
        'm' | 'w' | 'M' | 'W' | '@' => 1.2,
        _ => 1.0,
    }
}

/// Greedy word wrap over UAX#14 break opportunities.
fn greedy_wrap<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    max_width: u32,
    pitch: &Pitch,
    letter_spacing: u32,
) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0u32;

    for (segment, mandatory) in break_segments(text) {
        let trimmed = segment.trim_end();
        let seg_width = metrics.text_width(trimmed, pitch, letter_spacing);

        let joined = if current.is_empty() {
            seg_width
        } else {
            current_width
                + metrics.text_width(&segment_lead(&current), pitch, letter_spacing)
                + seg_width
        };

        if !current.is_empty() && joined > max_width {
            lines.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }

        if current.is_empty() && seg_width > max_width {
            // A single word wider than the line: break at character level.
            for ch in trimmed.chars() {
                let cw = metrics.char_width(ch, pitch);
                let next = if current.is_empty() {
                    cw
                } else {
                    current_width + letter_spacing + cw
                };
                if !current.is_empty() && next > max_width {
                    lines.push(current.clone());
                    current.clear();
                    current_width = cw;
                } else {
                    current_width = next;
                }
                current.push(ch);
            }
        } else {
            current.push_str(&segment);
            current_width = metrics.text_width(current.trim_end(), pitch, letter_spacing);
        }

        // A mandatory break (newline) always flushes the running line; the
        // break character itself is trimmed away, never printed.
        if mandatory {
            lines.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }
    }

    if !current.trim_end().is_empty() || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }

    lines
}

/// Trailing whitespace of the running line, which re-enters the width once a
/// following segment lands on the same line.
fn segment_lead(current: &str) -> String {
    current
        .chars()
        .rev()
        .take_while(|c| c.is_whitespace())
        .collect()
}

/// Split text into UAX#14 segments: each segment ends at (and includes the
/// whitespace before) an allowed break position. The flag marks segments
/// followed by a mandatory break (a newline, as opposed to a soft wrap
/// opportunity). The implicit mandatory break at end of text is dropped.
fn break_segments(text: &str) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    for (offset, opportunity) in linebreaks(text) {
        let mandatory = matches!(opportunity, BreakOpportunity::Mandatory);
        if offset == text.len() && mandatory {
            break;
        }
        segments.push((text[start..offset].to_string(), mandatory));
        start = offset;
    }
    if start < text.len() {
        segments.push((text[start..].to_string(), false));
    }
    segments
}
