//! Greedy word wrapping against measured text width

use crate::fonts::TextMeasure;

/// Split `text` into lines no wider than `max_width` points.
///
/// Words are packed greedily; a word that is wider than `max_width` on its
/// own gets a line to itself and is never broken. When `max_lines` is given
/// and exceeded, every surplus line is joined onto the last permitted line.
///
/// Without a (positive) `max_width` the trimmed text is returned as one line.
/// Blank input yields a single empty line.
pub fn wrap_text(
    text: &str,
    measure: &impl TextMeasure,
    font_size: f32,
    max_width: Option<f32>,
    max_lines: Option<usize>,
) -> Vec<String> {
    let text = text.trim();

    let max_width = match max_width {
        Some(width) if width > 0.0 => width,
        _ => return vec![text.to_string()],
    };

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure.text_width(&candidate, font_size) <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        return vec![String::new()];
    }

    match max_lines {
        Some(limit) if limit > 0 && lines.len() > limit => {
            let tail = lines.split_off(limit - 1).join(" ");
            lines.push(tail);
            lines
        }
        _ => lines,
    }
}
