//! Line-wrapping engine
//!
//! Greedy, code-point-by-code-point wrapping of a string into positioned
//! lines. Wrapping operates on Unicode code points, not grapheme clusters
//! or word boundaries: it will break combining sequences and mid-word.
//! That is the contract, not an oversight.

use crate::render::measure::TextMeasureCache;
use crate::render::surface::DrawSurface;
use crate::theme::FontSpec;

/// One wrapped physical line. `y` is the text baseline the painter passes
/// to `fill_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
    pub x: f32,
    pub y: f32,
}

/// Wrap `text` into lines no wider than `max_width`.
///
/// A running candidate line is grown one code point at a time; when
/// appending the next code point would overflow and the candidate is
/// non-empty, the candidate is emitted and the code point starts a new
/// line. A single code point wider than `max_width` is therefore never
/// split: it is emitted alone on its own line. An explicit `'\n'` always
/// emits the accumulated line (without the newline itself) and advances
/// the cursor. Successive lines advance `y` by exactly `line_height`.
#[allow(clippy::too_many_arguments)]
pub fn wrap_text(
    cache: &mut TextMeasureCache,
    surface: &mut dyn DrawSurface,
    text: &str,
    x: f32,
    y: f32,
    max_width: f32,
    line_height: f32,
    font: &FontSpec,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_y = y;

    for ch in text.chars() {
        if ch == '\n' {
            let width = cache.measure(surface, &current, font);
            lines.push(TextLine {
                text: std::mem::take(&mut current),
                width,
                x,
                y: current_y,
            });
            current_y += line_height;
            continue;
        }

        let mut candidate = current.clone();
        candidate.push(ch);
        let candidate_width = cache.measure(surface, &candidate, font);

        if candidate_width > max_width && !current.is_empty() {
            let width = cache.measure(surface, &current, font);
            lines.push(TextLine {
                text: std::mem::take(&mut current),
                width,
                x,
                y: current_y,
            });
            current_y += line_height;
            current.push(ch);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        let width = cache.measure(surface, &current, font);
        lines.push(TextLine {
            text: current,
            width,
            x,
            y: current_y,
        });
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::RecordingSurface;

    fn wrap(text: &str, max_width: f32) -> Vec<TextLine> {
        let mut cache = TextMeasureCache::new();
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        wrap_text(
            &mut cache,
            &mut surface,
            text,
            0.0,
            100.0,
            max_width,
            24.0,
            &FontSpec::sans(10.0),
        )
    }

    #[test]
    fn test_empty_input() {
        assert!(wrap("", 200.0).is_empty());
    }

    #[test]
    fn test_explicit_newline_splits() {
        // wide enough that nothing wraps on width
        let lines = wrap("Hello\nWorld", 500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello");
        assert_eq!(lines[0].y, 100.0);
        assert_eq!(lines[1].text, "World");
        assert_eq!(lines[1].y, 124.0);
    }

    #[test]
    fn test_trailing_newline_emits_no_empty_line() {
        let lines = wrap("Hello\n", 500.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello");
    }

    #[test]
    fn test_blank_line_between_newlines() {
        let lines = wrap("a\n\nb", 500.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "");
        assert_eq!(lines[1].width, 0.0);
    }

    #[test]
    fn test_width_never_exceeded_except_single_code_point() {
        // 10px font, ASCII advance 6px; 20px max fits three chars
        let max_width = 20.0;
        let lines = wrap("abcdefghij", max_width);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                line.width <= max_width || line.text.chars().count() == 1,
                "line {:?} exceeds max width",
                line
            );
        }
    }

    #[test]
    fn test_y_strictly_monotonic_by_line_height() {
        let lines = wrap("abcdefghijklmnopqrstuvwxyz", 20.0);
        for pair in lines.windows(2) {
            assert_eq!(pair[1].y - pair[0].y, 24.0);
        }
    }

    #[test]
    fn test_oversized_single_code_point_emitted_alone() {
        // a single wide char (10px) against a 5px budget must not loop
        let lines = wrap("你", 5.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "你");
        assert!(lines[0].width > 5.0);
    }

    #[test]
    fn test_oversized_code_point_in_stream() {
        // stream keeps wrapping after an oversized code point
        let lines = wrap("ab你cd", 10.0);
        assert!(lines.iter().any(|l| l.text == "你"));
        for line in &lines {
            assert!(line.width <= 10.0 || line.text.chars().count() == 1);
        }
    }
}
