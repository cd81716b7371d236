//! Greedy word wrap for report prose.
//!
//! Independent of any canvas or cursor: callers hand in a measuring function
//! (usually `font_metrics::measure` bound to a face and size) and convert the
//! returned line count into vertical advance themselves.

/// Wraps `text` into lines no wider than `max_width` according to `measure`.
///
/// Words are whitespace-separated. Before a word is appended the candidate
/// line is measured; if it would overflow and the current line already holds
/// a word, the line is flushed and the word starts the next one. A single word
/// wider than `max_width` still gets a line of its own (no hyphenation).
/// Empty or whitespace-only input yields no lines.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical space taken by `line_count` lines at `line_height`.
pub fn block_height(line_count: usize, line_height: f32) -> f32 {
    line_count as f32 * line_height
}

/// Shortens a single-line value so it fits `max_width`, ending it with "..."
/// when anything was cut.
pub fn truncate_to_width<F>(text: &str, max_width: f32, measure: F) -> String
where
    F: Fn(&str) -> f32,
{
    if measure(text) <= max_width {
        return text.to_string();
    }

    let mut kept: String = text.to_string();
    while !kept.is_empty() {
        kept.pop();
        let candidate = format!("{}...", kept.trim_end());
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::font_metrics::{measure, Font};

    /// One unit per character, so widths are easy to reason about.
    fn char_count(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(wrap_text("", 100.0, char_count).is_empty());
        assert!(wrap_text("   \n\t ", 100.0, char_count).is_empty());
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        let lines = wrap_text("benign tissue", 40.0, char_count);
        assert_eq!(lines, vec!["benign tissue"]);
    }

    #[test]
    fn test_breaks_before_overflowing_word() {
        // "aaa bbb" = 7, "aaa bbb ccc" = 11 > 10
        let lines = wrap_text("aaa bbb ccc ddd", 10.0, char_count);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let lines = wrap_text("aaaa bbbbb", 10.0, char_count);
        assert_eq!(lines, vec!["aaaa bbbbb"]);
    }

    #[test]
    fn test_oversized_word_gets_its_own_line() {
        let lines = wrap_text("ab supercalifragilistic cd", 6.0, char_count);
        assert_eq!(lines, vec!["ab", "supercalifragilistic", "cd"]);
    }

    #[test]
    fn test_collapses_repeated_whitespace() {
        let lines = wrap_text("one   two\n\nthree", 100.0, char_count);
        assert_eq!(lines, vec!["one two three"]);
    }

    #[test]
    fn test_no_line_exceeds_width_unless_single_word() {
        let text = "The AI analysis has detected patterns that may indicate malignant \
                    (cancerous) tissue. Immediate follow-up with a qualified oncologist \
                    is strongly recommended for comprehensive evaluation.";
        let width = 200.0;
        let lines = wrap_text(text, width, |s| measure(s, Font::Helvetica, 10.0));
        assert!(lines.len() > 1);
        for line in &lines {
            let w = measure(line, Font::Helvetica, 10.0);
            assert!(w <= width || !line.contains(' '), "line too wide: {line} ({w})");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_truncate_keeps_text_that_fits() {
        assert_eq!(truncate_to_width("Jane Doe", 20.0, char_count), "Jane Doe");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("Alexandria Ocasio", 10.0, char_count), "Alexand...");
        assert_eq!(truncate_to_width("abcdef", 2.0, char_count), "");
    }

    #[test]
    fn test_block_height() {
        assert_eq!(block_height(0, 14.0), 0.0);
        assert_eq!(block_height(3, 14.0), 42.0);
    }
}
