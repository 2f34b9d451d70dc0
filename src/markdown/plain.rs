//! Plain-text reduction
//!
//! Strips Markdown syntax from raw text for the copy/paste preview path.
//! This operates on the raw string with pattern substitution and is
//! independent of the parsed node tree.

use regex::Regex;

/// Removes Markdown formatting from text via a fixed substitution chain.
///
/// Compiling the patterns is not free, so construct one reducer and reuse
/// it across reductions.
#[derive(Debug)]
pub struct PlainTextReducer {
    headers: Regex,
    blockquotes: Regex,
    bullet_markers: Regex,
    ordered_markers: Regex,
    code_blocks: Regex,
    inline_code: Regex,
    bold_stars: Regex,
    bold_underscores: Regex,
    em_stars: Regex,
    em_underscores: Regex,
    images: Regex,
    links: Regex,
    rules: Regex,
    tables: Regex,
    html_tags: Regex,
    blank_runs: Regex,
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("static pattern compiles")
}

impl PlainTextReducer {
    pub fn new() -> Self {
        Self {
            headers: pattern(r"(?m)^#{1,6}\s"),
            blockquotes: pattern(r"(?m)^>\s"),
            bullet_markers: pattern(r"(?m)^[*+-]\s"),
            ordered_markers: pattern(r"(?m)^\d+\.\s"),
            code_blocks: pattern(r"(?s)```.*?```"),
            inline_code: pattern(r"`([^`]+)`"),
            bold_stars: pattern(r"\*\*(.*?)\*\*"),
            bold_underscores: pattern(r"__(.*?)__"),
            em_stars: pattern(r"\*(.*?)\*"),
            em_underscores: pattern(r"_(.*?)_"),
            images: pattern(r"!\[([^\]]*)\]\([^)]+\)"),
            links: pattern(r"\[([^\]]+)\]\([^)]+\)"),
            rules: pattern(r"(?m)^-{3,}|={3,}|\*{3,}$"),
            tables: pattern(r"\|[^\n]*\|"),
            html_tags: pattern(r"<[^>]*>"),
            blank_runs: pattern(r"\n\s*\n"),
        }
    }

    /// Strip Markdown syntax, keeping the inner text of emphasis, inline
    /// code and links, and dropping images, code fences and tables.
    pub fn reduce(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self.headers.replace_all(text, "");
        let text = self.blockquotes.replace_all(&text, "");
        let text = self.bullet_markers.replace_all(&text, "");
        let text = self.ordered_markers.replace_all(&text, "");
        let text = self.code_blocks.replace_all(&text, "");
        let text = self.inline_code.replace_all(&text, "$1");
        let text = self.bold_stars.replace_all(&text, "$1");
        let text = self.bold_underscores.replace_all(&text, "$1");
        let text = self.em_stars.replace_all(&text, "$1");
        let text = self.em_underscores.replace_all(&text, "$1");
        let text = self.images.replace_all(&text, "");
        let text = self.links.replace_all(&text, "$1");
        let text = self.rules.replace_all(&text, "");
        let text = self.tables.replace_all(&text, "");
        let text = self.html_tags.replace_all(&text, "");
        let text = self.blank_runs.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

impl Default for PlainTextReducer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emphasis_and_code() {
        let reducer = PlainTextReducer::new();
        assert_eq!(
            reducer.reduce("**bold** and _em_ and `code`"),
            "bold and em and code"
        );
    }

    #[test]
    fn test_strips_headers_and_quotes() {
        let reducer = PlainTextReducer::new();
        assert_eq!(
            reducer.reduce("# Title\n> quoted line"),
            "Title\nquoted line"
        );
    }

    #[test]
    fn test_links_keep_text_images_dropped() {
        let reducer = PlainTextReducer::new();
        assert_eq!(
            reducer.reduce("see [docs](https://example.com) and ![chart](c.png)"),
            "see docs and"
        );
    }

    #[test]
    fn test_list_markers_removed() {
        let reducer = PlainTextReducer::new();
        assert_eq!(reducer.reduce("- one\n* two\n3. three"), "one\ntwo\nthree");
    }

    #[test]
    fn test_code_fences_removed_entirely() {
        let reducer = PlainTextReducer::new();
        assert_eq!(reducer.reduce("before\n```\nlet x = 1;\n```\nafter"), "before\n\nafter");
    }

    #[test]
    fn test_empty_input() {
        let reducer = PlainTextReducer::new();
        assert_eq!(reducer.reduce(""), "");
    }
}
