//! Utilities module for Markcard
//!
//! Shared helper functions:
//! - Percent-decoding for field transport
//! - Text helpers used by the CLI summary

/// Text utilities
pub mod text {
    /// Decode a percent-encoded string (UTF-8). Malformed escapes are
    /// kept verbatim rather than rejected, since field transport is a
    /// best-effort path.
    pub fn percent_decode(input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'%' {
                let decoded = bytes.get(i + 1..i + 3).and_then(|hex| {
                    std::str::from_utf8(hex)
                        .ok()
                        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                });
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }

        String::from_utf8_lossy(&out).into_owned()
    }

    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Truncate string with ellipsis
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            "...".to_string()
        } else {
            let cut: String = s.chars().take(max_len - 3).collect();
            format!("{cut}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(text::percent_decode("hello%20world"), "hello world");
        assert_eq!(text::percent_decode("%E4%BD%A0%E5%A5%BD"), "你好");
        assert_eq!(text::percent_decode("plain"), "plain");
    }

    #[test]
    fn test_percent_decode_malformed_kept() {
        assert_eq!(text::percent_decode("50%"), "50%");
        assert_eq!(text::percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(text::word_count("hello world"), 2);
        assert_eq!(text::word_count("  "), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(text::truncate("hello", 10), "hello");
        assert_eq!(text::truncate("hello world", 8), "hello...");
    }
}
