//! Input sanitization for text forwarded to external analyzers

/// Maximum characters of attack description forwarded to the analyzer.
pub const DESCRIPTION_CAP: usize = 2000;

/// Literal markers that precede secrets in captured request text.
const SECRET_MARKERS: [&str; 5] = ["Cookie:", "Authorization:", "Bearer ", "sk-", "ghp_"];

/// Truncate to [`DESCRIPTION_CAP`] characters and redact known secret
/// markers before the text leaves the process.
pub fn sanitize_description(text: &str) -> String {
    let mut out: String = text.chars().take(DESCRIPTION_CAP).collect();
    for marker in SECRET_MARKERS {
        if out.contains(marker) {
            out = out.replace(marker, "[REDACTED]");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_all_markers() {
        let input = "Cookie: session=abc Authorization: Bearer sk-12345 ghp_token";
        let out = sanitize_description(input);
        assert!(!out.contains("Cookie:"));
        assert!(!out.contains("Authorization:"));
        assert!(!out.contains("Bearer "));
        assert!(!out.contains("sk-"));
        assert!(!out.contains("ghp_"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn truncates_at_cap() {
        let input = "a".repeat(5000);
        assert_eq!(sanitize_description(&input).len(), DESCRIPTION_CAP);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte characters around the cap must not split.
        let input = "é".repeat(3000);
        let out = sanitize_description(&input);
        assert_eq!(out.chars().count(), DESCRIPTION_CAP);
    }

    #[test]
    fn clean_text_passes_through() {
        let input = "UNION SELECT password FROM users";
        assert_eq!(sanitize_description(input), input);
    }
}
