//! Context assembly from retrieved documents.
//!
//! Retrieved texts are sorted before joining so that identical result sets
//! produce identical contexts regardless of service-side ordering — this
//! keeps the downstream chat cache key stable across runs.

/// Placeholder context used when retrieval returned nothing.
pub const NO_RESULTS_PLACEHOLDER: &str = "(no search results)";

/// Truncate `text` to at most `max_chars` characters, respecting UTF-8
/// boundaries. `max_chars` of 0 disables truncation.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Assemble the generation context from retrieved document texts.
///
/// Sorts the texts, truncates each to `max_chars` (0 = unlimited), and
/// joins them with blank lines. An empty result set yields
/// [`NO_RESULTS_PLACEHOLDER`].
pub fn assemble_context(texts: &[String], max_chars: usize) -> String {
    if texts.is_empty() {
        return NO_RESULTS_PLACEHOLDER.to_string();
    }
    let mut sorted: Vec<&str> = texts.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|t| truncate_chars(t, max_chars))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_count_not_bytes() {
        // multi-byte characters: 5 chars, 15 bytes
        let text = "あいうえお";
        assert_eq!(truncate_chars(text, 3), "あいう");
        assert_eq!(truncate_chars(text, 5), text);
        assert_eq!(truncate_chars(text, 10), text);
    }

    #[test]
    fn truncate_zero_means_unlimited() {
        let text = "a long document body";
        assert_eq!(truncate_chars(text, 0), text);
    }

    #[test]
    fn context_sorts_before_joining() {
        let texts = vec!["zebra".to_string(), "apple".to_string()];
        assert_eq!(assemble_context(&texts, 0), "apple\n\nzebra");
    }

    #[test]
    fn context_truncates_each_document() {
        let texts = vec!["aaaaaaaa".to_string(), "bbbbbbbb".to_string()];
        assert_eq!(assemble_context(&texts, 4), "aaaa\n\nbbbb");
    }

    #[test]
    fn empty_results_use_placeholder() {
        assert_eq!(assemble_context(&[], 100), NO_RESULTS_PLACEHOLDER);
    }

    #[test]
    fn identical_sets_produce_identical_context() {
        let a = vec!["one".to_string(), "two".to_string()];
        let b = vec!["two".to_string(), "one".to_string()];
        assert_eq!(assemble_context(&a, 0), assemble_context(&b, 0));
    }
}
