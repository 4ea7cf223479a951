//! Cache key derivation.
//!
//! Search keys are kept human-readable so a cache file can be inspected
//! and individual entries deleted by hand. Chat keys hash the context
//! first, then the whole preimage, so arbitrarily large contexts never
//! bloat the key.

use sha2::{Digest, Sha256};

/// Key for a search response: `{index}|{query}|k={top_k}|semantic={0|1}`.
pub fn search_key(index: &str, query: &str, top_k: usize, semantic: bool) -> String {
    format!(
        "{index}|{query}|k={top_k}|semantic={}",
        u8::from(semantic)
    )
}

/// Key for a chat response: SHA-256 hex of
/// `{deployment}\n{query}\n{sha256_hex(context)}`.
pub fn chat_key(deployment: &str, query: &str, context: &str) -> String {
    let context_hash = hex::encode(Sha256::digest(context.as_bytes()));
    let mut hasher = Sha256::new();
    hasher.update(deployment.as_bytes());
    hasher.update(b"\n");
    hasher.update(query.as_bytes());
    hasher.update(b"\n");
    hasher.update(context_hash.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_format() {
        assert_eq!(search_key("idx", "hello", 3, false), "idx|hello|k=3|semantic=0");
        assert_eq!(search_key("idx", "hello", 3, true), "idx|hello|k=3|semantic=1");
    }

    #[test]
    fn search_key_deterministic() {
        let k1 = search_key("docs", "query text", 5, true);
        let k2 = search_key("docs", "query text", 5, true);
        assert_eq!(k1, k2);
    }

    #[test]
    fn search_key_differs_on_top_k() {
        let k1 = search_key("docs", "q", 1, false);
        let k2 = search_key("docs", "q", 3, false);
        assert_ne!(k1, k2);
    }

    #[test]
    fn search_key_differs_on_semantic_flag() {
        let k1 = search_key("docs", "q", 3, false);
        let k2 = search_key("docs", "q", 3, true);
        assert_ne!(k1, k2);
    }

    #[test]
    fn chat_key_deterministic() {
        let k1 = chat_key("gpt-4o-mini", "hello", "some context");
        let k2 = chat_key("gpt-4o-mini", "hello", "some context");
        assert_eq!(k1, k2);
    }

    #[test]
    fn chat_key_is_hex_digest() {
        let key = chat_key("dep", "q", "ctx");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn chat_key_differs_on_deployment() {
        let k1 = chat_key("dep-a", "q", "ctx");
        let k2 = chat_key("dep-b", "q", "ctx");
        assert_ne!(k1, k2);
    }

    #[test]
    fn chat_key_differs_on_query() {
        let k1 = chat_key("dep", "question one", "ctx");
        let k2 = chat_key("dep", "question two", "ctx");
        assert_ne!(k1, k2);
    }

    #[test]
    fn chat_key_differs_on_context() {
        let k1 = chat_key("dep", "q", "context one");
        let k2 = chat_key("dep", "q", "context two");
        assert_ne!(k1, k2);
    }
}
