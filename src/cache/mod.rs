//! Persistent response caching.
//!
//! Two cache files back the experiment driver: one for search responses
//! (keyed by a readable `index|query|k|semantic` string) and one for chat
//! responses (keyed by a SHA-256 digest). Both use the same flat-file
//! [`FileCache`] store — load whole, rewrite whole, no eviction, no TTL.

pub mod key;
pub mod store;

pub use key::{chat_key, search_key};
pub use store::FileCache;
