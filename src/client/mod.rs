//! HTTP clients for the driven services.
//!
//! [`Transport`] is the seam everything speaks through;
//! [`RetryingTransport`] adds bounded backoff on overload, and the
//! search/chat clients shape requests for their respective services.

pub mod chat;
pub mod retry;
pub mod search;
pub mod shaping;
pub mod transport;

pub use chat::{ChatClient, ChatOutcome, Usage};
pub use retry::{RetryConfig, RetryingTransport};
pub use search::{SearchClient, doc_text};
pub use shaping::QueryShape;
pub use transport::{HttpTransport, Transport};
