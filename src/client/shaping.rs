//! Query shaping with ordered downgrade.
//!
//! A [`QueryShape`] describes one way to dress a search request; shapes
//! are tried in order and each knows the error signatures that justify
//! stepping past it to the next. The shipped chain is semantic → keyword:
//! services without semantic ranking reject the semantic shape with a
//! recognizable error body, and the request is reissued exactly once in
//! plain keyword form. Extending the chain (e.g. stripping highlight or
//! field-restriction options) is adding an element, not new control flow.

use crate::RagsweepError;

/// Error-body substrings that identify "semantic ranking unavailable".
const SEMANTIC_UNAVAILABLE: &[&str] = &[
    "Semantic search is not enabled",
    "SemanticQueriesNotAvailable",
];

/// One way of shaping a search request.
#[derive(Debug, Clone, Copy)]
pub struct QueryShape {
    /// Short label for logs ("semantic" | "keyword").
    pub label: &'static str,
    /// Whether the request carries semantic ranking parameters.
    pub semantic: bool,
    downgrade_signatures: &'static [&'static str],
}

/// Semantic ranking with the service-side `default` configuration.
pub const SEMANTIC: QueryShape = QueryShape {
    label: "semantic",
    semantic: true,
    downgrade_signatures: SEMANTIC_UNAVAILABLE,
};

/// Plain keyword search, the terminal shape — nothing left to strip.
pub const KEYWORD: QueryShape = QueryShape {
    label: "keyword",
    semantic: false,
    downgrade_signatures: &[],
};

impl QueryShape {
    /// The ordered shape chain for a request.
    pub fn chain(semantic: bool) -> &'static [QueryShape] {
        if semantic {
            &[SEMANTIC, KEYWORD]
        } else {
            &[KEYWORD]
        }
    }

    /// Whether `error` is a signal to step past this shape.
    ///
    /// Only terminal API errors qualify — an exhausted retry loop or a
    /// network failure would fail the next shape the same way.
    pub fn downgrades_on(&self, error: &RagsweepError) -> bool {
        let RagsweepError::Api { message, .. } = error else {
            return false;
        };
        self.downgrade_signatures
            .iter()
            .any(|sig| message.contains(sig))
    }
}
