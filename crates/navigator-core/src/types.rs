//! Domain types shared by the store, the web processor and the advisor.

use serde::{Deserialize, Serialize};

/// One retrieved chunk.
///
/// `score` is the squared L2 distance between the query and the stored
/// vector: lower is better and `0.0` is an exact match. It is not a
/// similarity in `[0, 1]`; see [`SearchHit::cosine_similarity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: String,
    pub score: f64,
}

impl SearchHit {
    pub fn new(chunk: impl Into<String>, score: f64) -> Self {
        Self { chunk: chunk.into(), score }
    }

    /// Cosine similarity implied by `score`, valid only when both the query
    /// and the stored vector are unit length (`|a - b|^2 = 2 - 2cos`).
    pub fn cosine_similarity(&self) -> f64 {
        1.0 - self.score / 2.0
    }
}

/// A fetched page reduced to its title and visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    pub title: Option<String>,
    pub source: String,
    pub content: String,
}
