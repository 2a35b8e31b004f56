use std::path::Path;

use navigator_core::types::SearchHit;

use crate::error::{Result, StoreError};
use crate::index::FlatL2Index;
use crate::persist;

/// Append-only collection of (vector, text) pairs with exact L2 search.
///
/// Row `i` of the index belongs to `texts[i]`. Every mutation validates its
/// input first, so the two containers always have the same length.
///
/// The store does no locking of its own: share it between tasks behind a
/// `Mutex`/`RwLock`.
#[derive(Debug, Clone)]
pub struct VectorStore {
    index: FlatL2Index,
    texts: Vec<String>,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Result<Self> {
        Ok(Self { index: FlatL2Index::new(dimension)?, texts: Vec::new() })
    }

    /// A store of `dimension` filled from the files at `prefix`.
    pub fn open(prefix: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let mut store = Self::new(dimension)?;
        store.load(prefix)?;
        Ok(store)
    }

    pub fn dimension(&self) -> usize {
        self.index.dim()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Append `texts[i]` paired with `vectors[i]`, in order.
    ///
    /// Does nothing when either side is empty. Fails without modifying the
    /// store on a length or width mismatch.
    pub fn add(&mut self, texts: &[String], vectors: &[Vec<f32>]) -> Result<()> {
        if texts.is_empty() || vectors.is_empty() {
            return Ok(());
        }
        if texts.len() != vectors.len() {
            return Err(StoreError::LengthMismatch { texts: texts.len(), vectors: vectors.len() });
        }
        self.index.add(vectors)?;
        self.texts.extend_from_slice(texts);
        tracing::debug!(added = texts.len(), total = self.texts.len(), "added chunks to store");
        Ok(())
    }

    /// The `k` stored chunks nearest to `query`, closest first.
    ///
    /// `k` is clamped to the number of stored chunks, so an empty store gives
    /// an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let neighbors = self.index.search(query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|(row, distance)| SearchHit::new(self.texts[row].clone(), f64::from(distance)))
            .collect())
    }

    /// Search with each row of a query matrix; a `1 x d` matrix yields a
    /// single result list.
    pub fn search_matrix(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<SearchHit>>> {
        queries.iter().map(|q| self.search(q, k)).collect()
    }

    /// Write `<prefix>.index` and `<prefix>.json`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        persist::save_pair(prefix, &self.index, &self.texts)?;
        tracing::info!(prefix = %prefix.display(), chunks = self.len(), "saved vector store");
        Ok(())
    }

    /// Replace the contents with the files at `prefix`.
    ///
    /// On any error the current contents are kept.
    pub fn load(&mut self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        let (index, texts) = persist::load_pair(prefix)?;
        if index.dim() != self.dimension() {
            return Err(StoreError::DimensionMismatch { expected: self.dimension(), actual: index.dim() });
        }
        self.index = index;
        self.texts = texts;
        tracing::info!(prefix = %prefix.display(), chunks = self.len(), "loaded vector store");
        Ok(())
    }

    pub fn exists(prefix: impl AsRef<Path>) -> bool {
        persist::exists(prefix.as_ref())
    }
}
