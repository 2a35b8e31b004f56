pub trait Embedder: Send + Sync {
    /// Width of every vector this embedder produces.
    fn dim(&self) -> usize;
    /// Maximum number of tokens considered per input text.
    fn max_len(&self) -> usize;
    /// One row per input text, in input order. An empty result means no
    /// embeddings were produced.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
