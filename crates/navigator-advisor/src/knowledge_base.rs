//! Startup flow: reuse the saved store or build it from course pages.

use anyhow::{bail, Context, Result};
use std::path::Path;

use navigator_core::settings::Settings;
use navigator_core::traits::Embedder;
use navigator_vector::VectorStore;
use navigator_web::WebPageProcessor;

use crate::blocking::run_blocking;

pub struct KnowledgeBase<'a> {
    settings: &'a Settings,
    embedder: &'a dyn Embedder,
}

impl<'a> KnowledgeBase<'a> {
    pub fn new(settings: &'a Settings, embedder: &'a dyn Embedder) -> Self {
        Self { settings, embedder }
    }

    /// Load the store saved under `store.path`, or scrape `courses.urls`,
    /// embed, and save a new one.
    pub async fn open_or_build(&self) -> Result<VectorStore> {
        let prefix = self.settings.store.path_prefix();
        if VectorStore::exists(&prefix) {
            tracing::info!(prefix = %prefix.display(), "loading saved course store");
            return VectorStore::open(&prefix, self.embedder.dim())
                .with_context(|| format!("loading course store {}", prefix.display()));
        }
        tracing::info!(prefix = %prefix.display(), "no saved course store; building from course pages");
        let store = self.build_from_urls(&self.settings.courses.urls, |_, _| {}).await?;
        self.save(&store)?;
        Ok(store)
    }

    pub async fn build_from_urls<F>(&self, urls: &[String], progress: F) -> Result<VectorStore>
    where
        F: FnMut(usize, usize),
    {
        let processor = WebPageProcessor::new(&self.settings.processor)?;
        let chunks = processor.process(urls).await?;
        self.build_from_chunks(&chunks, progress)
    }

    pub fn build_from_dir<F>(&self, dir: &Path, progress: F) -> Result<VectorStore>
    where
        F: FnMut(usize, usize),
    {
        let processor = WebPageProcessor::new(&self.settings.processor)?;
        let chunks = processor.process_dir(dir)?;
        self.build_from_chunks(&chunks, progress)
    }

    /// Embed `chunks` in batches of `embedding.batch_size`. `progress` gets
    /// (embedded so far, total) after every batch.
    pub fn build_from_chunks<F>(&self, chunks: &[String], mut progress: F) -> Result<VectorStore>
    where
        F: FnMut(usize, usize),
    {
        // An empty store would be saved and then reused on every start.
        if chunks.is_empty() {
            bail!("no course content was loaded; refusing to build an empty store");
        }
        let mut store = VectorStore::new(self.embedder.dim())?;
        let batch_size = self.settings.embedding.batch_size.max(1);
        for batch in chunks.chunks(batch_size) {
            let vectors = run_blocking(|| self.embedder.embed_batch(batch))?;
            store.add(batch, &vectors)?;
            progress(store.len(), chunks.len());
        }
        tracing::info!(chunks = store.len(), dim = store.dimension(), "built course store");
        Ok(store)
    }

    pub fn save(&self, store: &VectorStore) -> Result<()> {
        let prefix = self.settings.store.path_prefix();
        store.save(&prefix).with_context(|| format!("saving course store {}", prefix.display()))
    }
}
