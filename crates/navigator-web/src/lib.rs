//! Course page loader: fetch, strip to visible text, split into chunks.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::Path;
use std::time::Duration;

use navigator_core::data_processor::{list_files_with_extensions, ChunkingConfig, DataProcessor};
use navigator_core::settings::ProcessorSettings;
use navigator_core::types::PageDocument;

mod html;

pub use html::extract_document;

const LOCAL_EXTENSIONS: &[&str] = &["html", "htm", "txt"];

pub struct WebPageProcessor {
    client: reqwest::Client,
    processor: DataProcessor,
    concurrency: usize,
}

impl WebPageProcessor {
    pub fn new(settings: &ProcessorSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("building HTTP client")?;
        let processor = DataProcessor::with_config(ChunkingConfig::from(settings))?;
        Ok(Self { client, processor, concurrency: settings.concurrency.max(1) })
    }

    /// Download and chunk `urls`. Chunks come out in URL order, then split
    /// order; pages that cannot be fetched are logged and skipped.
    pub async fn process(&self, urls: &[String]) -> Result<Vec<String>> {
        let docs = self.fetch_documents(urls).await;
        Ok(self.processor.chunk_documents(&docs))
    }

    pub async fn fetch_documents(&self, urls: &[String]) -> Vec<PageDocument> {
        let client = &self.client;
        let fetched: Vec<Option<PageDocument>> = stream::iter(urls)
            .map(|url| async move {
                match fetch_page(client, url).await {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        tracing::warn!(%url, error = %format!("{e:#}"), "skipping page");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        let docs: Vec<PageDocument> = fetched.into_iter().flatten().collect();
        tracing::info!(requested = urls.len(), loaded = docs.len(), "fetched course pages");
        docs
    }

    /// Chunk saved pages (`.html`, `.htm`, `.txt`) found under `dir`, in
    /// path order.
    pub fn process_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let files = list_files_with_extensions(dir, LOCAL_EXTENSIONS)?;
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no saved pages found");
            return Ok(Vec::new());
        }
        let mut docs = Vec::with_capacity(files.len());
        for path in &files {
            docs.push(read_local_document(path)?);
        }
        Ok(self.processor.chunk_documents(&docs))
    }
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<PageDocument> {
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;
    Ok(extract_document(&body, url))
}

fn read_local_document(path: &Path) -> Result<PageDocument> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => String::from_utf8_lossy(&fs::read(path).with_context(|| format!("reading {}", path.display()))?)
            .to_string(),
    };
    let source = path.to_string_lossy().to_string();
    let is_text = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if is_text {
        let title = path.file_stem().map(|s| s.to_string_lossy().to_string());
        Ok(PageDocument { title, source, content })
    } else {
        Ok(extract_document(&content, &source))
    }
}
