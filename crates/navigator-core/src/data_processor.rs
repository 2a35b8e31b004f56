use std::path::{Path, PathBuf};

use text_splitter::{ChunkConfig, TextSplitter};

use crate::error::{Error, Result};
use crate::settings::ProcessorSettings;
use crate::types::PageDocument;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters repeated at the start of the next chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 100 }
    }
}

impl From<&ProcessorSettings> for ChunkingConfig {
    fn from(settings: &ProcessorSettings) -> Self {
        Self { chunk_size: settings.chunk_size, chunk_overlap: settings.chunk_overlap }
    }
}

/// Splits page text into overlapping chunks and labels each chunk with the
/// page it came from.
pub struct DataProcessor {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl DataProcessor {
    pub fn new() -> Result<Self> {
        Self::with_config(ChunkingConfig::default())
    }

    pub fn with_config(chunking_config: ChunkingConfig) -> Result<Self> {
        let chunk_config = ChunkConfig::new(chunking_config.chunk_size)
            .with_overlap(chunking_config.chunk_overlap)
            .map_err(|e| Error::InvalidConfig(format!("chunking: {e}")))?;
        Ok(Self { splitter: TextSplitter::new(chunk_config) })
    }

    /// Raw split of `text`, in document order, without page labels.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.splitter.chunks(text).map(str::to_string).collect()
    }

    pub fn chunk_document(&self, doc: &PageDocument) -> Vec<String> {
        self.splitter
            .chunks(&doc.content)
            .map(|chunk| format_chunk(doc.title.as_deref(), &doc.source, chunk))
            .collect()
    }

    /// Chunks of every document, in document order then split order.
    pub fn chunk_documents(&self, docs: &[PageDocument]) -> Vec<String> {
        let chunks: Vec<String> = docs.iter().flat_map(|doc| self.chunk_document(doc)).collect();
        tracing::info!(documents = docs.len(), chunks = chunks.len(), "split documents into chunks");
        chunks
    }
}

/// Layout of a stored chunk: page title, page source, then the chunk text.
pub fn format_chunk(title: Option<&str>, source: &str, content: &str) -> String {
    let title = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(UNKNOWN);
    let source = if source.trim().is_empty() { UNKNOWN } else { source };
    format!("Page name:\n{title}\nPage source:\n{source}\nPage content:\n{content}\n")
}

/// Files under `root` whose extension is in `extensions`, sorted by path.
pub fn list_files_with_extensions(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("directory {}", root.display())));
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
        })
        .collect();
    files.sort();
    Ok(files)
}
