//! Typed application settings.
//!
//! Every constructor in the workspace takes the section it needs from
//! [`Settings`] instead of reading the process environment, so tests can
//! build any configuration in memory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::expand_path;
use crate::error::{Error, Result};

pub const DEFAULT_COURSE_URLS: &[&str] = &[
    "https://karpov.courses/analytics",
    "https://karpov.courses/systemdesign",
    "https://karpov.courses/data-driven",
    "https://karpov.courses/deep-learning",
    "https://karpov.courses/dataengineer-start",
    "https://karpov.courses/analytics-hard",
    "https://karpov.courses/dataengineer",
    "https://karpov.courses/ml-start",
    "https://karpov.courses/ml-hard",
    "https://karpov.courses/big-data-analytics",
    "https://karpov.courses/ml-engineering",
    "https://karpov.courses/simulator",
    "https://karpov.courses/simulator-ab",
    "https://karpov.courses/simulator-ds",
    "https://karpov.courses/pythonzero",
    "https://karpov.courses/mathsds",
    "https://karpov.courses/docker",
    "https://karpov.courses/simulator-sql",
    "https://karpov.courses/datavisualization",
    "https://karpov.courses/career/guide-ds",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub embedding: EmbeddingSettings,
    pub processor: ProcessorSettings,
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
    pub courses: CourseSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path prefix of the persisted store, without extension.
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { path: "data/course_store".to_string() }
    }
}

impl StoreSettings {
    pub fn path_prefix(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: String,
    pub model_name: String,
    pub max_len: usize,
    pub batch_size: usize,
    /// `auto`, `cpu`, `metal` or `cuda`.
    pub device: String,
    /// Use the deterministic hashing embedder instead of loading a model.
    pub fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: "models/multilingual-e5-small".to_string(),
            model_name: "intfloat/multilingual-e5-small".to_string(),
            max_len: 512,
            batch_size: 32,
            device: "auto".to_string(),
            fake: false,
            fake_dim: 384,
        }
    }
}

impl EmbeddingSettings {
    pub fn model_path(&self) -> PathBuf {
        expand_path(&self.model_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared by neighbouring chunks.
    pub chunk_overlap: usize,
    pub timeout_secs: u64,
    /// Pages fetched in parallel; results keep URL order.
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            timeout_secs: 30,
            concurrency: 4,
            user_agent: concat!("course-navigator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    /// Joins retrieved chunks into the prompt context.
    pub separator: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, separator: "\n".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSettings {
    pub urls: Vec<String>,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self { urls: DEFAULT_COURSE_URLS.iter().map(|u| (*u).to_string()).collect() }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.store.path.trim().is_empty() {
            return Err(Error::InvalidConfig("store.path must not be empty".into()));
        }
        if self.processor.chunk_size == 0 {
            return Err(Error::InvalidConfig("processor.chunk_size must be positive".into()));
        }
        if self.processor.chunk_overlap >= self.processor.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "processor.chunk_overlap ({}) must be smaller than processor.chunk_size ({})",
                self.processor.chunk_overlap, self.processor.chunk_size
            )));
        }
        if self.processor.concurrency == 0 {
            return Err(Error::InvalidConfig("processor.concurrency must be positive".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be positive".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be positive".into()));
        }
        if self.embedding.fake && self.embedding.fake_dim == 0 {
            return Err(Error::InvalidConfig("embedding.fake_dim must be positive".into()));
        }
        match self.embedding.device.as_str() {
            "auto" | "cpu" | "metal" | "cuda" => {}
            other => return Err(Error::InvalidConfig(format!("unknown embedding.device '{other}'"))),
        }
        Ok(())
    }
}
