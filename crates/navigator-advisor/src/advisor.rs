use anyhow::{anyhow, Result};

use navigator_core::settings::RetrievalSettings;
use navigator_core::traits::Embedder;
use navigator_core::types::SearchHit;
use navigator_vector::VectorStore;

use crate::blocking::run_blocking;
use crate::client::{CompletionClient, CompletionOptions};
use crate::prompt::render_prompt;

/// What came back from a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Answer(String),
    /// Nothing was retrieved, so the model was not asked.
    NoContext,
    /// The model answered with no text.
    EmptyResponse,
    /// The completion call failed after retries.
    UpstreamFailed(String),
}

impl Advice {
    pub fn answer(&self) -> Option<&str> {
        match self {
            Advice::Answer(text) => Some(text),
            _ => None,
        }
    }
}

/// Retrieval-augmented course consultant.
pub struct CourseAdvisor<C: CompletionClient> {
    store: VectorStore,
    embedder: Box<dyn Embedder>,
    client: C,
    settings: RetrievalSettings,
}

impl<C: CompletionClient> CourseAdvisor<C> {
    pub fn new(store: VectorStore, embedder: Box<dyn Embedder>, client: C, settings: RetrievalSettings) -> Self {
        Self { store, embedder, client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Nearest stored chunks for `question`, closest first.
    pub fn search(&self, question: &str, k: usize) -> Result<Vec<SearchHit>> {
        let mut embedded = run_blocking(|| self.embedder.embed_batch(&[question.to_string()]))?;
        let query = embedded.pop().ok_or_else(|| anyhow!("embedder returned no vector for the question"))?;
        Ok(self.store.search(&query, k)?)
    }

    pub fn retrieve_context(&self, question: &str) -> Result<Vec<String>> {
        let hits = self.search(question, self.settings.top_k)?;
        tracing::debug!(hits = hits.len(), "retrieved context");
        Ok(hits.into_iter().map(|hit| hit.chunk).collect())
    }

    pub async fn generate_completion(&self, question: &str, context: &str, options: &CompletionOptions) -> Advice {
        let prompt = render_prompt(context, question);
        match self.client.complete(&prompt, options).await {
            Ok(Some(text)) => Advice::Answer(text),
            Ok(None) => {
                tracing::warn!("completion API returned no content");
                Advice::EmptyResponse
            }
            Err(e) => {
                tracing::warn!(error = %e, "error generating course advice");
                Advice::UpstreamFailed(e.to_string())
            }
        }
    }

    /// Retrieve, then answer. Embedding and store failures are errors;
    /// upstream failures are reported through [`Advice`].
    pub async fn process_query(&self, question: &str, options: &CompletionOptions) -> Result<Advice> {
        let contexts = self.retrieve_context(question)?;
        if contexts.is_empty() {
            tracing::info!("no course content indexed; skipping completion");
            return Ok(Advice::NoContext);
        }
        let context = contexts.join(&self.settings.separator);
        Ok(self.generate_completion(question, &context, options).await)
    }
}
