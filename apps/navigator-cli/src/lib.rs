//! Glue shared by the `navigator` and `navigator-indexer` binaries.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use navigator_advisor::{Advice, CompletionClient, CompletionOptions, CourseAdvisor, KnowledgeBase, OpenAiChatClient};
use navigator_core::config::Config;
use navigator_core::settings::Settings;
use navigator_embed::get_default_embedder;

pub fn load_settings() -> Result<Settings> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e:#}");
        e
    })?;
    config.settings()
}

/// Embedder, store (loaded or built on first start) and chat client.
pub async fn build_advisor(settings: &Settings) -> Result<CourseAdvisor<OpenAiChatClient>> {
    let embedder = get_default_embedder(&settings.embedding)?;
    let store = KnowledgeBase::new(settings, embedder.as_ref()).open_or_build().await?;
    let client = OpenAiChatClient::new(&settings.llm)?;
    Ok(CourseAdvisor::new(store, embedder, client, settings.retrieval.clone()))
}

pub fn completion_options(temperature: Option<f32>, max_tokens: Option<u32>) -> CompletionOptions {
    CompletionOptions { temperature, max_completion_tokens: max_tokens }
}

/// User-facing text for `advice`; the flag is false when no answer came back.
pub fn describe(advice: &Advice) -> (String, bool) {
    match advice {
        Advice::Answer(text) => (text.clone(), true),
        Advice::NoContext => ("База знаний пуста: сначала запустите navigator-indexer.".to_string(), false),
        Advice::EmptyResponse => ("Модель не вернула ответ. Попробуйте переформулировать вопрос.".to_string(), false),
        Advice::UpstreamFailed(reason) => (format!("Не удалось получить рекомендацию: {reason}"), false),
    }
}

/// One interactive question. Errors are turned into a message so the
/// session keeps going.
pub async fn chat_turn<C: CompletionClient>(
    advisor: &CourseAdvisor<C>,
    question: &str,
    options: &CompletionOptions,
) -> (String, bool) {
    match advisor.process_query(question, options).await {
        Ok(advice) => describe(&advice),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "question failed");
            (format!("Ошибка: {e:#}"), false)
        }
    }
}

pub fn embedding_progress() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} embedding [{bar:40}] {pos}/{len} chunks ({eta})")?.progress_chars("=> "),
    );
    Ok(bar)
}
