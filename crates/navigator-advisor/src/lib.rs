//! Course advisor: retrieve course chunks for a question and ask a chat
//! model to recommend courses from them.

#![deny(unused_imports)]

pub mod advisor;
mod blocking;
pub mod client;
pub mod knowledge_base;
pub mod prompt;

pub use advisor::{Advice, CourseAdvisor};
pub use client::{CompletionClient, CompletionError, CompletionOptions, OpenAiChatClient};
pub use knowledge_base::KnowledgeBase;
pub use prompt::{render_prompt, QA_PROMPT};
