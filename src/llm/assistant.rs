use crate::error::{Result, StatementError};
use crate::language::{Language, LenientLanguage};
use crate::llm::client::GenerativeModel;
use crate::llm::prompts::chat_system_prompt;
use crate::llm::types::{Content, GenerationOptions};
use crate::schema::{ChatMessage, Role};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub pdf_base64: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub lang: LenientLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Rebuilds the upstream conversation from attachment-free history.
///
/// The PDF rides along on the first turn only, and only if that turn is the
/// user's. Later turns are text.
pub fn build_chat_contents(pdf_base64: &str, messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| match (idx, msg.role) {
            (0, Role::User) => Content::user_with_pdf(msg.content.clone(), pdf_base64),
            (_, Role::User) => Content::user(msg.content.clone()),
            (_, Role::Assistant) => Content::model(msg.content.clone()),
        })
        .collect()
}

/// Answers follow-up questions grounded in one attached statement.
pub struct DocumentAssistant {
    model: Option<Arc<dyn GenerativeModel>>,
    options: GenerationOptions,
}

impl DocumentAssistant {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, options: GenerationOptions) -> Self {
        Self { model, options }
    }

    pub async fn reply(&self, request: &ChatRequest) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or(StatementError::UpstreamNotConfigured)?;

        let pdf = request
            .pdf_base64
            .as_deref()
            .filter(|data| !data.is_empty())
            .ok_or_else(|| StatementError::MissingInput("No PDF data provided".to_string()))?;

        let messages = request
            .messages
            .as_deref()
            .filter(|messages| !messages.is_empty())
            .ok_or(StatementError::NoMessages)?;

        let lang: Language = request.lang.into();
        debug!(
            "Chat turn {} in language '{}'",
            messages.len(),
            lang.code()
        );

        model
            .generate(
                &chat_system_prompt(lang),
                build_chat_contents(pdf, messages),
                &self.options,
            )
            .await
    }
}
