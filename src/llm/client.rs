use crate::error::{Result, StatementError};
use crate::llm::types::*;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The external model both proxies talk to.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends one request and returns the first text part of the reply.
    async fn generate(
        &self,
        system_prompt: &str,
        contents: Vec<Content>,
        options: &GenerationOptions,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        contents: Vec<Content>,
        options: &GenerationOptions,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, options.model
        );

        let payload = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::user(system_prompt)),
            generation_config: GenerationConfig {
                response_mime_type: options.response_mime_type.clone(),
                max_output_tokens: options.max_output_tokens,
            },
        };

        debug!(
            "Calling model {} with {} turn(s)",
            options.model,
            payload.contents.len()
        );
        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            error!("Gemini API error (status {}): {}", status, err_text);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(StatementError::RateLimited);
            }
            return Err(StatementError::UpstreamError {
                status: status.as_u16(),
                message: err_text,
            });
        }

        let body: GenerateContentResponse = res.json().await?;
        first_text(body).ok_or(StatementError::EmptyUpstreamResponse)
    }
}

fn first_text(body: GenerateContentResponse) -> Option<String> {
    body.candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| match part {
            Part::Text { text } if !text.trim().is_empty() => Some(text),
            _ => None,
        })
}
