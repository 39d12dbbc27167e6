use crate::encoder::EncodedDocument;
use crate::error::Result;
use crate::language::Language;
use crate::schema::{ChatMessage, StatementData};
use async_trait::async_trait;

#[cfg(feature = "gemini")]
pub use http::HttpStatementService;

pub const ANALYZE_PATH: &str = "/analyze-statement";
pub const CHAT_PATH: &str = "/chat-statement";

/// What the client-side controllers need from the proxies.
#[async_trait]
pub trait StatementService: Send + Sync {
    async fn analyze(&self, document: &EncodedDocument) -> Result<StatementData>;

    async fn chat(
        &self,
        document: &EncodedDocument,
        messages: &[ChatMessage],
        lang: Language,
    ) -> Result<String>;
}

#[cfg(feature = "gemini")]
mod http {
    use super::{StatementService, ANALYZE_PATH, CHAT_PATH};
    use crate::encoder::EncodedDocument;
    use crate::error::{Result, StatementError};
    use crate::language::{Language, LenientLanguage};
    use crate::llm::{AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse};
    use crate::schema::{ChatMessage, StatementData};
    use async_trait::async_trait;
    use log::debug;
    use reqwest::Client;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Serialize};

    /// Calls a running proxy over HTTP.
    #[derive(Clone)]
    pub struct HttpStatementService {
        client: Client,
        base_url: String,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    impl HttpStatementService {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                client: Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }
        }

        async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
        where
            B: Serialize + Sync,
            R: DeserializeOwned,
        {
            let url = format!("{}{}", self.base_url, path);
            let res = self.client.post(&url).json(body).send().await?;
            let status = res.status();
            let text = res.text().await?;
            debug!("POST {} -> {}", url, status);

            if !status.is_success() {
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .map(|body| body.error)
                    .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
                return Err(StatementError::Proxy {
                    status: status.as_u16(),
                    message,
                });
            }

            Ok(serde_json::from_str(&text)?)
        }
    }

    #[async_trait]
    impl StatementService for HttpStatementService {
        async fn analyze(&self, document: &EncodedDocument) -> Result<StatementData> {
            let request = AnalyzeRequest {
                pdf_base64: Some(document.data().to_string()),
                filename: Some(document.filename().to_string()),
            };
            let response: AnalyzeResponse = self.post(ANALYZE_PATH, &request).await?;
            serde_json::from_value(response.data)
                .map_err(|e| StatementError::MalformedSchema(e.to_string()))
        }

        async fn chat(
            &self,
            document: &EncodedDocument,
            messages: &[ChatMessage],
            lang: Language,
        ) -> Result<String> {
            let request = ChatRequest {
                pdf_base64: Some(document.data().to_string()),
                messages: Some(messages.to_vec()),
                lang: LenientLanguage(lang),
            };
            let response: ChatResponse = self.post(CHAT_PATH, &request).await?;
            Ok(response.reply)
        }
    }
}
