use crate::encoder::PDF_MEDIA_TYPE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inline_data", alias = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// An inline PDF from its base64 payload.
    pub fn pdf(data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: PDF_MEDIA_TYPE.to_string(),
                data: data.into(),
            },
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::text(text)],
        }
    }

    /// A user turn carrying the PDF ahead of its text.
    pub fn user_with_pdf(text: impl Into<String>, pdf_base64: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::pdf(pdf_base64), Part::text(text)],
        }
    }

    pub fn has_document(&self) -> bool {
        self.parts.iter().any(Part::is_document)
    }
}

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    pub response_mime_type: String,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}
