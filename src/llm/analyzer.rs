use crate::error::{Result, StatementError};
use crate::llm::client::GenerativeModel;
use crate::llm::prompts::{analysis_system_prompt, analysis_user_text};
use crate::llm::types::{Content, GenerationOptions};
use crate::llm::utils::strip_code_fences;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub pdf_base64: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Success body of the analysis endpoint. `data` is the model's JSON as parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub data: Value,
}

/// Turns an encoded statement into a [`crate::StatementData`]-shaped JSON value.
pub struct StatementAnalyzer {
    model: Option<Arc<dyn GenerativeModel>>,
    options: GenerationOptions,
    system_prompt: String,
}

impl StatementAnalyzer {
    /// `model` is `None` when no upstream credential is configured; every call then fails.
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, options: GenerationOptions) -> Result<Self> {
        Ok(Self {
            model,
            options,
            system_prompt: analysis_system_prompt()?,
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<Value> {
        let model = self
            .model
            .as_ref()
            .ok_or(StatementError::UpstreamNotConfigured)?;

        let pdf = request
            .pdf_base64
            .as_deref()
            .filter(|data| !data.is_empty())
            .ok_or_else(|| StatementError::MissingInput("No PDF data provided".to_string()))?;

        let contents = vec![Content::user_with_pdf(
            analysis_user_text(request.filename.as_deref()),
            pdf,
        )];

        let raw = model
            .generate(&self.system_prompt, contents, &self.options)
            .await?;

        let data = parse_statement_json(&raw)?;
        #[cfg(feature = "strict-schema")]
        enforce_contract(&data)?;

        info!(
            "Analyzed statement {:?}: {} / {}",
            request.filename.as_deref().unwrap_or("<unnamed>"),
            data.get("restaurant_name").and_then(Value::as_str).unwrap_or("?"),
            data.get("period").and_then(Value::as_str).unwrap_or("?"),
        );

        Ok(data)
    }
}

/// Strips any code fence and parses the rest as JSON. No field-level checks.
pub fn parse_statement_json(raw: &str) -> Result<Value> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|e| {
        warn!("Model returned unparseable statement JSON: {}", e);
        StatementError::MalformedSchema(e.to_string())
    })
}

#[cfg(feature = "strict-schema")]
fn enforce_contract(data: &Value) -> Result<()> {
    let statement: crate::schema::StatementData = serde_json::from_value(data.clone())
        .map_err(|e| StatementError::ContractViolation(e.to_string()))?;
    let problems = statement.check_contract();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(StatementError::ContractViolation(problems.join("; ")))
    }
}
