use crate::llm::client::{GeminiClient, GenerativeModel, GEMINI_BASE_URL};
use crate::llm::types::GenerationOptions;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Proxy configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream credential. Missing means every proxy call answers `UpstreamNotConfigured`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub chat_model: String,
    pub analysis_max_tokens: u32,
    pub chat_max_tokens: u32,
    pub bind_addr: SocketAddr,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEMINI_BASE_URL.to_string(),
            analysis_model: DEFAULT_MODEL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            analysis_max_tokens: 8192,
            chat_max_tokens: 2048,
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787))),
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: get("GEMINI_API_KEY"),
            base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            analysis_model: get("ANALYSIS_MODEL").unwrap_or(defaults.analysis_model),
            chat_model: get("CHAT_MODEL").unwrap_or(defaults.chat_model),
            analysis_max_tokens: get("ANALYSIS_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.analysis_max_tokens),
            chat_max_tokens: get("CHAT_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.chat_max_tokens),
            bind_addr: get("BIND_ADDR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The upstream model, or `None` when no credential is configured.
    pub fn upstream_model(&self) -> Option<Arc<dyn GenerativeModel>> {
        let key = self.api_key.clone()?;
        Some(Arc::new(GeminiClient::new(key).with_base_url(&self.base_url)))
    }

    pub fn analysis_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.analysis_model.clone(),
            max_output_tokens: self.analysis_max_tokens,
            response_mime_type: "application/json".to_string(),
        }
    }

    pub fn chat_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.chat_model.clone(),
            max_output_tokens: self.chat_max_tokens,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = ProxyConfig::from_lookup(|_| None);
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, GEMINI_BASE_URL);
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.chat_options().response_mime_type, "text/plain");
        assert_eq!(config.analysis_options().response_mime_type, "application/json");
    }

    #[test]
    fn test_reads_overrides_and_ignores_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_API_KEY", " secret "),
            ("CHAT_MODEL", "gemini-2.5-pro"),
            ("CHAT_MAX_TOKENS", "not-a-number"),
            ("BIND_ADDR", "0.0.0.0:9000"),
        ]);
        let config = ProxyConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.chat_model, "gemini-2.5-pro");
        assert_eq!(config.chat_max_tokens, 2048);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = ProxyConfig::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| "  ".to_string()));
        assert!(config.api_key.is_none());
        assert!(config.upstream_model().is_none());
        assert!(config.with_api_key("k").upstream_model().is_some());
    }
}
