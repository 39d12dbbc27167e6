use thiserror::Error;

const UPSTREAM_FAILED: &str = "Upstream request failed";

/// Coarse classification used to decide who sees an error and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operator-facing: the proxy is missing its upstream credential.
    Configuration,
    /// User-facing and recoverable: bad, missing or oversized input.
    Validation,
    /// User-facing: wait and try again.
    UpstreamThrottled,
    /// User-facing generic failure; details stay in the logs.
    UpstreamFailure,
    /// Upstream text did not honor the statement contract.
    ContractViolation,
}

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Invalid file type '{0}': only PDF statements are accepted")]
    InvalidFileType(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("GEMINI_API_KEY is not configured")]
    UpstreamNotConfigured,

    #[error("{0}")]
    MissingInput(String),

    #[error("No messages provided")]
    NoMessages,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    #[error("API error: {status}")]
    UpstreamError { status: u16, message: String },

    #[error("Empty response from model")]
    EmptyUpstreamResponse,

    #[error("Model response is not valid JSON: {0}")]
    MalformedSchema(String),

    #[error("Statement contract violated: {0}")]
    ContractViolation(String),

    #[error("No analyzed statement is available for chat")]
    NoDocument,

    #[error("Cannot {action} while in state '{state}'")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("{message}")]
    Proxy { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[source] reqwest::Error),
}

// The request URL can carry credentials; it never goes into the error.
#[cfg(feature = "gemini")]
impl From<reqwest::Error> for StatementError {
    fn from(err: reqwest::Error) -> Self {
        StatementError::HttpError(err.without_url())
    }
}

impl StatementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamNotConfigured => ErrorKind::Configuration,
            Self::InvalidFileType(_)
            | Self::EmptyFile
            | Self::FileTooLarge { .. }
            | Self::MissingInput(_)
            | Self::NoMessages
            | Self::NoDocument
            | Self::InvalidTransition { .. } => ErrorKind::Validation,
            Self::RateLimited => ErrorKind::UpstreamThrottled,
            Self::MalformedSchema(_) | Self::ContractViolation(_) => ErrorKind::ContractViolation,
            Self::Proxy { status, .. } => match *status {
                429 => ErrorKind::UpstreamThrottled,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::UpstreamFailure,
            },
            _ => ErrorKind::UpstreamFailure,
        }
    }

    /// HTTP status the proxy endpoints answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Proxy { status, .. } => *status,
            _ => match self.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::UpstreamThrottled => 429,
                _ => 500,
            },
        }
    }

    /// Text safe to hand to an end user. Transport and decoding failures
    /// collapse to a fixed line; their details belong in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::SerializationError(_) | Self::IoError(_) => UPSTREAM_FAILED.to_string(),
            #[cfg(feature = "gemini")]
            Self::HttpError(_) => UPSTREAM_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;
