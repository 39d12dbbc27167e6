//! # Statement Insight
//!
//! Turns a restaurant's monthly point-of-sale PDF statement into structured,
//! trilingual (English / simplified Chinese / Spanish) financial data via an
//! external document-understanding model, and answers follow-up questions
//! about the same statement.
//!
//! ## Pieces
//!
//! - **Encoding**: [`DocumentEncoder`] checks the media type and the 20 MiB
//!   ceiling, then base64-encodes the file.
//! - **Contract**: [`StatementData`] is what the analysis proxy emits and the
//!   display layer consumes. Every label is a parallel language triple.
//! - **Proxies** (`gemini` feature): [`llm::StatementAnalyzer`] and
//!   [`llm::DocumentAssistant`] talk to the upstream model; `server` exposes
//!   them over HTTP.
//! - **Client controllers**: [`IngestionStateMachine`] owns the
//!   upload → analysis → summary lifecycle and a [`ConversationController`]
//!   for chat about the analyzed statement.
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_insight::*;
//! use std::sync::Arc;
//!
//! let service = Arc::new(HttpStatementService::new("http://127.0.0.1:8787"));
//! let session = IngestionStateMachine::new(service);
//!
//! session.select_path("january.pdf".as_ref()).await?;
//! session.analyze().await?;
//!
//! if let Some(summary) = session.localized_summary(Language::Zh) {
//!     println!("{}: {}", summary.restaurant_name, summary.insights);
//! }
//! session.conversation().send("What were my fees?", Language::En).await?;
//! ```

pub mod conversation;
pub mod encoder;
pub mod error;
pub mod ingestion;
pub mod language;
pub mod schema;
pub mod service;

#[cfg(feature = "gemini")]
pub mod config;
#[cfg(feature = "gemini")]
pub mod llm;
#[cfg(feature = "server")]
pub mod server;

pub use conversation::{ConversationController, SendOutcome};
pub use encoder::{DocumentEncoder, EncodedDocument, FileCandidate, MAX_DOCUMENT_BYTES};
pub use error::{ErrorKind, Result, StatementError};
pub use ingestion::{AnalyzeOutcome, AppState, IngestionStateMachine};
pub use language::Language;
pub use schema::*;
pub use service::StatementService;

#[cfg(feature = "gemini")]
pub use config::ProxyConfig;
#[cfg(feature = "gemini")]
pub use service::HttpStatementService;
