//! Client-side upload → analysis → summary lifecycle.
//!
//! ```text
//! upload ──select──▶ file-ready ──analyze──▶ loading ──ok──▶ summary
//!                      ▲   │ select                 └─err─▶ error
//!                      │   ▼                                  │
//!                      └───────────────── retry ◀─────────────┘
//! ```
//!
//! `reset` returns to `upload` from any state and discards the retained
//! document, the statement, and the chat history.

use crate::conversation::ConversationController;
use crate::encoder::{DocumentEncoder, EncodedDocument, FileCandidate};
use crate::error::{Result, StatementError};
use crate::language::Language;
use crate::schema::{LocalizedStatement, StatementData};
use crate::service::StatementService;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Upload,
    FileReady {
        document: Arc<EncodedDocument>,
    },
    Loading {
        document: Arc<EncodedDocument>,
    },
    Summary {
        document: Arc<EncodedDocument>,
        statement: Arc<StatementData>,
    },
    Error {
        document: Option<Arc<EncodedDocument>>,
        message: String,
    },
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Upload => "upload",
            AppState::FileReady { .. } => "file-ready",
            AppState::Loading { .. } => "loading",
            AppState::Summary { .. } => "summary",
            AppState::Error { .. } => "error",
        }
    }

    /// The file currently selected, if the state carries one.
    pub fn document(&self) -> Option<&Arc<EncodedDocument>> {
        match self {
            AppState::Upload => None,
            AppState::FileReady { document }
            | AppState::Loading { document }
            | AppState::Summary { document, .. } => Some(document),
            AppState::Error { document, .. } => document.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// Moved to `summary`.
    Completed,
    /// Moved to `error`.
    Failed,
    /// Another analysis was already running; nothing was sent.
    AlreadyRunning,
    /// The session was reset before the result arrived; the result was dropped.
    Superseded,
}

struct Session {
    state: AppState,
    epoch: u64,
}

pub struct IngestionStateMachine {
    service: Arc<dyn StatementService>,
    session: Mutex<Session>,
    conversation: ConversationController,
}

impl IngestionStateMachine {
    pub fn new(service: Arc<dyn StatementService>) -> Self {
        Self {
            conversation: ConversationController::new(service.clone()),
            service,
            session: Mutex::new(Session {
                state: AppState::Upload,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(session: &mut Session, next: AppState) {
        debug!("{} -> {}", session.state.name(), next.name());
        session.state = next;
    }

    pub fn state(&self) -> AppState {
        self.lock().state.clone()
    }

    pub fn conversation(&self) -> &ConversationController {
        &self.conversation
    }

    pub fn statement(&self) -> Option<Arc<StatementData>> {
        match &self.lock().state {
            AppState::Summary { statement, .. } => Some(statement.clone()),
            _ => None,
        }
    }

    /// The analyzed statement in one language, ready for display.
    pub fn localized_summary(&self, lang: Language) -> Option<LocalizedStatement> {
        self.statement().map(|statement| statement.localize(lang))
    }

    /// Accepts a new file in `upload` or `file-ready`. A rejected file leaves the state as it was.
    pub fn select_file(&self, file: &FileCandidate) -> Result<()> {
        self.check_can_select()?;
        let document = DocumentEncoder::encode(file)?;
        self.accept(document)
    }

    pub async fn select_path(&self, path: &Path) -> Result<()> {
        self.check_can_select()?;
        let document = DocumentEncoder::read_path(path).await?;
        self.accept(document)
    }

    fn check_can_select(&self) -> Result<()> {
        match &self.lock().state {
            AppState::Upload | AppState::FileReady { .. } => Ok(()),
            other => Err(StatementError::InvalidTransition {
                state: other.name(),
                action: "select a file",
            }),
        }
    }

    fn accept(&self, document: EncodedDocument) -> Result<()> {
        let mut session = self.lock();
        if !matches!(session.state, AppState::Upload | AppState::FileReady { .. }) {
            return Err(StatementError::InvalidTransition {
                state: session.state.name(),
                action: "select a file",
            });
        }

        info!("Selected '{}' ({} bytes)", document.filename(), document.size());
        Self::transition(
            &mut session,
            AppState::FileReady {
                document: Arc::new(document),
            },
        );
        Ok(())
    }

    /// Runs the analysis for the selected file. At most one call is ever in flight.
    pub async fn analyze(&self) -> Result<AnalyzeOutcome> {
        let (document, epoch) = {
            let mut session = self.lock();
            let document = match &session.state {
                AppState::FileReady { document } => document.clone(),
                AppState::Loading { .. } => return Ok(AnalyzeOutcome::AlreadyRunning),
                other => {
                    return Err(StatementError::InvalidTransition {
                        state: other.name(),
                        action: "analyze",
                    })
                }
            };
            Self::transition(
                &mut session,
                AppState::Loading {
                    document: document.clone(),
                },
            );
            (document, session.epoch)
        };

        let result = self.service.analyze(&document).await;

        let mut session = self.lock();
        if session.epoch != epoch {
            debug!("Session reset during analysis of '{}'", document.filename());
            return Ok(AnalyzeOutcome::Superseded);
        }

        match result {
            Ok(statement) => {
                info!(
                    "Analysis complete: {} / {}",
                    statement.restaurant_name, statement.period
                );
                self.conversation.attach(document.clone());
                Self::transition(
                    &mut session,
                    AppState::Summary {
                        document,
                        statement: Arc::new(statement),
                    },
                );
                Ok(AnalyzeOutcome::Completed)
            }
            Err(e) => {
                warn!("Analysis of '{}' failed: {}", document.filename(), e);
                Self::transition(
                    &mut session,
                    AppState::Error {
                        document: Some(document),
                        message: e.to_string(),
                    },
                );
                Ok(AnalyzeOutcome::Failed)
            }
        }
    }

    /// Leaves `error`: back to `file-ready` if a file is still selected, otherwise to `upload`.
    pub fn retry(&self) -> Result<()> {
        let mut session = self.lock();
        let next = match &session.state {
            AppState::Error {
                document: Some(document),
                ..
            } => AppState::FileReady {
                document: document.clone(),
            },
            AppState::Error { document: None, .. } => AppState::Upload,
            other => {
                return Err(StatementError::InvalidTransition {
                    state: other.name(),
                    action: "retry",
                })
            }
        };
        Self::transition(&mut session, next);
        Ok(())
    }

    pub fn reset(&self) {
        let mut session = self.lock();
        session.epoch += 1;
        self.conversation.clear();
        Self::transition(&mut session, AppState::Upload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::PDF_MEDIA_TYPE;
    use crate::schema::ChatMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeService {
        fail: bool,
        analyze_calls: AtomicUsize,
    }

    #[async_trait]
    impl StatementService for FakeService {
        async fn analyze(&self, _document: &EncodedDocument) -> Result<StatementData> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(StatementError::Proxy {
                    status: 500,
                    message: "API error: 503".into(),
                });
            }
            Ok(StatementData {
                restaurant_name: "Golden Dragon".into(),
                period: "January 2026".into(),
                ..Default::default()
            })
        }

        async fn chat(
            &self,
            _document: &EncodedDocument,
            _messages: &[ChatMessage],
            _lang: Language,
        ) -> Result<String> {
            Ok("ok".into())
        }
    }

    fn machine(fail: bool) -> (Arc<FakeService>, IngestionStateMachine) {
        let service = Arc::new(FakeService {
            fail,
            analyze_calls: AtomicUsize::new(0),
        });
        (service.clone(), IngestionStateMachine::new(service))
    }

    fn pdf() -> FileCandidate {
        FileCandidate::new("jan.pdf", PDF_MEDIA_TYPE, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn test_valid_file_moves_to_file_ready() {
        let (_, sm) = machine(false);
        assert_eq!(sm.state(), AppState::Upload);
        sm.select_file(&pdf()).unwrap();
        assert_eq!(sm.state().name(), "file-ready");
    }

    #[test]
    fn test_rejected_file_keeps_state() {
        let (_, sm) = machine(false);
        let err = sm
            .select_file(&FileCandidate::new("photo.png", "image/png", vec![1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, StatementError::InvalidFileType(_)));
        assert_eq!(sm.state(), AppState::Upload);
    }

    #[test]
    fn test_new_file_replaces_pending_one() {
        let (_, sm) = machine(false);
        sm.select_file(&pdf()).unwrap();
        sm.select_file(&FileCandidate::new("feb.pdf", PDF_MEDIA_TYPE, b"%PDF".to_vec()))
            .unwrap();
        assert_eq!(sm.state().document().unwrap().filename(), "feb.pdf");
    }

    #[tokio::test]
    async fn test_success_reaches_summary_and_enables_chat() {
        let (_, sm) = machine(false);
        sm.select_file(&pdf()).unwrap();

        assert_eq!(sm.analyze().await.unwrap(), AnalyzeOutcome::Completed);
        assert_eq!(sm.state().name(), "summary");
        assert!(sm.conversation().has_document());
        let view = sm.localized_summary(Language::En).unwrap();
        assert_eq!(view.restaurant_name, "Golden Dragon");
    }

    #[tokio::test]
    async fn test_failure_keeps_file_and_retry_returns_to_file_ready() {
        let (_, sm) = machine(true);
        sm.select_file(&pdf()).unwrap();

        assert_eq!(sm.analyze().await.unwrap(), AnalyzeOutcome::Failed);
        match sm.state() {
            AppState::Error { document, message } => {
                assert_eq!(document.unwrap().filename(), "jan.pdf");
                assert_eq!(message, "API error: 503");
            }
            other => panic!("expected error state, got {}", other.name()),
        }

        sm.retry().unwrap();
        assert_eq!(sm.state().name(), "file-ready");
    }

    #[tokio::test]
    async fn test_double_analyze_makes_one_call() {
        let (service, sm) = machine(false);
        sm.select_file(&pdf()).unwrap();

        let (first, second) = tokio::join!(sm.analyze(), sm.analyze());
        assert_eq!(first.unwrap(), AnalyzeOutcome::Completed);
        assert_eq!(second.unwrap(), AnalyzeOutcome::AlreadyRunning);
        assert_eq!(service.analyze_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_during_loading_drops_result() {
        let (_, sm) = machine(false);
        sm.select_file(&pdf()).unwrap();

        let (outcome, _) = tokio::join!(sm.analyze(), async { sm.reset() });
        assert_eq!(outcome.unwrap(), AnalyzeOutcome::Superseded);
        assert_eq!(sm.state(), AppState::Upload);
        assert!(!sm.conversation().has_document());
    }

    #[tokio::test]
    async fn test_analyze_without_file_is_invalid() {
        let (service, sm) = machine(false);
        assert!(matches!(
            sm.analyze().await,
            Err(StatementError::InvalidTransition { state: "upload", .. })
        ));
        assert_eq!(service.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_retry_outside_error_is_invalid() {
        let (_, sm) = machine(false);
        assert!(sm.retry().is_err());
    }
}
