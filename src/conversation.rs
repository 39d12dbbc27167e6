use crate::encoder::EncodedDocument;
use crate::error::{Result, StatementError};
use crate::language::Language;
use crate::schema::ChatMessage;
use crate::service::StatementService;
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What happened to a `send` call.
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank text, or a reply is already in flight. Nothing was appended.
    Ignored,
    /// The assistant's reply was appended.
    Replied,
    /// The call failed; a localized fallback line was appended instead.
    Degraded(StatementError),
    /// The conversation was cleared while the call was in flight.
    Discarded,
}

#[derive(Default)]
struct ConversationInner {
    document: Option<Arc<EncodedDocument>>,
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    epoch: u64,
}

/// Chat history about one analyzed statement.
///
/// History is append-only and attachment-free; the document is handed to the
/// service on every call and the proxy decides where it goes.
pub struct ConversationController {
    service: Arc<dyn StatementService>,
    inner: Mutex<ConversationInner>,
}

impl ConversationController {
    pub fn new(service: Arc<dyn StatementService>) -> Self {
        Self {
            service,
            inner: Mutex::new(ConversationInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConversationInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a fresh conversation about `document`.
    pub fn attach(&self, document: Arc<EncodedDocument>) {
        let mut inner = self.lock();
        inner.document = Some(document);
        inner.messages.clear();
        inner.awaiting_reply = false;
        inner.epoch += 1;
    }

    /// Drops the document and history. Replies still in flight are discarded when they land.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.document = None;
        inner.messages.clear();
        inner.awaiting_reply = false;
        inner.epoch += 1;
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.lock().awaiting_reply
    }

    pub fn has_document(&self) -> bool {
        self.lock().document.is_some()
    }

    pub async fn send(&self, text: &str, lang: Language) -> Result<SendOutcome> {
        let (document, history, epoch) = {
            let mut inner = self.lock();
            let document = inner.document.clone().ok_or(StatementError::NoDocument)?;

            let text = text.trim();
            if text.is_empty() || inner.awaiting_reply {
                return Ok(SendOutcome::Ignored);
            }

            inner.messages.push(ChatMessage::user(text));
            inner.awaiting_reply = true;
            (document, inner.messages.clone(), inner.epoch)
        };

        debug!("Sending chat turn {}", history.len());
        let result = self.service.chat(&document, &history, lang).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("Conversation reset while awaiting reply; dropping it");
            return Ok(SendOutcome::Discarded);
        }
        inner.awaiting_reply = false;

        match result {
            Ok(reply) => {
                inner.messages.push(ChatMessage::assistant(reply));
                Ok(SendOutcome::Replied)
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                inner
                    .messages
                    .push(ChatMessage::assistant(lang.chat_failure_message()));
                Ok(SendOutcome::Degraded(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{DocumentEncoder, FileCandidate, PDF_MEDIA_TYPE};
    use crate::schema::{Role, StatementData};
    use async_trait::async_trait;

    struct EchoService {
        fail: bool,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl StatementService for EchoService {
        async fn analyze(&self, _document: &EncodedDocument) -> Result<StatementData> {
            Ok(StatementData::default())
        }

        async fn chat(
            &self,
            _document: &EncodedDocument,
            messages: &[ChatMessage],
            lang: Language,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            tokio::task::yield_now().await;
            if self.fail {
                return Err(StatementError::RateLimited);
            }
            Ok(format!("[{}] {}", lang.code(), messages.len()))
        }
    }

    fn controller(fail: bool) -> (Arc<EchoService>, ConversationController) {
        let service = Arc::new(EchoService {
            fail,
            calls: Mutex::new(Vec::new()),
        });
        let controller = ConversationController::new(service.clone());
        let doc = DocumentEncoder::encode(&FileCandidate::new("a.pdf", PDF_MEDIA_TYPE, b"%PDF".to_vec()))
            .unwrap();
        controller.attach(Arc::new(doc));
        (service, controller)
    }

    #[tokio::test]
    async fn test_turns_alternate_in_call_order() {
        let (service, chat) = controller(false);

        assert!(matches!(chat.send("What were my fees?", Language::En).await, Ok(SendOutcome::Replied)));
        assert!(matches!(chat.send("And tips?", Language::Es).await, Ok(SendOutcome::Replied)));

        let messages = chat.messages();
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(messages[1].content, "[en] 1");
        assert_eq!(messages[3].content, "[es] 3");

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls[1].len(), 3);
        assert!(!chat.is_awaiting_reply());
    }

    #[tokio::test]
    async fn test_blank_text_is_ignored() {
        let (service, chat) = controller(false);
        assert!(matches!(chat.send("   ", Language::En).await, Ok(SendOutcome::Ignored)));
        assert!(chat.is_empty());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_appends_localized_fallback() {
        let (_, chat) = controller(true);
        let outcome = chat.send("What were my fees?", Language::Zh).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Degraded(StatementError::RateLimited)));

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ChatMessage::assistant(Language::Zh.chat_failure_message()));
        assert!(!chat.is_awaiting_reply());
    }

    #[tokio::test]
    async fn test_overlapping_send_is_ignored() {
        let (service, chat) = controller(false);
        let (first, second) = tokio::join!(
            chat.send("What were my fees?", Language::En),
            chat.send("And tips?", Language::En)
        );
        assert!(matches!(first, Ok(SendOutcome::Replied)));
        assert!(matches!(second, Ok(SendOutcome::Ignored)));
        assert_eq!(service.calls.lock().unwrap().len(), 1);
        assert_eq!(chat.len(), 2);
    }

    #[tokio::test]
    async fn test_send_after_clear_fails_fast() {
        let (service, chat) = controller(false);
        chat.send("What were my fees?", Language::En).await.unwrap();
        chat.clear();

        assert!(chat.is_empty());
        assert!(matches!(
            chat.send("And tips?", Language::En).await,
            Err(StatementError::NoDocument)
        ));
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }
}
