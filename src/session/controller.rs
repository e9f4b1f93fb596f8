//! Conversation session controller
//!
//! Owns the message history, the draft being typed and the loading flag.
//! Each submission is sent on its own tokio task; the settled result comes
//! back over a channel and is applied by whoever owns the controller (the
//! UI loop), so history is only ever touched from one place.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::message::{Message, MessageId, MessageIdAllocator, GREETING_ID};
use crate::api::{ApiResult, ChatBackend, ChatResponse};

/// Result of one outbound query, ready to be merged into history
#[derive(Debug)]
pub struct Settlement {
    /// Id of the user turn that triggered the request
    pub query_id: MessageId,
    pub outcome: ApiResult<ChatResponse>,
}

pub struct ConversationController {
    backend: Arc<dyn ChatBackend>,
    messages: Vec<Message>,
    draft: String,
    is_loading: bool,
    ids: MessageIdAllocator,
    settled_tx: mpsc::UnboundedSender<Settlement>,
    settled_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl ConversationController {
    /// Start a session whose history holds only the greeting
    pub fn new(backend: Arc<dyn ChatBackend>, greeting: impl Into<String>) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let greeting = Message::assistant(GREETING_ID, greeting.into(), Vec::new(), Utc::now());

        Self {
            backend,
            messages: vec![greeting],
            draft: String::new(),
            is_loading: false,
            ids: MessageIdAllocator::new(),
            settled_tx,
            settled_rx,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn endpoint(&self) -> &str {
        self.backend.endpoint()
    }

    /// True until the first question is asked
    pub fn shows_sample_questions(&self) -> bool {
        self.messages.len() == 1 && self.messages[0].id == GREETING_ID
    }

    /// Append `text` as a user turn and send it to the backend.
    ///
    /// Whitespace-only input is ignored and returns `None`. Otherwise the
    /// user turn is in history before this returns, the draft is cleared and
    /// the controller reports loading until the request settles. Nothing
    /// stops a second submission while one is in flight.
    pub fn submit(&mut self, text: &str) -> Option<MessageId> {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return None;
        }

        let now = Utc::now();
        let query_id = self.ids.next(now);
        self.messages.push(Message::user(query_id, text.to_string(), now));
        self.draft.clear();
        self.is_loading = true;

        let backend = Arc::clone(&self.backend);
        let settled_tx = self.settled_tx.clone();
        let query = text.to_string();

        tokio::spawn(async move {
            let outcome = backend.ask(&query).await;
            // The receiver lives in the controller; if it is gone there is
            // nobody left to show the answer to.
            let _ = settled_tx.send(Settlement { query_id, outcome });
        });

        debug!(query_id, "Query dispatched");
        Some(query_id)
    }

    /// Submit whatever is in the draft
    pub fn submit_draft(&mut self) -> Option<MessageId> {
        let text = self.draft.clone();
        self.submit(&text)
    }

    /// Merge a settled request into history.
    ///
    /// Success appends exactly one assistant turn and returns its id.
    /// Failure is logged and dropped. Either way loading ends.
    pub fn apply(&mut self, settlement: Settlement) -> Option<MessageId> {
        let Settlement { query_id, outcome } = settlement;

        let appended = match outcome {
            Ok(response) => {
                let now = Utc::now();
                let id = self.ids.next(now);
                let sources = response.sources.unwrap_or_default();
                info!(query_id, answer_id = id, sources = sources.len(), "Answer received");
                self.messages
                    .push(Message::assistant(id, response.answer, sources, now));
                Some(id)
            }
            Err(e) => {
                warn!(query_id, error = %e, "Chat request failed");
                None
            }
        };

        self.is_loading = false;
        appended
    }

    /// Wait for the next in-flight request to settle
    pub async fn next_settlement(&mut self) -> Option<Settlement> {
        self.settled_rx.recv().await
    }

    /// Wait for the next request to settle and apply it
    pub async fn settle_next(&mut self) -> Option<MessageId> {
        match self.next_settlement().await {
            Some(settlement) => self.apply(settlement),
            None => None,
        }
    }

    /// Apply every settlement that is already waiting, without blocking
    pub fn drain_settled(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(settlement) = self.settled_rx.try_recv() {
            self.apply(settlement);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Source;
    use crate::session::testing::{Reply, ScriptedBackend, GREETING};
    use crate::session::MessageRole;

    fn controller(backend: ScriptedBackend) -> ConversationController {
        ConversationController::new(Arc::new(backend), GREETING)
    }

    fn cited_answer() -> Reply {
        Reply::Answer(serde_json::json!({
            "answer": "X",
            "sources": [
                {"document": "d", "page": 1, "relevance": 0.9, "chunk": "c", "page_content": "p"}
            ]
        }))
    }

    #[test]
    fn test_starts_with_greeting_only() {
        let c = controller(ScriptedBackend::default());
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].id, GREETING_ID);
        assert_eq!(c.messages()[0].role, MessageRole::Assistant);
        assert_eq!(c.messages()[0].content, GREETING);
        assert!(!c.is_loading());
        assert!(c.shows_sample_questions());
    }

    #[test]
    fn test_blank_submission_is_a_no_op() {
        let mut c = controller(ScriptedBackend::default());
        c.set_draft("   \n\t ");

        assert_eq!(c.submit(""), None);
        assert_eq!(c.submit("   "), None);
        assert_eq!(c.submit_draft(), None);

        assert_eq!(c.messages().len(), 1);
        assert!(!c.is_loading());
        assert_eq!(c.draft(), "   \n\t ");
        assert!(c.shows_sample_questions());
    }

    #[tokio::test]
    async fn test_user_turn_is_appended_before_response() {
        let (backend, gate) = ScriptedBackend::default().gated_reply("q", cited_answer());
        let mut c = controller(backend);
        c.set_draft("q");

        let id = c.submit_draft().unwrap();

        assert_eq!(c.messages().len(), 2);
        let user = &c.messages()[1];
        assert_eq!(user.id, id);
        assert!(user.is_user());
        assert_eq!(user.content, "q");
        assert!(user.sources.is_empty());
        assert_eq!(c.draft(), "");
        assert!(c.is_loading());
        assert!(!c.shows_sample_questions());

        // Nothing arrives while the backend is still holding the reply.
        tokio::task::yield_now().await;
        assert_eq!(c.drain_settled(), 0);
        assert!(c.is_loading());
        assert_eq!(c.messages().len(), 2);

        gate.notify_one();
        assert!(c.settle_next().await.is_some());
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn test_successful_answer_appends_one_assistant_turn() {
        let mut c = controller(ScriptedBackend::default().reply("q", cited_answer()));

        c.submit("q");
        let answer_id = c.settle_next().await.unwrap();

        assert_eq!(c.messages().len(), 3);
        let answer = c.messages().last().unwrap();
        assert_eq!(answer.id, answer_id);
        assert!(answer.is_assistant());
        assert_eq!(answer.content, "X");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(
            answer.sources[0],
            Source {
                document: "d".to_string(),
                page: Some(1),
                relevance: Some(0.9),
                chunk: "c".to_string(),
                page_content: "p".to_string(),
                metadata: None,
            }
        );
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn test_missing_sources_become_empty() {
        let backend = ScriptedBackend::default()
            .reply("q", Reply::Answer(serde_json::json!({ "answer": "no citations" })));
        let mut c = controller(backend);

        c.submit("q");
        c.settle_next().await.unwrap();

        let answer = c.messages().last().unwrap();
        assert_eq!(answer.content, "no citations");
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_failure_appends_nothing_and_clears_loading() {
        let mut c = controller(ScriptedBackend::default().reply("q", Reply::Fail));

        c.submit("q");
        assert!(c.is_loading());
        assert_eq!(c.settle_next().await, None);

        assert_eq!(c.messages().len(), 2);
        assert!(c.messages()[1].is_user());
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn test_source_order_is_preserved() {
        let backend = ScriptedBackend::default().reply(
            "q",
            Reply::Answer(serde_json::json!({
                "answer": "ranked",
                "sources": [
                    {"page_content": "third", "relevance": 0.1},
                    {"page_content": "first", "relevance": 0.9},
                    {"page_content": "second", "relevance": 0.5}
                ]
            })),
        );
        let mut c = controller(backend);

        c.submit("q");
        c.settle_next().await.unwrap();

        let contents: Vec<&str> = c.messages()[2]
            .sources
            .iter()
            .map(|s| s.page_content.as_str())
            .collect();
        assert_eq!(contents, vec!["third", "first", "second"]);
    }

    #[tokio::test]
    async fn test_concurrent_answers_append_in_settlement_order() {
        let answer = |text: &str| Reply::Answer(serde_json::json!({ "answer": text }));
        let (backend, slow_gate) = ScriptedBackend::default().gated_reply("slow", answer("A1"));
        let (backend, fast_gate) = backend.gated_reply("fast", answer("A2"));
        let mut c = controller(backend);

        let slow_id = c.submit("slow").unwrap();
        let fast_id = c.submit("fast").unwrap();
        assert!(slow_id < fast_id);
        assert_eq!(c.messages().len(), 3);

        fast_gate.notify_one();
        let settlement = c.next_settlement().await.unwrap();
        assert_eq!(settlement.query_id, fast_id);
        c.apply(settlement);
        // A single flag: the first settlement ends loading.
        assert!(!c.is_loading());

        slow_gate.notify_one();
        c.settle_next().await.unwrap();

        let contents: Vec<&str> = c.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![GREETING, "slow", "fast", "A2", "A1"]);
    }

    #[tokio::test]
    async fn test_query_text_is_sent_untrimmed() {
        let backend = Arc::new(ScriptedBackend::default().reply("  spaced  ", cited_answer()));
        let mut c = ConversationController::new(backend.clone(), GREETING);

        c.submit("  spaced  ");
        c.settle_next().await.unwrap();

        assert_eq!(c.messages()[1].content, "  spaced  ");
        assert_eq!(backend.queries.lock().unwrap().as_slice(), ["  spaced  "]);
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let mut c = controller(ScriptedBackend::default().reply("q", cited_answer()));
        for _ in 0..3 {
            c.submit("q");
            c.settle_next().await.unwrap();
        }

        let ids: Vec<MessageId> = c.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {ids:?}");
    }
}
