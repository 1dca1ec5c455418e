use log::{ debug, error, info };
use std::sync::Arc;
use uuid::Uuid;

use crate::client::{ ChatClient, ReplyOutcome, TransportError };
use crate::history::{ load_conversation, save_conversation, KeyValueStore };
use crate::models::chat::{ ChatMessage, Conversation, Role };
use crate::view::{ Bubble, ChatView };

pub const DEFAULT_HISTORY_KEY: &str = "chatHistory";
pub const NO_REPLY_TEXT: &str = "No reply";

/// Named UI actions the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Load,
    Submit(String),
    Reset,
}

/// A user message whose reply has not arrived yet, tagged with the
/// conversation it was sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub conversation_id: Uuid,
    pub text: String,
}

/// Text of the bot bubble for any result of an exchange.
pub fn bot_text_for(result: &Result<ReplyOutcome, TransportError>) -> String {
    match result {
        Ok(ReplyOutcome::Reply(Some(reply))) if !reply.is_empty() => reply.clone(),
        Ok(ReplyOutcome::Reply(_)) => NO_REPLY_TEXT.to_string(),
        Ok(ReplyOutcome::AppError { status, body }) => format!("Error {}: {}", status, body),
        Err(e) => format!("Network error: {}", e),
    }
}

pub struct ChatWidget<V: ChatView> {
    conversation: Conversation,
    store: Arc<dyn KeyValueStore>,
    history_key: String,
    client: Arc<dyn ChatClient>,
    view: V,
}

impl<V: ChatView> ChatWidget<V> {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        history_key: impl Into<String>,
        client: Arc<dyn ChatClient>,
        view: V
    ) -> Self {
        Self {
            conversation: Conversation::new(),
            store,
            history_key: history_key.into(),
            client,
            view,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn client(&self) -> Arc<dyn ChatClient> {
        self.client.clone()
    }

    pub async fn dispatch(&mut self, action: UiAction) {
        match action {
            UiAction::Load => self.initialize().await,
            UiAction::Submit(raw) => self.submit_message(&raw).await,
            UiAction::Reset => self.start_new_conversation().await,
        }
    }

    /// Rehydrates the conversation from storage and draws it without writing
    /// anything back.
    pub async fn initialize(&mut self) {
        let messages = load_conversation(self.store.as_ref(), &self.history_key).await;
        info!("Restored {} message(s) from '{}'", messages.len(), self.history_key);

        self.conversation = Conversation::new();
        if self.view.bubble_count() > 0 {
            self.view.clear_bubbles();
        }
        for message in messages {
            self.render_bubble(&message.text, message.role, false).await;
            self.conversation.push(message);
        }
        self.view.scroll_to_latest();
    }

    pub async fn submit_message(&mut self, raw_input: &str) {
        let Some(pending) = self.begin_submit(raw_input).await else {
            return;
        };
        let result = self.client.send(&pending.text).await;
        self.complete_submit(pending, result).await;
    }

    /// Records the user's message and readies the input for the next one.
    /// Whitespace-only input is ignored and yields `None`.
    pub async fn begin_submit(&mut self, raw_input: &str) -> Option<PendingReply> {
        let text = raw_input.trim();
        if text.is_empty() {
            return None;
        }

        self.render_bubble(text, Role::User, true).await;
        self.view.clear_input();
        self.view.focus_input();

        debug!("Sending message to {}", self.client.endpoint());
        Some(PendingReply {
            conversation_id: self.conversation.id,
            text: text.to_string(),
        })
    }

    /// Renders the reply as a bot bubble. Replies that belong to a
    /// conversation which has since been reset are dropped; returns whether
    /// the reply was shown.
    pub async fn complete_submit(
        &mut self,
        pending: PendingReply,
        result: Result<ReplyOutcome, TransportError>
    ) -> bool {
        if pending.conversation_id != self.conversation.id {
            debug!(
                "Dropping reply to '{}': conversation {} was reset",
                pending.text,
                pending.conversation_id
            );
            return false;
        }

        match &result {
            Ok(ReplyOutcome::AppError { status, .. }) => {
                info!("Chat endpoint answered with status {}", status);
            }
            Err(e) => {
                info!("Chat request failed: {}", e);
            }
            Ok(ReplyOutcome::Reply(_)) => {}
        }

        let text = bot_text_for(&result);
        self.render_bubble(&text, Role::Bot, true).await;
        true
    }

    pub async fn render_bubble(&mut self, text: &str, role: Role, persist: bool) {
        let bubble = Bubble::new(self.view.bubble_count(), text, role);
        self.view.append_bubble(&bubble);

        if persist {
            self.conversation.push(ChatMessage::new(text, role));
            self.save().await;
        }
        self.view.scroll_to_latest();
    }

    pub async fn start_new_conversation(&mut self) {
        self.conversation.reset();
        self.save().await;
        self.view.clear_bubbles();
        self.view.focus_input();
        info!("Started a new conversation");
    }

    async fn save(&self) {
        if let Err(e) = save_conversation(
            self.store.as_ref(),
            &self.history_key,
            &self.conversation.messages
        ).await {
            error!("Could not save chat history '{}': {}", self.history_key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use crate::view::RecordingView;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<ReplyOutcome, TransportError>>>,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<ReplyOutcome, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn send(&self, message: &str) -> Result<ReplyOutcome, TransportError> {
            self.sent.lock().unwrap().push(message.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(TransportError::Other("no scripted reply".into()));
            }
            replies.remove(0)
        }

        fn endpoint(&self) -> String {
            "scripted".into()
        }
    }

    fn widget(
        store: Arc<MemoryStore>,
        client: Arc<ScriptedClient>
    ) -> ChatWidget<RecordingView> {
        ChatWidget::new(store, DEFAULT_HISTORY_KEY, client, RecordingView::new())
    }

    async fn persisted(store: &MemoryStore) -> Vec<ChatMessage> {
        load_conversation(store, DEFAULT_HISTORY_KEY).await
    }

    #[tokio::test]
    async fn blank_input_is_a_silent_no_op() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![]);
        let mut w = widget(store.clone(), client.clone());

        w.submit_message("   \t\n").await;
        w.submit_message("").await;

        assert!(w.conversation().is_empty());
        assert!(w.view().bubbles.is_empty());
        assert!(client.sent().is_empty());
        assert_eq!(store.get_item(DEFAULT_HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn user_message_is_recorded_before_the_request() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![]);
        let mut w = widget(store.clone(), client.clone());
        w.view_mut().input = "  hello  ".into();

        let pending = w.begin_submit("  hello  ").await.unwrap();
        assert_eq!(pending.text, "hello");
        assert_eq!(w.conversation().messages, vec![ChatMessage::new("hello", Role::User)]);
        assert_eq!(persisted(&store).await, w.conversation().messages);
        assert!(w.view().input.is_empty());
        assert!(w.view().focused);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn successful_exchange_persists_both_turns() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Ok(ReplyOutcome::Reply(Some("hi there".into())))]);
        let mut w = widget(store.clone(), client.clone());

        w.submit_message("hello").await;

        assert_eq!(client.sent(), vec!["hello".to_string()]);
        let raw = store.get_item(DEFAULT_HISTORY_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"text":"hello","role":"user"},{"text":"hi there","role":"bot"}]"#);
        assert_eq!(
            w.view().texts(),
            vec![(Role::User, "hello".to_string()), (Role::Bot, "hi there".to_string())]
        );
        assert_eq!(w.view().scrolled_to, Some(1));
    }

    #[tokio::test]
    async fn empty_or_missing_reply_uses_placeholder() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![
            Ok(ReplyOutcome::Reply(None)),
            Ok(ReplyOutcome::Reply(Some(String::new()))),
        ]);
        let mut w = widget(store, client);

        w.submit_message("one").await;
        w.submit_message("two").await;

        let bot: Vec<_> = w.conversation().messages
            .iter()
            .filter(|m| m.role == Role::Bot)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(bot, vec![NO_REPLY_TEXT, NO_REPLY_TEXT]);
    }

    #[tokio::test]
    async fn application_error_becomes_a_bot_turn() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Ok(ReplyOutcome::AppError {
            status: 500,
            body: "server error".into(),
        })]);
        let mut w = widget(store.clone(), client);

        w.submit_message("hello").await;

        let last = w.conversation().messages.last().unwrap().clone();
        assert_eq!(last.role, Role::Bot);
        assert!(last.text.contains("500"));
        assert!(last.text.contains("server error"));
        assert_eq!(persisted(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_bot_turn() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Err(TransportError::Other("Failed to fetch".into()))]);
        let mut w = widget(store, client.clone());

        w.submit_message("hello").await;

        let last = w.conversation().messages.last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert!(last.text.contains("Failed to fetch"));
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn reload_reproduces_history_without_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Ok(ReplyOutcome::Reply(Some("**hi**".into())))]);
        let mut first = widget(store.clone(), client.clone());
        first.submit_message("hello").await;
        let before = persisted(&store).await;

        let mut second = widget(store.clone(), client);
        second.dispatch(UiAction::Load).await;

        assert_eq!(second.conversation().messages, before);
        assert_eq!(persisted(&store).await, before);
        assert_eq!(second.view().bubbles.len(), 2);
        assert_eq!(second.view().bubbles[1].html(), "<div class=\"chat-message bot\"><strong>hi</strong></div>");
        assert_eq!(second.view().scrolled_to, Some(1));
    }

    #[tokio::test]
    async fn loading_twice_does_not_duplicate_bubbles() {
        let store = Arc::new(MemoryStore::new());
        save_conversation(
            store.as_ref(),
            DEFAULT_HISTORY_KEY,
            &[ChatMessage::new("hello", Role::User)]
        ).await.unwrap();
        let mut w = widget(store, ScriptedClient::new(vec![]));

        w.dispatch(UiAction::Load).await;
        w.dispatch(UiAction::Load).await;

        assert_eq!(w.conversation().messages.len(), 1);
        assert_eq!(w.view().bubbles.len(), w.conversation().messages.len());
        assert_eq!(w.view().texts(), vec![(Role::User, "hello".to_string())]);
    }

    #[tokio::test]
    async fn malformed_storage_initializes_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(DEFAULT_HISTORY_KEY, "[{\"text\":1}]").await.unwrap();
        let mut w = widget(store, ScriptedClient::new(vec![]));

        w.initialize().await;

        assert!(w.conversation().is_empty());
        assert!(w.view().bubbles.is_empty());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Ok(ReplyOutcome::Reply(Some("hi".into())))]);
        let mut w = widget(store.clone(), client);
        w.submit_message("hello").await;

        w.dispatch(UiAction::Reset).await;
        let once = (w.conversation().messages.clone(), w.view().texts(), store.get_item(DEFAULT_HISTORY_KEY).await.unwrap());
        w.dispatch(UiAction::Reset).await;
        let twice = (w.conversation().messages.clone(), w.view().texts(), store.get_item(DEFAULT_HISTORY_KEY).await.unwrap());

        assert_eq!(once, twice);
        assert!(once.0.is_empty());
        assert_eq!(once.2.as_deref(), Some("[]"));
        assert!(w.view().focused);
    }

    #[tokio::test]
    async fn stale_reply_after_reset_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let mut w = widget(store.clone(), ScriptedClient::new(vec![]));

        let pending = w.begin_submit("hello").await.unwrap();
        w.start_new_conversation().await;
        let shown = w
            .complete_submit(pending, Ok(ReplyOutcome::Reply(Some("late".into()))))
            .await;

        assert!(!shown);
        assert!(w.conversation().is_empty());
        assert!(w.view().bubbles.is_empty());
        assert!(persisted(&store).await.is_empty());
    }

    #[tokio::test]
    async fn dispatch_submit_runs_the_full_cycle() {
        let store = Arc::new(MemoryStore::new());
        let client = ScriptedClient::new(vec![Ok(ReplyOutcome::Reply(Some("pong".into())))]);
        let mut w = widget(store, client);

        w.dispatch(UiAction::Submit(" ping ".into())).await;

        assert_eq!(
            w.view().texts(),
            vec![(Role::User, "ping".to_string()), (Role::Bot, "pong".to_string())]
        );
    }

    #[test]
    fn bot_text_formats_each_outcome() {
        assert_eq!(bot_text_for(&Ok(ReplyOutcome::Reply(Some("x".into())))), "x");
        assert_eq!(
            bot_text_for(&Ok(ReplyOutcome::AppError { status: 502, body: "bad".into() })),
            "Error 502: bad"
        );
        assert_eq!(
            bot_text_for(&Err(TransportError::Other("Failed to fetch".into()))),
            "Network error: Failed to fetch"
        );
    }
}
