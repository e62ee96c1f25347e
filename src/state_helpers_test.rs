use super::*;
use std::sync::Mutex;

use crate::llm::types::{ChatResponse, ContentBlock, LlmError, Message, ResponseFormat};

/// One recorded `chat` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub format: ResponseFormat,
}

/// Scripted `LlmChat`: hands out queued replies in order and records every
/// request. An exhausted queue answers with an empty text.
pub struct MockLlm {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlm {
    #[must_use]
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self { replies: Mutex::new(replies), calls: Mutex::new(Vec::new()) }
    }

    /// Mock answering once with `text`.
    #[must_use]
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self::new(vec![Ok(text.to_owned())]))
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(
        &self,
        _max_tokens: u32,
        system: &str,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<ChatResponse, LlmError> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { system: system.to_owned(), prompt, format });

        let mut replies = self.replies.lock().unwrap();
        let text = if replies.is_empty() { Ok(String::new()) } else { replies.remove(0) }?;
        Ok(ChatResponse {
            content: vec![ContentBlock::Text { text }],
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

/// Create a test `AppState` without an LLM.
#[must_use]
pub fn test_app_state() -> AppState {
    AppState::new(None)
}

/// Create a test `AppState` with a mock LLM.
#[must_use]
pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
    AppState::new(Some(llm))
}
