//! Grounded Answer Generator: prompt assembly and the single completion call.
//!
//! Flow: build_messages (deterministic, length-bounded) → spawned LLM call
//! under a timeout → verbatim text. Every failure becomes `ChatError::Degraded`.
//! No retries here.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{error, info};

use crate::chat::prompts::{CHAT_SYSTEM_TEMPLATE, CHAT_USER_TEMPLATE, NO_PASSAGES};
use crate::chat::ChatError;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{ChatMessage, ChatModel};

/// Total characters of passage text sent to the model.
pub const MAX_PASSAGE_CHARS: usize = 6000;
pub const MAX_PROFILE_CHARS: usize = 500;
pub const MAX_QUESTION_CHARS: usize = 1000;

#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Returns the model's answer verbatim.
    pub async fn generate(
        &self,
        question: &str,
        profile_summary: &str,
        passages: &[String],
    ) -> Result<String, ChatError> {
        let messages = build_messages(question, profile_summary, passages);

        // The call runs in its own task so a panicking client surfaces as a
        // JoinError; the guard aborts it if this future is dropped or times out.
        let model = Arc::clone(&self.model);
        let handle = tokio::spawn(async move { model.complete(&messages).await });
        let _guard = AbortOnDrop(handle.abort_handle());

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(Ok(answer))) => {
                info!(
                    model = self.model.model(),
                    answer_chars = answer.len(),
                    "Chat answer generated"
                );
                Ok(answer)
            }
            Ok(Ok(Err(e))) => {
                error!(model = self.model.model(), "LLM call failed: {e}");
                Err(ChatError::Degraded(format!("language model call failed: {e}")))
            }
            Ok(Err(join_error)) => {
                error!(model = self.model.model(), "LLM task aborted: {join_error}");
                Err(ChatError::Degraded("language model call aborted".to_string()))
            }
            Err(_) => {
                error!(
                    model = self.model.model(),
                    "LLM call timed out after {}s",
                    self.timeout.as_secs()
                );
                Err(ChatError::Degraded(format!(
                    "language model did not answer within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// System + user messages. Same inputs always give the same messages.
pub fn build_messages(
    question: &str,
    profile_summary: &str,
    passages: &[String],
) -> Vec<ChatMessage> {
    let system = CHAT_SYSTEM_TEMPLATE.replace("{grounding_instruction}", GROUNDING_INSTRUCTION);

    let user = CHAT_USER_TEMPLATE
        .replace("{profile_summary}", truncate_chars(profile_summary.trim(), MAX_PROFILE_CHARS))
        .replace("{passages}", &format_passages(passages))
        .replace("{question}", truncate_chars(question.trim(), MAX_QUESTION_CHARS));

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Numbers passages in retrieval order, stopping once `MAX_PASSAGE_CHARS` is spent.
fn format_passages(passages: &[String]) -> String {
    let mut budget = MAX_PASSAGE_CHARS;
    let mut blocks = Vec::new();

    for (i, passage) in passages.iter().enumerate() {
        if budget == 0 {
            break;
        }
        let text = truncate_chars(passage.trim(), budget);
        budget -= text.chars().count();
        blocks.push(format!("[{}] {}", i + 1, text));
    }

    if blocks.is_empty() {
        NO_PASSAGES.to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Longest prefix of at most `max` chars, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
