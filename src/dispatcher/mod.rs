//! Sequential multi-model dispatch with a sticky preferred model and a
//! deterministic local fallback.

mod backoff;
mod fallback;
mod state;

pub use backoff::BackoffPolicy;
pub use fallback::fallback_response;
pub use state::{DispatchState, ModelCursor};

use crate::config::AiConfig;
use crate::db::models::{ChatMessage, Sender};
use crate::llm::openai::{OpenAiClient, OpenAiConfig};
use crate::llm::{ChatRequest, ChatTurn, LlmError, Role};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

/// Characters of note context included in the system instruction.
pub const CONTEXT_LIMIT: usize = 500;

pub const EXHAUSTED_ERROR: &str = "All AI models unavailable - using fallback response";

/// Reply handed back to callers. `error` is set when the content came from
/// the local fallback after every remote model failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model that produced the reply, if a remote one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AssistantReply {
    pub fn is_remote(&self) -> bool {
        self.model.is_some()
    }
}

pub struct Dispatcher {
    client: Option<OpenAiClient>,
    models: Vec<String>,
    preferred: AtomicUsize,
    backoff: BackoffPolicy,
    max_tokens: u32,
    temperature: f32,
}

impl Dispatcher {
    pub fn new(config: &AiConfig) -> Result<Self, LlmError> {
        let client = match (&config.api_key, config.test_mode) {
            (_, true) => {
                info!("AI dispatcher in test mode, using fallback responses");
                None
            }
            (Some(api_key), false) if !api_key.is_empty() => {
                info!(
                    base_url = %config.base_url,
                    models = config.models.len(),
                    "AI dispatcher initialized"
                );
                Some(OpenAiClient::new(OpenAiConfig {
                    api_key: api_key.clone(),
                    base_url: config.base_url.clone(),
                    site_url: config.site_url.clone(),
                    site_name: config.site_name.clone(),
                    timeout: config.timeout,
                })?)
            }
            _ => {
                warn!("no API key found, AI will use fallback responses");
                None
            }
        };

        Ok(Self {
            client,
            models: config.models.clone(),
            preferred: AtomicUsize::new(0),
            backoff: config.backoff,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Whether remote calls will be attempted at all.
    pub fn is_remote(&self) -> bool {
        self.client.is_some() && !self.models.is_empty()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Index the next call starts from.
    pub fn preferred_index(&self) -> usize {
        self.preferred.load(Ordering::Relaxed)
    }

    /// Answer `prompt` about `context`. Never fails: remote errors roll over
    /// to the next model and total exhaustion yields the fallback.
    pub async fn respond(
        &self,
        prompt: &str,
        context: &str,
        editing: bool,
        history: &[ChatTurn],
    ) -> AssistantReply {
        let Some(client) = &self.client else {
            debug!("no remote client, answering from fallback");
            return AssistantReply {
                content: fallback_response(prompt, context, editing),
                error: None,
                model: None,
            };
        };

        let messages = build_messages(prompt, context, editing, history);
        let cursor = ModelCursor::new(self.preferred_index(), self.models.len());
        let mut state = cursor.begin();
        let mut answer = None;

        while let DispatchState::Attempting { attempt, index } = state {
            let model = &self.models[index];
            debug!(model = %model, attempt = attempt + 1, total = self.models.len(), "trying model");

            let delay = self.backoff.retry_delay(attempt);
            if !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "waiting before next model");
                tokio::time::sleep(delay).await;
            }

            let request = ChatRequest {
                messages: messages.clone(),
                model: model.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            state = match client.chat(&request).await {
                Ok(response) => {
                    answer = Some(response);
                    cursor.succeed(state)
                }
                Err(e) if e.is_rate_limited() => {
                    let wait = self.backoff.rate_limit_delay(attempt);
                    warn!(model = %model, wait_ms = wait.as_millis() as u64, "rate limited, moving to next model");
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    cursor.fail(state)
                }
                Err(e) => {
                    error!(model = %model, error = %e, "model failed");
                    cursor.fail(state)
                }
            };
        }

        match (state, answer) {
            (DispatchState::Success { index }, Some(response)) => {
                self.preferred.store(index, Ordering::Relaxed);
                info!(model = %response.model, "model answered");
                AssistantReply {
                    content: response.content,
                    error: None,
                    model: Some(response.model),
                }
            }
            _ => {
                warn!("all AI models failed, using fallback response");
                AssistantReply {
                    content: fallback_response(prompt, context, editing),
                    error: Some(EXHAUSTED_ERROR.to_string()),
                    model: None,
                }
            }
        }
    }
}

/// System instruction followed by the prior turns and the new prompt.
pub fn build_messages(
    prompt: &str,
    context: &str,
    editing: bool,
    history: &[ChatTurn],
) -> Vec<ChatTurn> {
    let excerpt: String = context.chars().take(CONTEXT_LIMIT).collect();
    let (mode, focus) = if editing {
        ("editing", "focus on writing assistance")
    } else {
        ("reading", "focus on comprehension and analysis")
    };
    let system = format!(
        "You are an AI assistant helping with note-taking and writing.\n\
         The user is currently {mode} a note.\n\
         Note content: \"{excerpt}...\"\n\n\
         Provide helpful, concise responses. Since the user is {mode}, {focus}."
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn::new(Role::System, system));
    messages.extend(history.iter().cloned());
    messages.push(ChatTurn::new(Role::User, prompt));
    messages
}

/// Convert the chat log into completion turns.
pub fn history_from_chat(messages: &[ChatMessage]) -> Vec<ChatTurn> {
    messages
        .iter()
        .map(|m| {
            let role = match m.sender {
                Sender::User => Role::User,
                Sender::Ai => Role::Assistant,
            };
            ChatTurn::new(role, m.content.clone())
        })
        .collect()
}
