//! services/api/src/adapters/translator.rs
//!
//! Implements the `TranslationService` port against an OpenAI-compatible chat
//! completions endpoint (Groq by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vocab_reader_core::domain::TranslationRequest;
use vocab_reader_core::ports::{PortError, PortResult, TranslationService};

const EMPTY_REPLY: &str = "Translation unavailable";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

//=========================================================================================
// The Adapter
//=========================================================================================

pub struct ChatTranslator {
    client: reqwest::Client,
    api_url: String,
    model: String,
    target_language: String,
}

impl ChatTranslator {
    pub fn new(api_url: String, model: String, target_language: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            model,
            target_language,
        }
    }

    /// Builds the user prompt for `request`.
    fn prompt(&self, request: &TranslationRequest) -> String {
        match request {
            TranslationRequest::Word { word, sentence } => format!(
                "Translate the word \"{word}\" into {lang} as it is used in the sentence \
                 \"{sentence}\". Explain its meaning in this context, and if it is part of a \
                 phrasal verb, give the meaning of the whole phrase.",
                lang = self.target_language,
            ),
            TranslationRequest::Sentence { sentence } => format!(
                "Translate this sentence into {lang}: \"{sentence}\". Reply with the \
                 translation only, without explanations.",
                lang = self.target_language,
            ),
            TranslationRequest::General { text } => text.clone(),
        }
    }
}

#[async_trait]
impl TranslationService for ChatTranslator {
    async fn translate(&self, api_key: &str, request: &TranslationRequest) -> PortResult<String> {
        if api_key.trim().is_empty() {
            return Err(PortError::MissingCredential);
        }

        let prompt = self.prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        debug!("Sending translation request to {}", self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Translation request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Translation provider is rate limiting requests");
            return Err(PortError::RateLimited);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(PortError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("Failed to parse translation response: {}", e))
        })?;

        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}
