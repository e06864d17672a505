use std::env;

use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::models::{AssistantError, ChatRequest, ChatResponse, ChatRole, ChatTurn};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1";

const SYSTEM_INSTRUCTION: &str = "You are a helpful health information assistant for ThriveWell. \
Provide accurate health information about nutrition, mental health, fitness, and wellness. \
Always remind users to consult healthcare professionals for medical advice. \
Be empathetic and supportive.";

pub struct AssistantService {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl AssistantService {
    pub fn new() -> Result<Self, AssistantError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| AssistantError::MissingApiKey)?;

        Ok(Self {
            api_key,
            base_url: COMPLETIONS_URL.to_string(),
            http_client: Client::new(),
        })
    }

    /// Point the service at a different completion endpoint; used by tests.
    pub fn with_api(base_url: &str, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            http_client: Client::new(),
        }
    }

    /// Forward a message plus short conversation history to the completion
    /// API and return the reply with both turns appended to the history.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AssistantError> {
        if request.message.trim().is_empty() {
            return Err(AssistantError::MessageRequired);
        }

        debug!("Forwarding chat message ({} prior turns)", request.conversation_history.len());

        let mut messages = vec![json!({
            "role": "system",
            "content": SYSTEM_INSTRUCTION
        })];

        for turn in &request.conversation_history {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(json!({ "role": role, "content": turn.content }));
        }

        messages.push(json!({ "role": "user", "content": request.message }));

        let prompt = json!({
            "model": "gpt-4o",
            "messages": messages,
            "temperature": 0.7
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&prompt)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Completion API error: {}", error_text);
            return Err(AssistantError::Upstream(error_text));
        }

        let completion: Value = response.json().await?;
        let reply = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(AssistantError::InvalidResponse)?
            .to_string();

        let mut conversation_history = request.conversation_history;
        conversation_history.push(ChatTurn {
            role: ChatRole::User,
            content: request.message,
        });
        conversation_history.push(ChatTurn {
            role: ChatRole::Assistant,
            content: reply.clone(),
        });

        Ok(ChatResponse {
            response: reply,
            conversation_history,
        })
    }
}
