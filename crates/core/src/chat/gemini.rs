use crate::chat::{ChatClient, ChatError};
use crate::config::{ApiKey, DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, PERSONA_INSTRUCTIONS};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Client for the Gemini `generateContent` endpoint. Every prompt gets the
/// standing persona instructions prepended.
#[derive(Clone)]
pub struct GeminiChatClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
    persona: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GeminiChatClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_API_BASE_URL.to_owned(),
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            persona: PERSONA_INSTRUCTIONS.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_persona(mut self, persona: String) -> Self {
        self.persona = persona;
        self
    }
}

fn compose_prompt(persona: &str, prompt: &str) -> String {
    format!("{persona}\n\nUser: {prompt}")
}

fn reply_text(response: GenerateContentResponse) -> Result<String, ChatError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ChatError::NoCandidates)?;
    let content = candidate.content.ok_or(ChatError::NoParts)?;
    let part = content.parts.into_iter().next().ok_or(ChatError::NoParts)?;
    let text = part.text.ok_or(ChatError::NoText)?;
    Ok(text.trim().to_owned())
}

impl ChatClient for GeminiChatClient {
    fn reply(&self, prompt: String) -> BoxFuture<'_, Result<String, ChatError>> {
        let this = self.clone();
        async move {
            let request = GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![TextPart {
                        text: Some(compose_prompt(&this.persona, &prompt)),
                    }],
                }],
                safety_settings: SAFETY_CATEGORIES
                    .iter()
                    .map(|&category| SafetySetting {
                        category,
                        threshold: "BLOCK_NONE",
                    })
                    .collect(),
            };

            let url = format!("{}/{}:generateContent", this.base_url, this.model);
            let response = this
                .client
                .post(&url)
                .query(&[("key", this.api_key.expose())])
                .json(&request)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unreadable body".to_owned());
                return Err(ChatError::HttpStatus(status, body));
            }

            let parsed: GenerateContentResponse = response.json().await?;
            reply_text(parsed)
        }
        .boxed()
    }
}
