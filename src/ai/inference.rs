use reqwest::Response;
use serde::{Deserialize, Serialize};

use super::RemoteClassificationError;

pub fn build_prompt(link: &str) -> String {
    format!("Is the link \"{link}\" safe? Answer very briefly: Yes, No or Maybe.")
}

pub fn build_request(model: String, link: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user".into(),
            content: build_prompt(link),
        }],
    }
}

pub async fn parse_response(response: Response) -> Result<String, RemoteClassificationError> {
    let completion: ChatCompletionResponse = response.json().await?;
    extract_answer(completion)
}

/// First choice's content, trimmed. Any text is accepted as-is.
pub fn extract_answer(
    completion: ChatCompletionResponse,
) -> Result<String, RemoteClassificationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|msg| msg.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(RemoteClassificationError::EmptyResponse)
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}
