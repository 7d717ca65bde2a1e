use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use catalchemy_generate::{GenerationError, Prompt, TextGenerator};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client backing the generation capability.
pub struct OpenAiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                GenerationError::Configuration(format!("failed to create HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(status_error(status.as_u16(), &body));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|err| {
            GenerationError::MalformedResponse(format!("failed to parse completion: {err}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".to_string()))
    }
}

fn status_error(status: u16, detail: &str) -> GenerationError {
    let message = match status {
        401 => format!("authentication failed: {detail}"),
        404 => format!("model not found: {detail}"),
        429 => format!("rate limit exceeded: {detail}"),
        _ => format!("request failed with status {status}: {detail}"),
    };
    GenerationError::Capability(message)
}

fn map_http_error(error: reqwest::Error) -> GenerationError {
    if let Some(status) = error.status() {
        status_error(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        GenerationError::Capability(format!("request timeout: {error}"))
    } else if error.is_connect() {
        GenerationError::Capability(format!("connection error: {error}"))
    } else {
        GenerationError::Capability(format!("http error: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_capability_errors() {
        let err = status_error(429, "slow down");
        assert!(matches!(err, GenerationError::Capability(ref msg) if msg.contains("rate limit")));
        let err = status_error(500, "boom");
        assert!(err.to_string().contains("status 500"));
    }

    #[test]
    fn request_serializes_system_and_user_messages() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be terse",
                },
                ChatMessage {
                    role: "user",
                    content: "one brand",
                },
            ],
            temperature: 0.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "one brand");
        assert_eq!(value["model"], "gpt-4o-mini");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("m", "k", "http://localhost:8080/v1/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model(), "m");
    }
}
