use std::fmt;

use serde::{Deserialize, Serialize};

use crate::usage::TokenUsage;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Errors surfaced by the completion capability.
#[derive(Debug)]
pub enum ApiError {
    /// The expected API key environment variable is not set.
    MissingKey(String),
    /// The HTTP request itself failed (connection, TLS, timeout).
    Request(String),
    /// The API answered with a non-success status.
    Api { status: u16, body: String },
    /// The API answered 200 but the payload was not usable.
    MalformedResponse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::MissingKey(var) => {
                write!(f, "{} environment variable not found", var)
            }
            ApiError::Request(details) => write!(f, "Request failed: {}", details),
            ApiError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            ApiError::MalformedResponse(details) => {
                write!(f, "Malformed API response: {}", details)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// One role-tagged message in a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single submission to the chat-completions endpoint.
///
/// Iterations are requested as `n` completions in one call, never as
/// parallel requests.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub n: u32,
    pub seed: i64,
    pub temperature: Option<f32>,
}

/// The processed result of a completion request: one trimmed text per
/// requested iteration, plus the token usage of the call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub choices: Vec<String>,
    pub usage: TokenUsage,
}

/// The capability every submission in the pipeline goes through.
///
/// Transport-agnostic by design so tests can substitute a scripted client.
pub trait CompletionClient {
    fn submit(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, ApiError>>;
}

/// A single submission to the image-generation endpoint.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
}

/// Revised prompt plus the downloaded image bytes.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub revised_prompt: String,
    pub bytes: Vec<u8>,
}

/// Image-generation capability. Clients without one keep the default
/// rejection so text-only clients stay a one-line impl.
pub trait ImageClient {
    fn generate_image(
        &self,
        request: ImageRequest,
    ) -> impl Future<Output = Result<ImageOutput, ApiError>> {
        let _ = request;
        async {
            Err(ApiError::Request(
                "image generation is not supported by this client".to_string(),
            ))
        }
    }
}

/// Validates a requested model name, falling back to the default chat model
/// for anything unrecognized.
pub fn select_model(requested: &str) -> String {
    let lowered = requested.to_lowercase();
    match lowered.as_str() {
        "deepseek-chat" | "gpt-4o" | "gpt-4o-mini" | "o1-mini" | "o1-preview" | "dall-e-2"
        | "dall-e-3" => lowered,
        _ => DEFAULT_MODEL.to_string(),
    }
}

pub fn is_image_model(model: &str) -> bool {
    model.starts_with("dall-e")
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    n: u32,
    seed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChoiceBody>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Deserialize)]
struct ChoiceBody {
    message: MessageBody,
}

#[derive(Deserialize)]
struct MessageBody {
    content: String,
}

#[derive(Deserialize)]
struct UsageBody {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Serialize)]
struct ImageRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
}

#[derive(Deserialize)]
struct ImageResponseBody {
    data: Vec<ImageDataBody>,
}

#[derive(Deserialize)]
struct ImageDataBody {
    url: String,
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// Client for OpenAI-compatible endpoints.
///
/// `deepseek-chat` routes to the DeepSeek API with its own key; every other
/// model goes to OpenAI.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Builds a client for the given (already validated) model, reading the
    /// matching API key from the environment.
    pub fn for_model(model: &str) -> Result<Self, ApiError> {
        let (base_url, key_var) = if model == "deepseek-chat" {
            (DEEPSEEK_BASE_URL, "DEEPSEEK_API_KEY")
        } else {
            (OPENAI_BASE_URL, "OPENAI_API_KEY")
        };

        let api_key = std::env::var(key_var)
            .map_err(|_| ApiError::MissingKey(key_var.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.to_string(),
        })
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api { status, body });
        }

        Ok(response)
    }
}

impl CompletionClient for OpenAiClient {
    async fn submit(&self, request: CompletionRequest) -> Result<Completion, ApiError> {
        let body = ChatRequestBody {
            model: &request.model,
            messages: &request.messages,
            n: request.n,
            seed: request.seed,
            temperature: request.temperature,
        };

        let response = self.post_json("/v1/chat/completions", &body).await?;
        let decoded: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        if decoded.choices.is_empty() {
            return Err(ApiError::MalformedResponse(
                "response contained no choices".to_string(),
            ));
        }

        let choices = decoded
            .choices
            .into_iter()
            .map(|choice| choice.message.content.trim().to_string())
            .collect();

        let usage = decoded
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion { choices, usage })
    }
}

impl ImageClient for OpenAiClient {
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageOutput, ApiError> {
        let body = ImageRequestBody {
            model: &request.model,
            prompt: &request.prompt,
            n: 1,
            size: &request.size,
            quality: &request.quality,
        };

        let response = self.post_json("/v1/images/generations", &body).await?;
        let decoded: ImageResponseBody = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let Some(image) = decoded.data.into_iter().next() else {
            return Err(ApiError::MalformedResponse(
                "response contained no image data".to_string(),
            ));
        };

        let download = self
            .http
            .get(&image.url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let bytes = download
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?
            .to_vec();

        Ok(ImageOutput {
            revised_prompt: image.revised_prompt.unwrap_or_default(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_model_known() {
        assert_eq!(select_model("gpt-4o"), "gpt-4o");
        assert_eq!(select_model("GPT-4o"), "gpt-4o");
        assert_eq!(select_model("deepseek-chat"), "deepseek-chat");
    }

    #[test]
    fn test_select_model_unknown_falls_back() {
        assert_eq!(select_model("gpt-99"), "gpt-4o-mini");
        assert_eq!(select_model(""), "gpt-4o-mini");
    }

    #[test]
    fn test_is_image_model() {
        assert!(is_image_model("dall-e-3"));
        assert!(is_image_model("dall-e-2"));
        assert!(!is_image_model("gpt-4o"));
    }

    #[test]
    fn test_chat_request_body_omits_unset_temperature() {
        let messages = vec![ChatMessage::user("hi")];
        let body = ChatRequestBody {
            model: "gpt-4o-mini",
            messages: &messages,
            n: 1,
            seed: 42,
            temperature: None,
        };

        let encoded = serde_json::to_string(&body).unwrap();
        assert!(!encoded.contains("temperature"));
        assert!(encoded.contains("\"seed\":42"));
    }

    #[test]
    fn test_chat_response_body_decodes() {
        let raw = r#"{
            "choices": [{"message": {"content": "  hello  "}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3}
        }"#;

        let decoded: ChatResponseBody = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.choices.len(), 1);
        assert_eq!(decoded.usage.as_ref().unwrap().prompt_tokens, 10);
    }
}
