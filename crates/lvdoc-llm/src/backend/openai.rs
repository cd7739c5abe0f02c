//! OpenAI-compatible chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::LlmError;
use crate::{Generation, GenerationRequest, LlmBackend, OutputFormat, Result};

/// Configuration of the HTTP backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL of the API, without the `/chat/completions` suffix.
    pub endpoint: String,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

/// Backend speaking the chat completions protocol.
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(LlmError::Config("model name is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| LlmError::Config(format!("invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build_body(&self, request: GenerationRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        let response_format = match request.output {
            OutputFormat::Text => None,
            OutputFormat::Json(schema) => Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: schema.name,
                    schema: schema.schema,
                    strict: schema.strict,
                },
            }),
        };

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            response_format,
        }
    }
}

// Chat completions request/response structures

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ResponseFormat {
    #[serde(rename = "json_schema")]
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        let schema = request.output.schema_name().map(str::to_string);
        let body = self.build_body(request);

        debug!(
            model = %body.model,
            schema = schema.as_deref().unwrap_or("text"),
            messages = body.messages.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(self.url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::Response("no choices in response".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(LlmError::Refusal(refusal));
        }

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::Response("empty message content".to_string()))?;

        debug!(chars = content.len(), "chat completion received");

        Ok(Generation {
            text: content,
            model: parsed.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(OpenAiConfig {
            endpoint: server.uri(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = OpenAiConfig::default();
        assert!(config.endpoint.contains("api.openai.com"));
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_rejects_empty_model() {
        let result = OpenAiBackend::new(OpenAiConfig {
            model: " ".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_structured_body() {
        let backend = OpenAiBackend::new(OpenAiConfig::default()).unwrap();
        let request = GenerationRequest::structured(
            "classify this",
            JsonSchema::strict("classification", json!({"type": "object"})),
        )
        .with_system("be precise");

        let body = serde_json::to_value(backend.build_body(request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "be precise"},
                    {"role": "user", "content": "classify this"}
                ],
                "temperature": 0.0,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": "classification",
                        "schema": {"type": "object"},
                        "strict": true
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_generate_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "response_format": {"json_schema": {"name": "classification"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-2024-08-06",
                "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}]
            })))
            .mount(&server)
            .await;

        let generation = backend_for(&server)
            .generate(GenerationRequest::structured(
                "prompt",
                JsonSchema::strict("classification", json!({"type": "object"})),
            ))
            .await
            .unwrap();

        assert_eq!(generation.text, "{\"ok\":true}");
        assert_eq!(generation.model.as_deref(), Some("gpt-4o-2024-08-06"));
    }

    #[tokio::test]
    async fn test_generate_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .generate(GenerationRequest::text("prompt"))
            .await
            .unwrap_err();

        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_surfaces_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "refusal": "cannot help"}}]
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .generate(GenerationRequest::text("prompt"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Refusal(r) if r == "cannot help"));
    }
}
