//! OpenAI-compatible provider implementation
//!
//! Works with Groq, OpenAI, vLLM, Ollama, and other OpenAI-compatible APIs.

use super::*;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.unwrap_or(120)))
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or("https://api.groq.com/openai/v1")
            .trim_end_matches('/')
    }

    fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let model = request.model.as_deref().unwrap_or(self.default_model());
        OpenAIRequest {
            model: model.to_string(),
            messages: request.messages.iter().map(OpenAIMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: Some(false),
        }
    }
}

impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        self.config.provider_type.as_str()
    }

    fn default_model(&self) -> &str {
        self.config.default_model.as_deref().unwrap_or("llama-3.1-8b-instant")
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request);

        let mut req = self.client
            .post(format!("{}/chat/completions", self.base_url()))
            .json(&api_request);

        match &request.api_key {
            Some(api_key) if !api_key.is_blank() => {
                req = req.bearer_auth(api_key.expose());
            }
            _ if self.config.provider_type.requires_api_key() => {
                return Err(ProviderError::AuthenticationFailed);
            }
            _ => {}
        }

        tracing::debug!(
            provider = self.name(),
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending chat completion"
        );

        let response = req.send().await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, text, retry_after));
        }

        let api_response: OpenAIResponse = response.json().await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let choice = api_response.choices.into_iter().next()
            .ok_or_else(|| ProviderError::Other("No choices in response".into()))?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }).unwrap_or_default();

        Ok(CompletionResponse {
            id: api_response.id,
            model: api_response.model,
            content: choice.message.content,
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
            usage,
        })
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl From<&ChatMessage> for OpenAIMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().into(),
            content: Some(msg.content.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groq() -> OpenAIProvider {
        OpenAIProvider::new(ProviderConfig::groq()).unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let provider = groq();
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You are a Senior Career Development Analyst"),
            ChatMessage::user("Analyze my skills"),
        ])
        .with_temperature(0.3)
        .with_max_tokens(512);

        let body = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Analyze my skills");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["stream"], false);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_request_model_override() {
        let provider = groq();
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_model("llama-3.3-70b-versatile");
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r###"{
            "id": "chatcmpl-1",
            "model": "llama-3.1-8b-instant",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "## Skill Gap\n- MLOps"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        }"###;
        let parsed: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("## Skill Gap\n- MLOps"));
        assert_eq!(
            FinishReason::from_api(parsed.choices[0].finish_reason.as_deref()),
            FinishReason::Stop
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 20);
    }

    #[test]
    fn test_hosted_provider_rejects_missing_key_before_sending() {
        let provider = OpenAIProvider::new(
            ProviderConfig::groq().with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);

        let result = tokio_test::block_on(provider.complete(request));
        assert_eq!(result.unwrap_err(), ProviderError::AuthenticationFailed);
    }

    #[test]
    fn test_name_and_default_model() {
        let provider = groq();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.default_model(), "llama-3.1-8b-instant");

        let local = OpenAIProvider::new(ProviderConfig::local("http://localhost:11434/v1", "llama3.1"))
            .unwrap();
        assert_eq!(local.name(), "local");
        assert_eq!(local.default_model(), "llama3.1");
    }
}
