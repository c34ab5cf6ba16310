use super::ReviewGenerator;
use crate::config::Config;
use crate::error::{FoodBuddyError, Result};
use async_trait::async_trait;
use foodbuddy_common::{build_review_prompt, parse_generated_review, GeneratedReview, GenerationRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const MAX_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.8;

/// 요청 타임아웃 기본값
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI 호환 `/chat/completions` 생성기
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.openai_api_key()?)
            .with_base_url(&config.openai_base_url)
            .with_model(&config.openai_model)
            .with_timeout(config.generation_timeout()))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_review_prompt(request),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// 첫 번째 choice의 본문
fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| FoodBuddyError::ApiParse("choices가 비어 있습니다".into()))
}

#[async_trait]
impl ReviewGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedReview> {
        let start = Instant::now();
        let body = self.chat_request(request);

        tracing::debug!(model = %self.model, tone = %request.tone, "리뷰 생성 요청");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| FoodBuddyError::ApiCall(format!("리뷰 생성에 실패했습니다: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %error_body, "OpenAI 오류 응답");
            return Err(FoodBuddyError::ApiCall(format!(
                "리뷰 생성에 실패했습니다: OpenAI API 오류 {}",
                status
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| FoodBuddyError::ApiParse(e.to_string()))?;
        let content = first_content(chat)?;

        tracing::info!(latency_ms = start.elapsed().as_millis() as u64, "리뷰 생성 완료");
        Ok(parse_generated_review(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbuddy_common::{LineItem, Rating, Tone};

    fn sample_request() -> GenerationRequest {
        GenerationRequest::new(
            "A",
            vec![LineItem::new("X", 1000)],
            Tone::Simple,
            Rating::new(4).unwrap(),
            None,
        )
    }

    #[test]
    fn test_chat_request_body() {
        let generator = OpenAiGenerator::new("sk-test").with_model("gpt-4o-mini");
        let body = serde_json::to_value(generator.chat_request(&sample_request())).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "user");
        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("만족 (4점)"));
        assert!(prompt.contains(Tone::Simple.instruction()));
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  {\"review\": \"굿\"} "}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "{\"review\": \"굿\"}");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_content(empty), Err(FoodBuddyError::ApiParse(_))));
    }

    #[test]
    fn test_base_url_normalized() {
        let generator = OpenAiGenerator::new("k").with_base_url("http://localhost:1234/v1/");
        assert_eq!(generator.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn test_from_config_uses_generation_timeout() {
        let config = Config {
            openai_api_key: Some("sk-test".into()),
            ocr_timeout_seconds: 90,
            generation_timeout_seconds: 20,
            ..Config::default()
        };
        let generator = OpenAiGenerator::from_config(&config).unwrap();
        assert_eq!(generator.timeout, Duration::from_secs(20));
    }
}
