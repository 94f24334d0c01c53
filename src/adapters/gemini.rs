use crate::core::suggestions::{build_prompt, parse_suggestions};
use crate::domain::model::{Coord, PoiSuggestion};
use crate::domain::ports::{PoiSuggester, SuggesterFactory};
use crate::utils::error::{Result, SalesMapError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gemini generateContent 文字生成
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
            api_key,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// 送出提示詞並回傳模型輸出的文字；錯誤訊息保留服務端原文
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!("Calling AI model {}", self.model);
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SalesMapError::AiGenerationError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| SalesMapError::AiGenerationError {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(SalesMapError::AiGenerationError {
                message: format!("HTTP {}: {}", status, message),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| SalesMapError::AiGenerationError {
                message: format!("unexpected response shape: {}", e),
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SalesMapError::AiGenerationError {
                message: "model returned no text".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl PoiSuggester for GeminiClient {
    async fn suggest(
        &self,
        address: &str,
        center: Coord,
        count: usize,
    ) -> Result<Vec<PoiSuggestion>> {
        let text = self.generate_text(&build_prompt(address, center, count)).await?;
        tracing::debug!("AI raw response: {}", text);
        parse_suggestions(&text, count)
    }
}

/// 依使用者輸入的金鑰建立 [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiFactory {
    endpoint: String,
    model: String,
}

impl GeminiFactory {
    pub fn new(endpoint: String, model: String) -> Self {
        Self { endpoint, model }
    }
}

impl SuggesterFactory for GeminiFactory {
    fn with_credential(&self, credential: &str) -> Box<dyn PoiSuggester> {
        Box::new(GeminiClient::new(
            self.endpoint.clone(),
            self.model.clone(),
            credential.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            server.url("/v1beta"),
            DEFAULT_AI_MODEL.to_string(),
            "test-key".to_string(),
        )
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
    }

    #[tokio::test]
    async fn test_suggest_parses_fenced_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-1.5-flash-latest:generateContent")
                .query_param("key", "test-key")
                .body_contains("台北101");
            then.status(200).json_body(candidate_body(
                "```json\n[{\"name\":\"象山\",\"type\":\"公園\",\"minutes\":6,\"lat\":25.027,\"lng\":121.576}]\n```",
            ));
        });

        let center = Coord::new(121.5654, 25.033).unwrap();
        let pois = client(&server).suggest("台北101", center, 4).await.unwrap();

        api_mock.assert();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name, "象山");
    }

    #[tokio::test]
    async fn test_api_error_message_is_exposed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(400).json_body(serde_json::json!({
                "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" }
            }));
        });

        let err = client(&server).generate_text("hi").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({ "candidates": [] }));
        });

        let err = client(&server).generate_text("hi").await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }
}
