use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use super::AIService;
use crate::models::ImagePart;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiService {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(prompt: &str, image: Option<&ImagePart>) -> GenerateRequest {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];

        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }

    /// Joins the text parts of the first candidate, the way the SDK's `response.text` does
    fn extract_text(response: GenerateResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            anyhow::bail!("Gemini returned no answer: {}", reason);
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!(
                "Gemini returned an empty answer (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl AIService for GeminiService {
    async fn generate_content(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String> {
        let request = Self::build_request(prompt, image);

        log::info!(
            "🤖 Sending request to Gemini with model: {} (image attached: {})",
            self.model,
            image.is_some()
        );
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&request)?.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.map_err(reqwest::Error::without_url)?;
            log::error!("❌ Gemini API error ({}): {}", status, error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let response_text = response.text().await.map_err(reqwest::Error::without_url)?;
        log::debug!("📄 Raw Gemini response size: {} bytes", response_text.len());

        let parsed: GenerateResponse = serde_json::from_str(&response_text)?;
        let text = Self::extract_text(parsed)?;
        log::info!("✅ Received {} chars from Gemini", text.len());

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_image_uses_inline_data() {
        let image = ImagePart {
            mime_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        };
        let request = GeminiService::build_request("describe", Some(&image));
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "AQID");
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_request_without_image_has_single_part() {
        let request = GeminiService::build_request("describe", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"dish\""}, {"text": ": 1}"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();

        assert_eq!(GeminiService::extract_text(response).unwrap(), "{\"dish\": 1}");
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();

        let err = GeminiService::extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_endpoint_includes_model() {
        let service = GeminiService::with_base_url(
            "test_key".to_string(),
            "gemini-2.5-pro".to_string(),
            "http://localhost:9999/v1beta/".to_string(),
        );

        assert_eq!(
            service.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert!(!service.endpoint().contains("test_key"));
    }

    mod http {
        use super::*;
        use wiremock::matchers::{header, method, path, query_param_is_missing};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const KEY: &str = "SECRET_KEY_123";

        fn service_for(server: &MockServer) -> GeminiService {
            GeminiService::with_base_url(
                KEY.to_string(),
                "gemini-test".to_string(),
                format!("{}/v1beta", server.uri()),
            )
        }

        #[tokio::test]
        async fn test_successful_reply_returns_text() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1beta/models/gemini-test:generateContent"))
                .and(header("x-goog-api-key", KEY))
                .and(query_param_is_missing("key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Roughly 450 kcal."}]},
                        "finishReason": "STOP"
                    }]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let text = service_for(&server).generate_content("pizza", None).await.unwrap();
            assert_eq!(text, "Roughly 450 kcal.");
        }

        #[tokio::test]
        async fn test_quota_error_surfaces_status_and_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
                .mount(&server)
                .await;

            let err = service_for(&server).generate_content("pizza", None).await.unwrap_err();
            let message = err.to_string();

            assert!(message.contains("429"));
            assert!(message.contains("Resource has been exhausted"));
            assert!(!message.contains(KEY));
        }

        #[tokio::test]
        async fn test_empty_candidates_is_an_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "candidates": []
                })))
                .mount(&server)
                .await;

            let err = service_for(&server).generate_content("pizza", None).await.unwrap_err();
            assert!(err.to_string().contains("no candidates returned"));
        }

        #[tokio::test]
        async fn test_connection_error_does_not_expose_key() {
            let service = GeminiService::with_base_url(
                KEY.to_string(),
                "m".to_string(),
                "http://127.0.0.1:1/v1beta".to_string(),
            );

            let err = service.generate_content("hi", None).await.unwrap_err();
            assert!(!format!("{:#}", err).contains(KEY));
            assert!(!format!("{:?}", err).contains(KEY));
        }
    }
}
