// OCR provider backed by the Google Cloud Vision REST API

use super::Token;
use crate::config::OcrConfig;
use crate::errors::OcrError;
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Turns image bytes into positioned text tokens.
///
/// By convention the first token holds the full recognized text block.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<Vec<Token>, OcrError>;
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<Token>,
    error: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// `images:annotate` client using `TEXT_DETECTION`
pub struct VisionOcrProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionOcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| OcrError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl OcrProvider for VisionOcrProvider {
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    async fn recognize(&self, image: &[u8]) -> Result<Vec<Token>, OcrError> {
        let api_key = self.api_key.as_deref().ok_or(OcrError::NotConfigured)?;

        let body = json!({
            "requests": [{
                "image": { "content": base64::engine::general_purpose::STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Vision API request rejected");
            return Err(OcrError::Provider(format!("HTTP {}: {}", status, text)));
        }

        let parsed: AnnotateResponse = response.json().await?;
        let first = parsed
            .responses
            .into_iter()
            .next()
            .ok_or(OcrError::EmptyRecognition)?;

        if let Some(error) = first.error {
            return Err(OcrError::Provider(format!("{} (code {})", error.message, error.code)));
        }
        if first.text_annotations.is_empty() {
            return Err(OcrError::EmptyRecognition);
        }

        debug!(tokens = first.text_annotations.len(), "Text recognized");
        Ok(first.text_annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, api_key: Option<&str>) -> VisionOcrProvider {
        VisionOcrProvider::new(&OcrConfig {
            endpoint: format!("{}/v1/images:annotate", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_recognize_returns_annotations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{
                    "textAnnotations": [
                        {"description": "Barracks 2d", "boundingPoly": {"vertices": [{"x": 1, "y": 1}, {"x": 9, "y": 1}, {"x": 9, "y": 9}, {"x": 1, "y": 9}]}},
                        {"description": "Barracks", "boundingPoly": {"vertices": [{"x": 1, "y": 1}, {"x": 4, "y": 1}, {"x": 4, "y": 9}, {"x": 1, "y": 9}]}}
                    ]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = provider_for(&server, Some("secret"))
            .recognize(b"png-bytes")
            .await
            .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "Barracks");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let server = MockServer::start().await;
        let result = provider_for(&server, None).recognize(b"png").await;
        assert!(matches!(result, Err(OcrError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_empty_recognition() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"responses": [{}]})))
            .mount(&server)
            .await;

        let result = provider_for(&server, Some("k")).recognize(b"png").await;
        assert!(matches!(result, Err(OcrError::EmptyRecognition)));
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{"error": {"code": 3, "message": "Bad image data."}}]
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server, Some("k")).recognize(b"png").await;
        assert!(matches!(result, Err(OcrError::Provider(msg)) if msg.contains("Bad image data")));
    }

    #[tokio::test]
    async fn test_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let result = provider_for(&server, Some("k")).recognize(b"png").await;
        assert!(matches!(result, Err(OcrError::Provider(_))));
    }
}
