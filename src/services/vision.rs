use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::VisionSettings;
use crate::core::classifier::Label;
use crate::error::ApiError;

/// Client for the external label-detection service (Google Vision
/// `images:annotate` REST endpoint, API-key authenticated).
///
/// A single request/response with no retry policy; failure surfaces
/// immediately to the caller.
#[derive(Clone)]
pub struct VisionClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

const MAX_LABELS: u32 = 10;

impl VisionClient {
    pub fn new(settings: VisionSettings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint: settings.endpoint,
            api_key: settings.api_key,
        }
    }

    /// Detect labels for an image referenced by URL.
    pub async fn detect_labels_url(&self, image_url: &str) -> Result<Vec<Label>, ApiError> {
        self.annotate(json!({ "source": { "imageUri": image_url } }))
            .await
    }

    /// Detect labels for base64-encoded image content.
    pub async fn detect_labels_base64(&self, content: &str) -> Result<Vec<Label>, ApiError> {
        self.annotate(json!({ "content": content })).await
    }

    /// Detect labels for raw image bytes.
    pub async fn detect_labels_bytes(&self, bytes: &[u8]) -> Result<Vec<Label>, ApiError> {
        self.detect_labels_base64(&STANDARD.encode(bytes)).await
    }

    async fn annotate(&self, image: Value) -> Result<Vec<Label>, ApiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ApiError::External("Google Vision API key is not configured".to_string())
        })?;

        let url = format!(
            "{}/images:annotate?key={}",
            self.endpoint.trim_end_matches('/'),
            api_key
        );

        let body = json!({
            "requests": [{
                "image": image,
                "features": [{ "type": "LABEL_DETECTION", "maxResults": MAX_LABELS }]
            }]
        });

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::External(format!(
                "Label detection failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let annotations = json
            .get("responses")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("labelAnnotations"))
            .and_then(|l| l.as_array())
            .cloned()
            .unwrap_or_default();

        let labels: Vec<Label> = annotations
            .iter()
            .filter_map(|annotation| {
                let text = annotation.get("description")?.as_str()?;
                let confidence = annotation.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0);
                Some(Label::new(text, confidence))
            })
            .collect();

        tracing::debug!("Label detection returned {} labels", labels.len());

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_fails_fast() {
        let client = VisionClient::new(VisionSettings {
            api_key: None,
            endpoint: "https://vision.googleapis.com/v1".to_string(),
        });

        let err = tokio_test::block_on(client.detect_labels_url("https://example.com/dog.jpg"))
            .unwrap_err();
        assert!(matches!(err, ApiError::External(_)));
    }
}
