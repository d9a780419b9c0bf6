use serde::{Deserialize, Serialize};

use crate::models::domain::{AnimalType, PetWithOwner, User};

/// Error response body shared by every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Issued on registration, login and the OAuth callback.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Result of classifying a pet image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub suggested_animal: AnimalType,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_breed: Option<String>,
    pub all_labels: Vec<String>,
}

/// Advisory classifier outcome attached to a pet created with an image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub detected_animal: AnimalType,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_breed: Option<String>,
    pub was_auto_detected: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetResponse {
    #[serde(flatten)]
    pub pet: PetWithOwner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}
