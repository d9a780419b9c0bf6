// Integration tests for petmatch
//
// These exercise the label-detection client against a mock HTTP server and
// the classification pipeline end to end, without a database.

use petmatch::config::{Settings, VisionSettings};
use petmatch::core::classifier::{classify, Label};
use petmatch::models::{AnimalType, CreatePetRequest, CreateUserRequest, PetGender, UserRole};
use petmatch::services::VisionClient;
use serde_json::json;
use validator::Validate;

fn vision_body(labels: &[(&str, f64)]) -> String {
    let annotations: Vec<_> = labels
        .iter()
        .map(|(text, score)| json!({ "description": text, "score": score }))
        .collect();
    json!({ "responses": [{ "labelAnnotations": annotations }] }).to_string()
}

async fn mock_vision(labels: &[(&str, f64)]) -> (mockito::ServerGuard, VisionClient) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/images:annotate")
        .match_query(mockito::Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vision_body(labels))
        .create_async()
        .await;

    let client = VisionClient::new(VisionSettings {
        api_key: Some("test-key".to_string()),
        endpoint: server.url(),
    });

    (server, client)
}

#[tokio::test]
async fn test_label_detection_to_classification() {
    let (_server, client) =
        mock_vision(&[("dog", 0.96), ("golden retriever", 0.88), ("mammal", 0.99)]).await;

    let labels = client
        .detect_labels_url("https://example.com/rex.jpg")
        .await
        .unwrap();
    assert_eq!(labels.len(), 3);

    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Dog);
    assert_eq!(classification.breed.as_deref(), Some("golden retriever"));
    assert!(classification.confidence > 0.7);
}

#[tokio::test]
async fn test_label_detection_base64_source() {
    let (_server, client) = mock_vision(&[("cat", 0.91)]).await;

    let labels = client.detect_labels_base64("aGVsbG8=").await.unwrap();
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Cat);
}

#[tokio::test]
async fn test_low_confidence_labels_classify_as_other() {
    let (_server, client) = mock_vision(&[("dog", 0.40), ("blur", 0.30)]).await;

    let labels = client
        .detect_labels_url("https://example.com/blurry.jpg")
        .await
        .unwrap();
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Other);
    assert!(classification.breed.is_none());
}

#[tokio::test]
async fn test_vision_server_error_surfaces() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/images:annotate")
        .match_query(mockito::Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let client = VisionClient::new(VisionSettings {
        api_key: Some("bad-key".to_string()),
        endpoint: server.url(),
    });

    let err = client
        .detect_labels_url("https://example.com/rex.jpg")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Label detection failed"));
}

#[tokio::test]
async fn test_vision_empty_response_yields_no_labels() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/images:annotate")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "responses": [{}] }).to_string())
        .create_async()
        .await;

    let client = VisionClient::new(VisionSettings {
        api_key: Some("test-key".to_string()),
        endpoint: server.url(),
    });

    let labels = client.detect_labels_bytes(b"not an image").await.unwrap();
    assert!(labels.is_empty());
    assert_eq!(classify(&labels).animal, AnimalType::Other);
}

#[test]
fn test_settings_defaults_without_config_files() {
    let settings = Settings::load().expect("defaults should always load");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.auth.token_ttl_days, 7);
    assert!(settings.google.vision.endpoint.contains("vision.googleapis.com"));
}

#[test]
fn test_create_user_request_validation() {
    let valid: CreateUserRequest = serde_json::from_value(json!({
        "email": "jane@example.com",
        "password": "hunter2hunter2",
        "displayName": "Jane Doe",
        "role": "SITTER"
    }))
    .unwrap();
    assert!(valid.validate().is_ok());
    assert_eq!(valid.role, Some(UserRole::Sitter));

    let invalid: CreateUserRequest = serde_json::from_value(json!({
        "email": "not-an-email",
        "password": "short"
    }))
    .unwrap();
    assert!(invalid.validate().is_err());
}

#[test]
fn test_create_pet_request_wire_shape() {
    let req: CreatePetRequest = serde_json::from_value(json!({
        "name": "Rex",
        "age": 3,
        "gender": "MALE",
        "imageUrl": "https://example.com/rex.jpg",
        "isAvailableForMatch": true,
        "ownerUsername": "jane_doe"
    }))
    .unwrap();

    assert!(req.validate().is_ok());
    assert_eq!(req.gender, PetGender::Male);
    assert!(req.animal.is_none());
    assert!(req.is_available_for_match);
    assert!(!req.is_available_for_boarding);
    assert_eq!(req.owner_username.as_deref(), Some("jane_doe"));
}

#[test]
fn test_classifier_pipeline_prefers_specific_category_over_noise() {
    let labels = vec![
        Label::new("pet", 0.99),
        Label::new("mammal", 0.98),
        Label::new("rabbit", 0.82),
        Label::new("whiskers", 0.75),
    ];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Rabbit);
    assert_eq!(classification.all_labels.len(), 4);
}
