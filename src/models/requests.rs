use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::{AnimalType, PetGender, UserRole};

/// Request to create a user account (also the register payload).
///
/// Password is optional to support federated-identity accounts. A missing
/// username or display name is derived from whichever of the other is
/// present, falling back to the email local-part.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub username: Option<String>,
    #[validate(length(min = 1))]
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PushNotificationRequest {
    #[validate(length(min = 1))]
    pub message: String,
}

/// Request to create a pet.
///
/// `animal` may be omitted when an image is attached; the classifier then
/// auto-fills it if its confidence is high enough.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    #[validate(length(min = 1, message = "Pet name is required"))]
    pub name: String,
    pub animal: Option<AnimalType>,
    pub breed: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub age: i32,
    pub gender: PetGender,
    #[serde(default)]
    pub vaccinated: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_available_for_match: bool,
    #[serde(default)]
    pub is_available_for_boarding: bool,
    pub owner_id: Option<Uuid>,
    pub owner_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub animal: Option<AnimalType>,
    pub breed: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub age: Option<i32>,
    pub gender: Option<PetGender>,
    pub vaccinated: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub is_available_for_match: Option<bool>,
    pub is_available_for_boarding: Option<bool>,
}

/// Standalone image analysis request; one of the two sources is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    pub image_base64: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub requester_id: Uuid,
    pub requester_pet_id: Uuid,
    pub recipient_id: Uuid,
    pub recipient_pet_id: Uuid,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchByUsernameRequest {
    #[validate(length(min = 1))]
    pub requester_username: String,
    pub requester_pet_id: Uuid,
    #[validate(length(min = 1))]
    pub recipient_username: String,
    pub recipient_pet_id: Uuid,
    pub message: Option<String>,
}

/// Respond payload; the responder is addressed by id or username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondMatchRequest {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub approve: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePetsQuery {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub pet_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedRequestsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerQuery {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSitterSpecRequest {
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSitterSpecRequest {
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub available: Option<bool>,
    pub description: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub pet_sat_count: Option<i32>,
    pub experience: Option<i32>,
    pub response_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_requires_valid_email() {
        let req = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: None,
            username: None,
            display_name: None,
            role: None,
            phone: None,
            location: None,
            profile_image: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_pet_rejects_empty_name() {
        let req: CreatePetRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "age": 2,
            "gender": "MALE"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_pet_camel_case_wire_names() {
        let req: CreatePetRequest = serde_json::from_value(serde_json::json!({
            "name": "Rex",
            "animal": "DOG",
            "breed": "golden retriever",
            "age": 3,
            "gender": "MALE",
            "isAvailableForMatch": true,
            "ownerUsername": "jane_doe"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.is_available_for_match);
        assert_eq!(req.owner_username.as_deref(), Some("jane_doe"));
    }

    #[test]
    fn test_pet_age_bounds() {
        let req: CreatePetRequest = serde_json::from_value(serde_json::json!({
            "name": "Rex",
            "age": 300,
            "gender": "MALE"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
