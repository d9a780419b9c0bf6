// Unit tests for petmatch

use chrono::Utc;
use petmatch::core::classifier::{
    classify, extract_breed, Label, AUTO_FILL_CONFIDENCE, MATCH_CONFIDENCE_FLOOR,
};
use petmatch::core::matching::{ensure_breedable, ensure_resolvable};
use petmatch::core::naming::{derive_display_name, derive_username, slugify, username_candidate};
use petmatch::models::{AnimalType, MatchStatus, Pet, PetGender, User, UserRole};
use petmatch::services::auth::{issue_token, verify_token};
use petmatch::ApiError;
use uuid::Uuid;

fn test_user(username: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        display_name: Some(username.to_string()),
        password_hash: None,
        phone: None,
        location: None,
        role: UserRole::Owner,
        profile_image: None,
        is_verified: false,
        google_id: None,
        notifications: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_pet(owner: Uuid, gender: PetGender) -> Pet {
    Pet {
        id: Uuid::new_v4(),
        name: "Rex".to_string(),
        animal: AnimalType::Dog,
        breed: "beagle".to_string(),
        age: 3,
        gender,
        vaccinated: true,
        description: None,
        image_url: None,
        location: None,
        is_available_for_match: true,
        is_available_for_boarding: false,
        owner_id: owner,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_classify_dog_label() {
    let labels = vec![Label::new("dog", 0.95), Label::new("mammal", 0.99)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Dog);
    assert!((classification.confidence - 0.95).abs() < f64::EPSILON);
}

#[test]
fn test_classify_picks_highest_confidence_category() {
    // Both categories present; the cat label is stronger
    let labels = vec![Label::new("dog", 0.60), Label::new("cat", 0.90)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Cat);
}

#[test]
fn test_classify_below_floor_is_other() {
    let labels = vec![Label::new("dog", 0.45)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Other);
    assert!(classification.breed.is_none());
}

#[test]
fn test_classify_exactly_at_floor_is_other() {
    // The floor is exclusive
    let labels = vec![Label::new("dog", MATCH_CONFIDENCE_FLOOR)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Other);
}

#[test]
fn test_classify_no_animal_labels() {
    let labels = vec![Label::new("furniture", 0.99), Label::new("table", 0.95)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Other);
    assert_eq!(classification.confidence, 0.0);
    assert_eq!(classification.all_labels.len(), 2);
}

#[test]
fn test_classify_keyword_containment() {
    // "golden retriever" matches the dog keyword "retriever"
    let labels = vec![Label::new("golden retriever", 0.92)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Dog);
    assert_eq!(classification.breed.as_deref(), Some("golden retriever"));
}

#[test]
fn test_classify_guinea_pig_is_hamster_category() {
    let labels = vec![Label::new("guinea pig", 0.85)];
    let classification = classify(&labels);
    assert_eq!(classification.animal, AnimalType::Hamster);
}

#[test]
fn test_extract_breed_for_cat() {
    let labels = vec![Label::new("cat", 0.9), Label::new("maine coon", 0.8)];
    assert_eq!(
        extract_breed(&labels, AnimalType::Cat).as_deref(),
        Some("maine coon")
    );
}

#[test]
fn test_extract_breed_unknown_category() {
    // No breed table for fish
    let labels = vec![Label::new("goldfish", 0.9)];
    assert!(extract_breed(&labels, AnimalType::Fish).is_none());
}

#[test]
fn test_auto_fill_threshold_above_floor() {
    assert!(AUTO_FILL_CONFIDENCE > MATCH_CONFIDENCE_FLOOR);
}

#[test]
fn test_slugify_display_name() {
    assert_eq!(slugify("Jane Doe"), "jane_doe");
    assert_eq!(slugify("  Jane   Doe  "), "jane_doe");
}

#[test]
fn test_derive_username_prefers_explicit() {
    assert_eq!(
        derive_username(Some("janed"), Some("Jane Doe"), "jane@example.com"),
        "janed"
    );
}

#[test]
fn test_derive_username_from_display_name() {
    assert_eq!(
        derive_username(None, Some("Jane Doe"), "jane@example.com"),
        "jane_doe"
    );
}

#[test]
fn test_derive_username_from_email() {
    assert_eq!(derive_username(None, None, "jane.doe@example.com"), "jane_doe");
}

#[test]
fn test_derive_display_name_fallback() {
    assert_eq!(derive_display_name(None, "jane_doe"), "jane_doe");
    assert_eq!(derive_display_name(Some("Jane"), "jane_doe"), "Jane");
}

#[test]
fn test_username_candidate_sequence() {
    assert_eq!(username_candidate("jane", 0), "jane");
    assert_eq!(username_candidate("jane", 3), "jane3");
}

#[test]
fn test_breedable_opposite_genders() {
    let a = test_pet(Uuid::new_v4(), PetGender::Male);
    let b = test_pet(Uuid::new_v4(), PetGender::Female);
    assert!(ensure_breedable(&a, &b).is_ok());
}

#[test]
fn test_breedable_rejects_same_gender() {
    let a = test_pet(Uuid::new_v4(), PetGender::Male);
    let b = test_pet(Uuid::new_v4(), PetGender::Male);
    let err = ensure_breedable(&a, &b).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert!(err.to_string().contains("opposite genders"));
}

#[test]
fn test_breedable_rejects_same_owner() {
    let owner = Uuid::new_v4();
    let a = test_pet(owner, PetGender::Male);
    let b = test_pet(owner, PetGender::Female);
    let err = ensure_breedable(&a, &b).unwrap_err();
    assert!(err.to_string().contains("same owner"));
}

#[test]
fn test_resolvable_only_when_pending() {
    assert!(ensure_resolvable(MatchStatus::Pending).is_ok());
    assert!(ensure_resolvable(MatchStatus::Approved).is_err());
    assert!(ensure_resolvable(MatchStatus::Rejected).is_err());
}

#[test]
fn test_match_status_resolution() {
    assert_eq!(MatchStatus::resolved(true), MatchStatus::Approved);
    assert_eq!(MatchStatus::resolved(false), MatchStatus::Rejected);
    assert!(!MatchStatus::Pending.is_terminal());
    assert!(MatchStatus::Approved.is_terminal());
}

#[test]
fn test_pet_gender_opposite() {
    assert_eq!(PetGender::Male.opposite(), PetGender::Female);
    assert_eq!(PetGender::Female.opposite(), PetGender::Male);
}

#[test]
fn test_token_round_trip() {
    let user = test_user("jane_doe", "jane@example.com");
    let token = issue_token("test-secret", &user, 7).unwrap();
    let claims = verify_token("test-secret", &token).unwrap();

    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.username, "jane_doe");
    assert_eq!(claims.user_id().unwrap(), user.id);
}

#[test]
fn test_token_expiry_roughly_seven_days() {
    let user = test_user("jane_doe", "jane@example.com");
    let token = issue_token("test-secret", &user, 7).unwrap();
    let claims = verify_token("test-secret", &token).unwrap();

    let expected = (Utc::now() + chrono::Duration::days(7)).timestamp() as usize;
    assert!(claims.exp.abs_diff(expected) < 60);
}

#[test]
fn test_token_rejects_wrong_secret() {
    let user = test_user("jane_doe", "jane@example.com");
    let token = issue_token("test-secret", &user, 7).unwrap();
    let err = verify_token("other-secret", &token).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[test]
fn test_token_rejects_garbage() {
    assert!(verify_token("test-secret", "not.a.token").is_err());
}

#[test]
fn test_user_serialization_hides_credentials() {
    let mut user = test_user("jane_doe", "jane@example.com");
    user.password_hash = Some("secret-hash".to_string());
    user.google_id = Some("google-123".to_string());

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("googleId").is_none());
    assert_eq!(json["username"], "jane_doe");
    assert_eq!(json["role"], "OWNER");
}

#[test]
fn test_enum_wire_format() {
    assert_eq!(serde_json::to_value(AnimalType::Dog).unwrap(), "DOG");
    assert_eq!(serde_json::to_value(PetGender::Female).unwrap(), "FEMALE");
    assert_eq!(serde_json::to_value(MatchStatus::Pending).unwrap(), "PENDING");
    assert_eq!(serde_json::to_value(UserRole::Sitter).unwrap(), "SITTER");
}

#[test]
fn test_error_status_labels() {
    assert_eq!(ApiError::NotFound("x".into()).label(), "not_found");
    assert_eq!(ApiError::Conflict("x".into()).label(), "conflict");
    assert_eq!(ApiError::Unauthorized("x".into()).label(), "unauthorized");
}
