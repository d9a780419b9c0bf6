use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. A role of `Sitter` implies an associated sitter listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Owner,
    Sitter,
    Vet,
    Shelter,
    Admin,
}

/// User account record.
///
/// `password_hash` is `None` for federated-identity accounts (Google
/// sign-in). `notifications` holds the 50 most recent entries, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub role: UserRole,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub notifications: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account was created through federated sign-in and has
    /// no local password.
    pub fn is_federated(&self) -> bool {
        self.password_hash.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pet_gender", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PetGender {
    Male,
    Female,
}

impl PetGender {
    pub fn opposite(self) -> PetGender {
        match self {
            PetGender::Male => PetGender::Female,
            PetGender::Female => PetGender::Male,
        }
    }
}

/// Fixed animal category enumeration used across pets and the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "animal_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AnimalType {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Hamster,
    Fish,
    Reptile,
    Other,
}

/// Pet record. Each pet has exactly one owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub animal: AnimalType,
    pub breed: String,
    pub age: i32,
    pub gender: PetGender,
    pub vaccinated: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub is_available_for_match: bool,
    pub is_available_for_boarding: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pet with its owner eagerly loaded, as returned by read endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PetWithOwner {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner: User,
}

/// Breeding-match request state machine.
///
/// `Pending` at creation; resolved exactly once by the recipient to
/// `Approved` or `Rejected`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }

    /// Terminal status for a recipient response.
    pub fn resolved(approve: bool) -> MatchStatus {
        if approve {
            MatchStatus::Approved
        } else {
            MatchStatus::Rejected
        }
    }
}

/// Flat match row as stored in the `matches` table.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub requester_pet_id: Uuid,
    pub recipient_pet_id: Uuid,
    pub status: MatchStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Match with both users and both pets eagerly loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub requester: User,
    pub recipient: User,
    pub requester_pet: Pet,
    pub recipient_pet: Pet,
    pub status: MatchStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Supplementary profile for a user offering pet-sitting services.
///
/// `username` is a free-text reference, not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SitterSpec {
    pub id: Uuid,
    pub username: String,
    pub price: f64,
    pub rating: f64,
    pub available: bool,
    pub description: String,
    pub specialties: Vec<String>,
    pub pet_sat_count: i32,
    pub experience: i32,
    pub response_time: String,
}

/// User addressing: opaque id or the username convenience alias.
#[derive(Debug, Clone)]
pub enum UserRef {
    Id(Uuid),
    Username(String),
}

impl From<Uuid> for UserRef {
    fn from(id: Uuid) -> Self {
        UserRef::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_gender() {
        assert_eq!(PetGender::Male.opposite(), PetGender::Female);
        assert_eq!(PetGender::Female.opposite(), PetGender::Male);
    }

    #[test]
    fn test_federated_user_has_no_password() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "jane_doe",
            "email": "jane@example.com",
            "displayName": null,
            "phone": null,
            "location": null,
            "role": "OWNER",
            "profileImage": null,
            "isVerified": true,
            "notifications": [],
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.is_federated());
    }

    #[test]
    fn test_resolved_status() {
        assert_eq!(MatchStatus::resolved(true), MatchStatus::Approved);
        assert_eq!(MatchStatus::resolved(false), MatchStatus::Rejected);
        assert!(MatchStatus::resolved(true).is_terminal());
        assert!(!MatchStatus::Pending.is_terminal());
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&MatchStatus::Pending).unwrap(), "\"PENDING\"");
        assert_eq!(serde_json::to_string(&AnimalType::Dog).unwrap(), "\"DOG\"");
        assert_eq!(serde_json::to_string(&PetGender::Female).unwrap(), "\"FEMALE\"");
        assert_eq!(serde_json::to_string(&UserRole::Sitter).unwrap(), "\"SITTER\"");
    }
}
