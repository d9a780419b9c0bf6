use crate::error::ApiError;
use crate::models::{MatchStatus, Pet};

/// Business-rule checks for a breeding-match request, applied after both
/// pets have been resolved and ownership verified against the database.
pub fn ensure_breedable(requester_pet: &Pet, recipient_pet: &Pet) -> Result<(), ApiError> {
    if requester_pet.owner_id == recipient_pet.owner_id {
        return Err(ApiError::BadRequest(
            "Cannot request a match between pets with the same owner".to_string(),
        ));
    }

    if requester_pet.gender == recipient_pet.gender {
        return Err(ApiError::BadRequest(
            "Pets must be of opposite genders for breeding".to_string(),
        ));
    }

    Ok(())
}

/// Check that a pending request may be resolved.
pub fn ensure_resolvable(status: MatchStatus) -> Result<(), ApiError> {
    if status.is_terminal() {
        return Err(ApiError::BadRequest(
            "This match request has already been processed".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalType, PetGender};
    use chrono::Utc;
    use uuid::Uuid;

    fn pet(owner: Uuid, gender: PetGender) -> Pet {
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
    fn test_opposite_genders_breedable() {
        let a = pet(Uuid::new_v4(), PetGender::Male);
        let b = pet(Uuid::new_v4(), PetGender::Female);
        assert!(ensure_breedable(&a, &b).is_ok());
    }

    #[test]
    fn test_same_gender_rejected() {
        let a = pet(Uuid::new_v4(), PetGender::Male);
        let b = pet(Uuid::new_v4(), PetGender::Male);
        let err = ensure_breedable(&a, &b).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_same_owner_rejected() {
        let owner = Uuid::new_v4();
        let a = pet(owner, PetGender::Male);
        let b = pet(owner, PetGender::Female);
        assert!(matches!(
            ensure_breedable(&a, &b),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_terminal_status_not_resolvable() {
        assert!(ensure_resolvable(MatchStatus::Pending).is_ok());
        assert!(ensure_resolvable(MatchStatus::Approved).is_err());
        assert!(ensure_resolvable(MatchStatus::Rejected).is_err());
    }
}
