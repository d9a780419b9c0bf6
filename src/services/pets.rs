use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::classifier::{self, Classification, AUTO_FILL_CONFIDENCE};
use crate::error::ApiError;
use crate::models::{
    AiAnalysis, AnalyzeImageRequest, AnalyzeImageResponse, AnimalType, CreatePetRequest,
    CreatePetResponse, Pet, PetWithOwner, UpdatePetRequest, User, UserRef,
};
use crate::services::users::UserService;
use crate::services::vision::VisionClient;

/// Pet registry backed by the `pets` table. Reads eagerly attach owners.
#[derive(Clone)]
pub struct PetService {
    pool: PgPool,
    users: UserService,
    vision: VisionClient,
}

impl PetService {
    pub fn new(pool: PgPool, users: UserService, vision: VisionClient) -> Self {
        Self { pool, users, vision }
    }

    /// Create a pet for an owner addressed by id or username.
    ///
    /// When no animal type was supplied and an image is attached, the
    /// classifier result auto-fills the animal (and breed, if missing)
    /// above the 0.7 confidence threshold. Classifier failure degrades to
    /// requiring a manually supplied animal type.
    pub async fn create(&self, req: CreatePetRequest) -> Result<CreatePetResponse, ApiError> {
        let owner_ref = match (req.owner_id, req.owner_username.as_deref()) {
            (Some(id), _) => UserRef::Id(id),
            (None, Some(username)) => UserRef::Username(username.to_string()),
            (None, None) => {
                return Err(ApiError::BadRequest(
                    "ownerId or ownerUsername is required".to_string(),
                ))
            }
        };
        let owner = self.users.resolve(&owner_ref).await?;

        let mut animal = req.animal;
        let mut breed = req.breed.clone();
        let mut analysis: Option<Classification> = None;

        if animal.is_none() {
            if let Some(classification) = self.try_classify(&req).await {
                if classification.confidence > AUTO_FILL_CONFIDENCE {
                    animal = Some(classification.animal);
                    if breed.is_none() {
                        breed = classification.breed.clone();
                    }
                }
                analysis = Some(classification);
            }
        }

        let Some(animal) = animal else {
            return Err(ApiError::BadRequest(
                "Animal type is required. Provide it manually or attach a clear pet image for auto-detection."
                    .to_string(),
            ));
        };

        let pet = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (name, animal, breed, age, gender, vaccinated, description,
                              image_url, location, is_available_for_match,
                              is_available_for_boarding, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(animal)
        .bind(breed.unwrap_or_default())
        .bind(req.age)
        .bind(req.gender)
        .bind(req.vaccinated)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(&req.location)
        .bind(req.is_available_for_match)
        .bind(req.is_available_for_boarding)
        .bind(owner.id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created pet {} ({}) for {}", pet.name, pet.id, owner.username);

        let ai_analysis = analysis.map(|classification| AiAnalysis {
            detected_animal: classification.animal,
            confidence: classification.confidence,
            suggested_breed: classification.breed,
            was_auto_detected: req.animal.is_none(),
        });

        Ok(CreatePetResponse {
            pet: PetWithOwner { pet, owner },
            ai_analysis,
        })
    }

    async fn try_classify(&self, req: &CreatePetRequest) -> Option<Classification> {
        let labels = if let Some(content) = req.image_base64.as_deref() {
            self.vision.detect_labels_base64(content).await
        } else if let Some(url) = req.image_url.as_deref() {
            self.vision.detect_labels_url(url).await
        } else {
            return None;
        };

        match labels {
            Ok(labels) => Some(classifier::classify(&labels)),
            Err(e) => {
                tracing::warn!("Image analysis failed, proceeding without auto-detection: {}", e);
                None
            }
        }
    }

    /// Standalone advisory image analysis.
    pub async fn analyze_image(
        &self,
        req: AnalyzeImageRequest,
    ) -> Result<AnalyzeImageResponse, ApiError> {
        let labels = if let Some(content) = req.image_base64.as_deref() {
            self.vision.detect_labels_base64(content).await?
        } else if let Some(url) = req.image_url.as_deref() {
            self.vision.detect_labels_url(url).await?
        } else {
            return Err(ApiError::BadRequest(
                "imageBase64 or imageUrl is required".to_string(),
            ));
        };

        let classification = classifier::classify(&labels);

        Ok(AnalyzeImageResponse {
            suggested_animal: classification.animal,
            confidence: classification.confidence,
            suggested_breed: classification.breed,
            all_labels: classification.all_labels,
        })
    }

    pub async fn find_all(&self) -> Result<Vec<PetWithOwner>, ApiError> {
        let pets = sqlx::query_as::<_, Pet>("SELECT * FROM pets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        self.with_owners(pets).await
    }

    pub async fn find_by_owner(&self, owner: &UserRef) -> Result<Vec<PetWithOwner>, ApiError> {
        let owner = self.users.resolve(owner).await?;
        let pets = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pets
            .into_iter()
            .map(|pet| PetWithOwner { pet, owner: owner.clone() })
            .collect())
    }

    pub async fn find_one(&self, id: Uuid) -> Result<PetWithOwner, ApiError> {
        let pet = self.find_row(id).await?;
        let owner = self.users.find_by_id(pet.owner_id).await?;
        Ok(PetWithOwner { pet, owner })
    }

    async fn find_row(&self, id: Uuid) -> Result<Pet, ApiError> {
        sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Pet with ID {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, req: UpdatePetRequest) -> Result<PetWithOwner, ApiError> {
        let existing = self.find_row(id).await?;

        let pet = sqlx::query_as::<_, Pet>(
            r#"
            UPDATE pets
            SET name = $2, animal = $3, breed = $4, age = $5, gender = $6, vaccinated = $7,
                description = $8, image_url = $9, location = $10,
                is_available_for_match = $11, is_available_for_boarding = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.name.unwrap_or(existing.name))
        .bind(req.animal.unwrap_or(existing.animal))
        .bind(req.breed.unwrap_or(existing.breed))
        .bind(req.age.unwrap_or(existing.age))
        .bind(req.gender.unwrap_or(existing.gender))
        .bind(req.vaccinated.unwrap_or(existing.vaccinated))
        .bind(req.description.or(existing.description))
        .bind(req.image_url.or(existing.image_url))
        .bind(req.location.or(existing.location))
        .bind(req.is_available_for_match.unwrap_or(existing.is_available_for_match))
        .bind(req.is_available_for_boarding.unwrap_or(existing.is_available_for_boarding))
        .fetch_one(&self.pool)
        .await?;

        let owner = self.users.find_by_id(pet.owner_id).await?;
        Ok(PetWithOwner { pet, owner })
    }

    /// Delete a pet; the caller must be its owner.
    pub async fn delete(&self, id: Uuid, caller: &UserRef) -> Result<(), ApiError> {
        let pet = self.find_row(id).await?;
        let caller = self.users.resolve(caller).await?;

        if pet.owner_id != caller.id {
            return Err(ApiError::BadRequest(
                "You can only delete your own pets".to_string(),
            ));
        }

        sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_available_for_match(&self) -> Result<Vec<PetWithOwner>, ApiError> {
        let pets = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE is_available_for_match ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.with_owners(pets).await
    }

    pub async fn find_available_for_boarding(&self) -> Result<Vec<PetWithOwner>, ApiError> {
        let pets = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE is_available_for_boarding ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.with_owners(pets).await
    }

    /// Attach owners to a batch of pet rows with a single lookup.
    pub async fn with_owners(&self, pets: Vec<Pet>) -> Result<Vec<PetWithOwner>, ApiError> {
        let mut owner_ids: Vec<Uuid> = pets.iter().map(|p| p.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<Uuid, User> =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
                .bind(&owner_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect();

        Ok(pets
            .into_iter()
            .filter_map(|pet| {
                let owner = owners.get(&pet.owner_id).cloned();
                if owner.is_none() {
                    tracing::warn!("Pet {} references missing owner {}", pet.id, pet.owner_id);
                }
                owner.map(|owner| PetWithOwner { pet, owner })
            })
            .collect())
    }
}
