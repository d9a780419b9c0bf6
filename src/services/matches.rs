use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::matching;
use crate::error::ApiError;
use crate::models::{
    Match, MatchRow, MatchStatus, Pet, PetWithOwner, User, UserRef,
};
use crate::services::pets::PetService;
use crate::services::users::UserService;

const DUPLICATE_REQUEST: &str = "A match request already exists between these pets";

/// Breeding-match workflow between two distinct users' pets.
///
/// Creation runs its duplicate check and insert in one transaction; the
/// partial unique index over the pending pet pair backstops concurrent
/// requests that race past the check.
#[derive(Clone)]
pub struct MatchService {
    pool: PgPool,
    users: UserService,
    pets: PetService,
}

impl MatchService {
    pub fn new(pool: PgPool, users: UserService, pets: PetService) -> Self {
        Self { pool, users, pets }
    }

    /// List pets available for breeding, excluding the caller's own pets.
    ///
    /// With a reference pet, results are restricted to the same breed and
    /// the opposite gender.
    pub async fn find_available_pets(
        &self,
        user: &UserRef,
        pet_id: Option<Uuid>,
    ) -> Result<Vec<PetWithOwner>, ApiError> {
        let user = self.users.resolve(user).await?;

        let filter = match pet_id {
            Some(pet_id) => {
                let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1")
                    .bind(pet_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("Pet with ID {} not found", pet_id))
                    })?;
                Some((pet.breed, pet.gender.opposite()))
            }
            None => None,
        };

        let pets = match filter {
            Some((breed, gender)) => {
                sqlx::query_as::<_, Pet>(
                    r#"
                    SELECT * FROM pets
                    WHERE is_available_for_match AND owner_id != $1
                      AND breed = $2 AND gender = $3
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user.id)
                .bind(breed)
                .bind(gender)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Pet>(
                    r#"
                    SELECT * FROM pets
                    WHERE is_available_for_match AND owner_id != $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user.id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.pets.with_owners(pets).await
    }

    /// Create a match request in `Pending` status.
    pub async fn create_request(
        &self,
        requester: &UserRef,
        requester_pet_id: Uuid,
        recipient: &UserRef,
        recipient_pet_id: Uuid,
        message: Option<String>,
    ) -> Result<Match, ApiError> {
        let (requester, recipient) = match (
            self.users.try_resolve(requester).await?,
            self.users.try_resolve(recipient).await?,
        ) {
            (Some(requester), Some(recipient)) => (requester, recipient),
            _ => return Err(ApiError::NotFound("One or both users not found".to_string())),
        };

        let mut tx = self.pool.begin().await?;

        let requester_pet = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE id = $1 AND owner_id = $2",
        )
        .bind(requester_pet_id)
        .bind(requester.id)
        .fetch_optional(&mut *tx)
        .await?;

        let recipient_pet = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE id = $1 AND owner_id = $2 AND is_available_for_match",
        )
        .bind(recipient_pet_id)
        .bind(recipient.id)
        .fetch_optional(&mut *tx)
        .await?;

        let (Some(requester_pet), Some(recipient_pet)) = (requester_pet, recipient_pet) else {
            return Err(ApiError::NotFound(
                "One or both pets not found or not available for matching".to_string(),
            ));
        };

        matching::ensure_breedable(&requester_pet, &recipient_pet)?;

        let duplicate: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM matches
                WHERE status = 'PENDING'
                  AND ((requester_pet_id = $1 AND recipient_pet_id = $2)
                    OR (requester_pet_id = $2 AND recipient_pet_id = $1))
            )
            "#,
        )
        .bind(requester_pet_id)
        .bind(recipient_pet_id)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate {
            return Err(ApiError::Conflict(DUPLICATE_REQUEST.to_string()));
        }

        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            INSERT INTO matches (requester_id, recipient_id, requester_pet_id,
                                 recipient_pet_id, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(requester.id)
        .bind(recipient.id)
        .bind(requester_pet_id)
        .bind(recipient_pet_id)
        .bind(&message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, DUPLICATE_REQUEST))?;

        tx.commit().await?;

        tracing::info!(
            "Match request {} created: {} ({}) -> {} ({})",
            row.id,
            requester.username,
            requester_pet.name,
            recipient.username,
            recipient_pet.name
        );

        self.notify(
            recipient.id,
            &format!(
                "{} requested a breeding match between {} and {}",
                requester.username, requester_pet.name, recipient_pet.name
            ),
        )
        .await;

        Ok(assemble(row, requester, recipient, requester_pet, recipient_pet))
    }

    /// Match requests sent by a user.
    pub async fn sent_requests(&self, user: &UserRef) -> Result<Vec<Match>, ApiError> {
        let user = self.users.resolve(user).await?;
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    /// Match requests received by a user, optionally restricted to pending.
    pub async fn received_requests(
        &self,
        user: &UserRef,
        pending_only: bool,
    ) -> Result<Vec<Match>, ApiError> {
        let user = self.users.resolve(user).await?;
        let rows = if pending_only {
            sqlx::query_as::<_, MatchRow>(
                r#"
                SELECT * FROM matches
                WHERE recipient_id = $1 AND status = 'PENDING'
                ORDER BY created_at DESC
                "#,
            )
            .bind(user.id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MatchRow>(
                "SELECT * FROM matches WHERE recipient_id = $1 ORDER BY created_at DESC",
            )
            .bind(user.id)
            .fetch_all(&self.pool)
            .await?
        };
        self.hydrate(rows).await
    }

    /// Approved matches involving a user as either party.
    pub async fn approved_matches(&self, user: &UserRef) -> Result<Vec<Match>, ApiError> {
        let user = self.users.resolve(user).await?;
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT * FROM matches
            WHERE status = 'APPROVED' AND (requester_id = $1 OR recipient_id = $1)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    /// Resolve a pending request. Only the recipient may respond, and only
    /// once; `Approved` and `Rejected` are terminal.
    pub async fn respond(
        &self,
        match_id: Uuid,
        responder: &UserRef,
        approve: bool,
    ) -> Result<Match, ApiError> {
        let not_authorized = || {
            ApiError::NotFound(format!(
                "Match request with ID {} not found or you're not authorized to respond",
                match_id
            ))
        };

        let responder = self
            .users
            .try_resolve(responder)
            .await?
            .ok_or_else(not_authorized)?;

        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE id = $1 AND recipient_id = $2",
        )
        .bind(match_id)
        .bind(responder.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_authorized)?;

        matching::ensure_resolvable(row.status)?;

        let status = MatchStatus::resolved(approve);

        // The status guard catches a concurrent response between the read
        // above and this write.
        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            UPDATE matches
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(match_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("This match request has already been processed".to_string())
        })?;

        tracing::info!("Match request {} resolved to {:?} by {}", match_id, status, responder.username);

        let detail = self.hydrate_one(row).await?;

        let verdict = if approve { "approved" } else { "rejected" };
        self.notify(
            detail.requester.id,
            &format!(
                "{} {} your match request for {}",
                responder.username, verdict, detail.recipient_pet.name
            ),
        )
        .await;

        Ok(detail)
    }

    /// Fetch a single match, restricted to its participants.
    pub async fn get_by_id(&self, match_id: Uuid, user: &UserRef) -> Result<Match, ApiError> {
        let not_authorized = || {
            ApiError::NotFound(format!(
                "Match with ID {} not found or you're not authorized to view it",
                match_id
            ))
        };

        let user = self
            .users
            .try_resolve(user)
            .await?
            .ok_or_else(not_authorized)?;

        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE id = $1 AND (requester_id = $2 OR recipient_id = $2)",
        )
        .bind(match_id)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_authorized)?;

        self.hydrate_one(row).await
    }

    /// Best-effort notification push; failure is logged, never surfaced.
    async fn notify(&self, user_id: Uuid, message: &str) {
        if let Err(e) = self.users.push_notification(user_id, message).await {
            tracing::warn!("Failed to push notification to {}: {}", user_id, e);
        }
    }

    async fn hydrate_one(&self, row: MatchRow) -> Result<Match, ApiError> {
        let match_id = row.id;
        self.hydrate(vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Match with ID {} not found", match_id)))
    }

    /// Attach both users and both pets to a batch of match rows.
    async fn hydrate(&self, rows: Vec<MatchRow>) -> Result<Vec<Match>, ApiError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let mut user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|r| [r.requester_id, r.recipient_id])
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut pet_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|r| [r.requester_pet_id, r.recipient_pet_id])
            .collect();
        pet_ids.sort_unstable();
        pet_ids.dedup();

        let users: HashMap<Uuid, User> =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
                .bind(&user_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect();

        let pets: HashMap<Uuid, Pet> =
            sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = ANY($1)")
                .bind(&pet_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

        let mut matches = Vec::with_capacity(rows.len());
        for row in rows {
            let loaded = (
                users.get(&row.requester_id).cloned(),
                users.get(&row.recipient_id).cloned(),
                pets.get(&row.requester_pet_id).cloned(),
                pets.get(&row.recipient_pet_id).cloned(),
            );
            match loaded {
                (Some(requester), Some(recipient), Some(requester_pet), Some(recipient_pet)) => {
                    matches.push(assemble(row, requester, recipient, requester_pet, recipient_pet));
                }
                _ => {
                    // A referenced row vanished under cascade delete.
                    tracing::warn!("Match {} references deleted rows, skipping", row.id);
                }
            }
        }

        Ok(matches)
    }
}

fn assemble(
    row: MatchRow,
    requester: User,
    recipient: User,
    requester_pet: Pet,
    recipient_pet: Pet,
) -> Match {
    Match {
        id: row.id,
        requester,
        recipient,
        requester_pet,
        recipient_pet,
        status: row.status,
        message: row.message,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
