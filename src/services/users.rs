use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::naming;
use crate::error::ApiError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserRef, UserRole};

/// Number of notification entries retained per user, newest first.
const NOTIFICATION_LIMIT: i32 = 50;

/// Input for creating a user, from registration or federated sign-in.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            email: req.email,
            password: req.password,
            username: req.username,
            display_name: req.display_name,
            role: req.role,
            phone: req.phone,
            location: req.location,
            profile_image: req.profile_image,
            google_id: None,
            is_verified: false,
        }
    }
}

/// User directory backed by the `users` table.
///
/// Role transitions into/out of `Sitter` create/delete the associated
/// sitter listing within the same transaction as the user write.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. Username and display name are derived from whichever
    /// identity fields are present; a supplied password is hashed before
    /// storage.
    pub async fn create(&self, input: NewUser) -> Result<User, ApiError> {
        if self.email_taken(&input.email).await? {
            return Err(ApiError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let username = naming::derive_username(
            input.username.as_deref(),
            input.display_name.as_deref(),
            &input.email,
        );
        if username.is_empty() {
            return Err(ApiError::BadRequest("Username could not be derived".to_string()));
        }
        if self.username_taken(&username).await? {
            return Err(ApiError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let display_name = naming::derive_display_name(input.display_name.as_deref(), &username);

        let password_hash = match input.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let role = input.role.unwrap_or(UserRole::Owner);

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, display_name, password_hash, phone, location,
                               role, profile_image, is_verified, google_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&username)
        .bind(&input.email)
        .bind(&display_name)
        .bind(&password_hash)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(role)
        .bind(&input.profile_image)
        .bind(input.is_verified)
        .bind(&input.google_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "User with this email or username already exists"))?;

        if role == UserRole::Sitter {
            insert_sitter_listing(&mut tx, &user.username).await?;
        }

        tx.commit().await?;

        tracing::info!("Created user {} ({})", user.username, user.id);

        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User with ID {} not found", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User with username {} not found", username)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Resolve a user by id or by the username convenience alias.
    pub async fn resolve(&self, user: &UserRef) -> Result<User, ApiError> {
        match user {
            UserRef::Id(id) => self.find_by_id(*id).await,
            UserRef::Username(username) => self.find_by_username(username).await,
        }
    }

    /// Like [`resolve`](Self::resolve), but absence is not an error.
    pub async fn try_resolve(&self, user: &UserRef) -> Result<Option<User>, ApiError> {
        match self.resolve(user).await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, ApiError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, ApiError> {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    /// Merge-update a user. A role transition into/out of `Sitter` and the
    /// matching sitter listing write commit atomically.
    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User, ApiError> {
        let existing = self.find_by_id(id).await?;

        let email = req.email.unwrap_or_else(|| existing.email.clone());
        if email != existing.email && self.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let username = req.username.unwrap_or_else(|| existing.username.clone());
        if username != existing.username && self.username_taken(&username).await? {
            return Err(ApiError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let password_hash = match req.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => existing.password_hash.clone(),
        };

        let role = req.role.unwrap_or(existing.role);

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, username = $3, display_name = $4, password_hash = $5,
                phone = $6, location = $7, role = $8, profile_image = $9,
                is_verified = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&email)
        .bind(&username)
        .bind(req.display_name.or(existing.display_name.clone()))
        .bind(&password_hash)
        .bind(req.phone.or(existing.phone.clone()))
        .bind(req.location.or(existing.location.clone()))
        .bind(role)
        .bind(req.profile_image.or(existing.profile_image.clone()))
        .bind(req.is_verified.unwrap_or(existing.is_verified))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "User with this email or username already exists"))?;

        match (existing.role == UserRole::Sitter, role == UserRole::Sitter) {
            (false, true) => {
                insert_sitter_listing(&mut tx, &user.username).await?;
                tracing::info!("Created sitter listing for {}", user.username);
            }
            (true, false) => {
                sqlx::query("DELETE FROM sitter_spec WHERE username = $1")
                    .bind(&existing.username)
                    .execute(&mut *tx)
                    .await?;
                tracing::info!("Removed sitter listing for {}", existing.username);
            }
            (true, true) if user.username != existing.username => {
                // Keep the listing addressable when a sitter renames.
                sqlx::query("UPDATE sitter_spec SET username = $2 WHERE username = $1")
                    .bind(&existing.username)
                    .bind(&user.username)
                    .execute(&mut *tx)
                    .await?;
            }
            _ => {}
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Attach a federated identity discovered during OAuth sign-in.
    pub async fn attach_google_identity(
        &self,
        id: Uuid,
        google_id: &str,
        profile_image: Option<String>,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = $2, profile_image = COALESCE($3, profile_image), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(google_id)
        .bind(profile_image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with ID {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("User with ID {} not found", id)));
        }

        Ok(())
    }

    /// Prepend a notification, keeping only the most recent entries.
    pub async fn push_notification(&self, id: Uuid, message: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET notifications = (array_prepend($2::text, notifications))[1:$3],
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message)
        .bind(NOTIFICATION_LIMIT)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with ID {} not found", id)))
    }

    /// Verify a login password against the stored hash.
    pub fn verify_password(user: &User, password: &str) -> Result<(), ApiError> {
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(ApiError::Unauthorized(
                "This account uses Google sign-in and has no password".to_string(),
            ));
        };

        let parsed = PasswordHash::new(hash)
            .map_err(|e| ApiError::External(format!("Stored password hash is invalid: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ApiError::Unauthorized("Invalid email or password".to_string()))
    }
}

async fn insert_sitter_listing(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    username: &str,
) -> Result<(), ApiError> {
    sqlx::query("INSERT INTO sitter_spec (username) VALUES ($1) ON CONFLICT (username) DO NOTHING")
        .bind(username)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::External(format!("Password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_hash(hash: Option<String>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "jane_doe".to_string(),
            email: "jane@example.com".to_string(),
            display_name: Some("Jane Doe".to_string()),
            password_hash: hash,
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

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        let user = user_with_hash(Some(hash));

        assert!(UserService::verify_password(&user, "correct horse battery").is_ok());
        assert!(matches!(
            UserService::verify_password(&user, "wrong"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_federated_account_rejects_password_login() {
        let user = user_with_hash(None);
        assert!(matches!(
            UserService::verify_password(&user, "anything"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_new_user_from_request_defaults() {
        let req = CreateUserRequest {
            email: "jane@example.com".to_string(),
            password: None,
            username: None,
            display_name: Some("Jane Doe".to_string()),
            role: None,
            phone: None,
            location: None,
            profile_image: None,
        };
        let input = NewUser::from(req);
        assert!(input.google_id.is_none());
        assert!(!input.is_verified);
    }
}
