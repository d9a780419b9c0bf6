use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AuthSettings, OAuthSettings};
use crate::core::naming;
use crate::error::ApiError;
use crate::models::{CreateUserRequest, User};
use crate::services::users::{NewUser, UserService};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Bearer-token claims: subject is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Sign a token for a user with the configured expiry.
pub fn issue_token(secret: &str, user: &User, ttl_days: i64) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::days(ttl_days)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ApiError::External(format!("Token signing failed: {}", e)))
}

/// Decode and validate a bearer token.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

/// Federated profile as returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Registration, login and Google OAuth federation.
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    http: Client,
    settings: AuthSettings,
    oauth: OAuthSettings,
}

impl AuthService {
    pub fn new(users: UserService, settings: AuthSettings, oauth: OAuthSettings) -> Self {
        Self {
            users,
            http: Client::new(),
            settings,
            oauth,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        issue_token(&self.settings.jwt_secret, user, self.settings.token_ttl_days)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        verify_token(&self.settings.jwt_secret, token)
    }

    /// Create an account and issue its first token.
    pub async fn register(&self, req: CreateUserRequest) -> Result<(User, String), ApiError> {
        let user = self.users.create(NewUser::from(req)).await?;
        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Password login. Federated-only accounts cannot log in this way.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

        UserService::verify_password(&user, password)?;

        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Consent-screen URL for the Google sign-in redirect.
    pub fn google_auth_url(&self) -> Result<String, ApiError> {
        let (client_id, redirect_uri) = self.oauth_config()?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile",
            GOOGLE_AUTH_URL, client_id, redirect_uri
        ))
    }

    /// Exchange the OAuth callback code and sign the federated user in.
    pub async fn google_callback(&self, code: &str) -> Result<(User, String), ApiError> {
        let (client_id, redirect_uri) = self.oauth_config()?;
        let client_secret = self
            .oauth
            .client_secret
            .as_deref()
            .ok_or_else(|| ApiError::External("Google OAuth is not configured".to_string()))?;

        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !token_response.status().is_success() {
            return Err(ApiError::Unauthorized(
                "Google authorization code was rejected".to_string(),
            ));
        }

        let token: TokenResponse = token_response.json().await?;

        let profile_response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !profile_response.status().is_success() {
            return Err(ApiError::External(format!(
                "Failed to fetch Google profile: {}",
                profile_response.status()
            )));
        }

        let profile: GoogleProfile = profile_response.json().await?;
        self.validate_oauth_user(profile).await
    }

    /// Find-or-create a user for a federated profile and issue a token.
    ///
    /// New accounts are auto-verified and get a unique username derived
    /// from the email local-part, with a counter suffix on collision.
    pub async fn validate_oauth_user(
        &self,
        profile: GoogleProfile,
    ) -> Result<(User, String), ApiError> {
        if let Some(existing) = self.users.find_by_email(&profile.email).await? {
            let user = if existing.google_id.is_none() {
                self.users
                    .attach_google_identity(existing.id, &profile.id, profile.picture)
                    .await?
            } else {
                existing
            };

            let token = self.issue(&user)?;
            return Ok((user, token));
        }

        let base = naming::derive_username(None, None, &profile.email);
        let mut username = base.clone();
        let mut attempt = 0u32;
        while self.users.username_taken(&username).await? {
            attempt += 1;
            username = naming::username_candidate(&base, attempt);
        }

        let display_name = profile.name.clone().unwrap_or_else(|| username.clone());

        let user = self
            .users
            .create(NewUser {
                email: profile.email,
                password: None,
                username: Some(username),
                display_name: Some(display_name),
                role: None,
                phone: None,
                location: None,
                profile_image: profile.picture,
                google_id: Some(profile.id),
                is_verified: true,
            })
            .await?;

        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Re-resolve the user behind a validated token.
    pub async fn profile(&self, claims: &Claims) -> Result<User, ApiError> {
        match self.users.find_by_id(claims.user_id()?).await {
            Ok(user) => Ok(user),
            Err(ApiError::NotFound(_)) => {
                Err(ApiError::Unauthorized("User not found".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn oauth_config(&self) -> Result<(&str, &str), ApiError> {
        match (self.oauth.client_id.as_deref(), self.oauth.redirect_uri.as_deref()) {
            (Some(client_id), Some(redirect_uri)) => Ok((client_id, redirect_uri)),
            _ => Err(ApiError::External("Google OAuth is not configured".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jane_doe".to_string(),
            email: "jane@example.com".to_string(),
            display_name: Some("Jane Doe".to_string()),
            password_hash: None,
            phone: None,
            location: None,
            role: UserRole::Owner,
            profile_image: None,
            is_verified: true,
            google_id: Some("google-123".to_string()),
            notifications: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = test_user();
        let token = issue_token("test-secret", &user, 7).unwrap();
        let claims = verify_token("test-secret", &token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "jane_doe");
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let user = test_user();
        let token = issue_token("test-secret", &user, 7).unwrap();

        assert!(matches!(
            verify_token("other-secret", &token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = test_user();
        let token = issue_token("test-secret", &user, -1).unwrap();

        assert!(matches!(
            verify_token("test-secret", &token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify_token("test-secret", "not.a.token"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
