use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::future::{ready, Ready};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{AuthResponse, CreateUserRequest, LoginRequest};
use crate::routes::AppState;
use crate::services::Claims;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login))
        .route("/auth/google", web::get().to(google_auth))
        .route("/auth/google/callback", web::get().to(google_callback))
        .route("/auth/profile", web::get().to(profile));
}

/// Validated bearer-token claims, extracted from the Authorization header.
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extract = || {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| ApiError::External("Application state missing".to_string()))?;

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

            state.auth.verify(token)
        };

        ready(extract().map(AuthenticatedUser))
    }
}

/// POST /api/v1/auth/register
async fn register(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (user, token) = state.auth.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// POST /api/v1/auth/login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (user, token) = state.auth.login(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// GET /api/v1/auth/google — redirect to the Google consent screen.
async fn google_auth(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let url = state.auth.google_auth_url()?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish())
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: String,
}

/// GET /api/v1/auth/google/callback?code=...
async fn google_callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, ApiError> {
    let (user, token) = state.auth.google_callback(&query.code).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// GET /api/v1/auth/profile — decode the token and re-resolve the user.
async fn profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let user = state.auth.profile(&auth.0).await?;
    Ok(HttpResponse::Ok().json(user))
}
