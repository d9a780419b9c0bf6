use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{CreateUserRequest, PushNotificationRequest, UpdateUserRequest};
use crate::routes::AppState;
use crate::services::NewUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(create_user))
        .route("/users", web::get().to(list_users))
        .route("/users/by-username/{username}", web::get().to(get_user_by_username))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::patch().to(update_user))
        .route("/users/{id}", web::delete().to(delete_user))
        .route("/users/{id}/notifications", web::post().to(push_notification));
}

/// POST /api/v1/users
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state.users.create(NewUser::from(req.into_inner())).await?;
    Ok(HttpResponse::Created().json(user))
}

/// GET /api/v1/users
async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = state.users.find_all().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/{id}
async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/v1/users/by-username/{username}
async fn get_user_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.find_by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// PATCH /api/v1/users/{id}
async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state.users.update(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/v1/users/{id}
async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.users.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/users/{id}/notifications
async fn push_notification(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PushNotificationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state
        .users
        .push_notification(path.into_inner(), &req.message)
        .await?;
    Ok(HttpResponse::Ok().json(user))
}
