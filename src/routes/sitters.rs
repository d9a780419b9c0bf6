use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{CreateSitterSpecRequest, UpdateSitterSpecRequest};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/sitter-spec", web::post().to(create_spec))
        .route("/sitter-spec", web::get().to(list_specs))
        .route("/sitter-spec/{username}", web::get().to(get_spec))
        .route("/sitter-spec/{username}", web::patch().to(update_spec))
        .route("/sitter-spec/{username}", web::delete().to(delete_spec));
}

/// POST /api/v1/sitter-spec
async fn create_spec(
    state: web::Data<AppState>,
    req: web::Json<CreateSitterSpecRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let spec = state.sitters.create(&req.username).await?;
    Ok(HttpResponse::Created().json(spec))
}

/// GET /api/v1/sitter-spec
async fn list_specs(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let specs = state.sitters.find_all().await?;
    Ok(HttpResponse::Ok().json(specs))
}

/// GET /api/v1/sitter-spec/{username}
async fn get_spec(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let spec = state.sitters.find_by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(spec))
}

/// PATCH /api/v1/sitter-spec/{username}
async fn update_spec(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateSitterSpecRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let spec = state
        .sitters
        .update(&path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(spec))
}

/// DELETE /api/v1/sitter-spec/{username}
async fn delete_spec(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.sitters.delete(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
