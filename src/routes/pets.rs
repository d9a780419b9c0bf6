use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{
    AnalyzeImageRequest, CallerQuery, CreatePetRequest, UpdatePetRequest, UserRef,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/pets", web::post().to(create_pet))
        .route("/pets", web::get().to(list_pets))
        .route("/pets/analyze-image", web::post().to(analyze_image))
        .route("/pets/available-for-match", web::get().to(available_for_match))
        .route("/pets/available-for-boarding", web::get().to(available_for_boarding))
        .route("/pets/owner/by-username/{username}", web::get().to(pets_by_owner_username))
        .route("/pets/owner/{ownerId}", web::get().to(pets_by_owner))
        .route("/pets/{id}", web::get().to(get_pet))
        .route("/pets/{id}", web::patch().to(update_pet))
        .route("/pets/{id}", web::delete().to(delete_pet));
}

/// POST /api/v1/pets
async fn create_pet(
    state: web::Data<AppState>,
    req: web::Json<CreatePetRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = state.pets.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// GET /api/v1/pets
async fn list_pets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let pets = state.pets.find_all().await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// POST /api/v1/pets/analyze-image
async fn analyze_image(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeImageRequest>,
) -> Result<HttpResponse, ApiError> {
    let analysis = state.pets.analyze_image(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

/// GET /api/v1/pets/available-for-match
async fn available_for_match(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let pets = state.pets.find_available_for_match().await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// GET /api/v1/pets/available-for-boarding
async fn available_for_boarding(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let pets = state.pets.find_available_for_boarding().await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// GET /api/v1/pets/owner/{ownerId}
async fn pets_by_owner(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let pets = state.pets.find_by_owner(&UserRef::Id(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// GET /api/v1/pets/owner/by-username/{username}
async fn pets_by_owner_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let pets = state
        .pets
        .find_by_owner(&UserRef::Username(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// GET /api/v1/pets/{id}
async fn get_pet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let pet = state.pets.find_one(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pet))
}

/// PATCH /api/v1/pets/{id}
async fn update_pet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePetRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let pet = state.pets.update(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pet))
}

/// DELETE /api/v1/pets/{id}?userId= or ?username=
///
/// The caller must be the pet's owner.
async fn delete_pet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CallerQuery>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_ref(&query)?;
    state.pets.delete(path.into_inner(), &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) fn caller_ref(query: &CallerQuery) -> Result<UserRef, ApiError> {
    match (query.user_id, query.username.as_deref()) {
        (Some(id), _) => Ok(UserRef::Id(id)),
        (None, Some(username)) => Ok(UserRef::Username(username.to_string())),
        (None, None) => Err(ApiError::BadRequest(
            "userId or username query parameter is required".to_string(),
        )),
    }
}
