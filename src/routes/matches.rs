use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{
    AvailablePetsQuery, CallerQuery, CreateMatchByUsernameRequest, CreateMatchRequest,
    ReceivedRequestsQuery, RespondMatchRequest, UserRef,
};
use crate::routes::pets::caller_ref;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches/available-pets", web::get().to(available_pets))
        .route("/matches/request", web::post().to(create_request))
        .route("/matches/request/by-username", web::post().to(create_request_by_username))
        .route("/matches/sent/by-username/{username}", web::get().to(sent_by_username))
        .route("/matches/sent/{userId}", web::get().to(sent))
        .route("/matches/received/by-username/{username}", web::get().to(received_by_username))
        .route("/matches/received/{userId}", web::get().to(received))
        .route("/matches/approved/by-username/{username}", web::get().to(approved_by_username))
        .route("/matches/approved/{userId}", web::get().to(approved))
        .route("/matches/{matchId}/respond", web::post().to(respond))
        .route("/matches/{matchId}", web::get().to(get_match));
}

/// GET /api/v1/matches/available-pets?userId=&petId=
///
/// With `petId`, the list is narrowed to compatible candidates for that
/// pet: same breed, opposite gender.
async fn available_pets(
    state: web::Data<AppState>,
    query: web::Query<AvailablePetsQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = match (query.user_id, query.username.as_deref()) {
        (Some(id), _) => UserRef::Id(id),
        (None, Some(username)) => UserRef::Username(username.to_string()),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "userId or username query parameter is required".to_string(),
            ))
        }
    };

    let pets = state.matches.find_available_pets(&user, query.pet_id).await?;
    Ok(HttpResponse::Ok().json(pets))
}

/// POST /api/v1/matches/request
async fn create_request(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let detail = state
        .matches
        .create_request(
            &UserRef::Id(req.requester_id),
            req.requester_pet_id,
            &UserRef::Id(req.recipient_id),
            req.recipient_pet_id,
            req.message,
        )
        .await?;
    Ok(HttpResponse::Created().json(detail))
}

/// POST /api/v1/matches/request/by-username
async fn create_request_by_username(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchByUsernameRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let req = req.into_inner();
    let detail = state
        .matches
        .create_request(
            &UserRef::Username(req.requester_username),
            req.requester_pet_id,
            &UserRef::Username(req.recipient_username),
            req.recipient_pet_id,
            req.message,
        )
        .await?;
    Ok(HttpResponse::Created().json(detail))
}

/// GET /api/v1/matches/sent/{userId}
async fn sent(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let matches = state.matches.sent_requests(&UserRef::Id(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/sent/by-username/{username}
async fn sent_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let matches = state
        .matches
        .sent_requests(&UserRef::Username(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/received/{userId}?status=pending
async fn received(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ReceivedRequestsQuery>,
) -> Result<HttpResponse, ApiError> {
    let matches = state
        .matches
        .received_requests(&UserRef::Id(path.into_inner()), pending_only(&query))
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/received/by-username/{username}?status=pending
async fn received_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ReceivedRequestsQuery>,
) -> Result<HttpResponse, ApiError> {
    let matches = state
        .matches
        .received_requests(&UserRef::Username(path.into_inner()), pending_only(&query))
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/approved/{userId}
async fn approved(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let matches = state
        .matches
        .approved_matches(&UserRef::Id(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/approved/by-username/{username}
async fn approved_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let matches = state
        .matches
        .approved_matches(&UserRef::Username(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// POST /api/v1/matches/{matchId}/respond
async fn respond(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<RespondMatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let responder = match (req.user_id, req.username.as_deref()) {
        (Some(id), _) => UserRef::Id(id),
        (None, Some(username)) => UserRef::Username(username.to_string()),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "userId or username is required to respond".to_string(),
            ))
        }
    };

    let detail = state
        .matches
        .respond(path.into_inner(), &responder, req.approve)
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/v1/matches/{matchId}?userId= or ?username=
async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CallerQuery>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_ref(&query)?;
    let detail = state.matches.get_by_id(path.into_inner(), &caller).await?;
    Ok(HttpResponse::Ok().json(detail))
}

fn pending_only(query: &ReceivedRequestsQuery) -> bool {
    query
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("pending"))
}
