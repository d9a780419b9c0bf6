// Route exports
pub mod auth;
pub mod matches;
pub mod pets;
pub mod sitters;
pub mod users;

use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::models::HealthResponse;
use crate::services::{AuthService, MatchService, PetService, SitterService, UserService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: UserService,
    pub pets: PetService,
    pub matches: MatchService,
    pub sitters: SitterService,
    pub auth: AuthService,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(users::configure)
            .configure(pets::configure)
            .configure(matches::configure)
            .configure(sitters::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
