//! Authentication handlers.

use actix_web::{HttpResponse, web};
use quillpress_core::services::Registration;
use quillpress_shared::ApiResponse;
use quillpress_shared::dto::{LoginRequest, RegisterRequest};

use super::views;
use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .accounts
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(views::session(session))))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.accounts.login_author(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::session(session))))
}

/// POST /api/admin/auth/login
pub async fn admin_login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.accounts.login_admin(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::session(session))))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let account = state.accounts.me(&identity.principal).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::account(account))))
}
